//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use clasificar::prelude::*;
//! ```

pub use crate::bundle::FittedModel;
pub use crate::classification::KNearestNeighbors;
pub use crate::error::{ClasificarError, Result};
pub use crate::inference::{InferenceContext, Prediction};
pub use crate::metrics::{accuracy, classification_report, f1_score, Average};
pub use crate::preprocessing::{LabelEncoder, StandardScaler};
pub use crate::primitives::Matrix;
pub use crate::training::{Trainer, TrainingReport};
pub use crate::traits::Transformer;
