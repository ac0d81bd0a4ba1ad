//! Clasificar: color-histogram image classification in pure Rust.
//!
//! Clasificar converts an image into a fixed-length color-histogram
//! descriptor, standardizes it with statistics captured at training time,
//! and classifies it with a brute-force k-nearest-neighbor model,
//! producing a predicted category, a confidence score, and a full
//! per-category probability distribution.
//!
//! # Quick Start
//!
//! ```
//! use clasificar::prelude::*;
//!
//! // Two reference clusters in a toy 2-D feature space.
//! let x = Matrix::from_vec(6, 2, vec![
//!     0.0, 0.0,
//!     0.5, 0.5,
//!     1.0, 0.0,
//!     5.0, 5.0,
//!     5.5, 5.5,
//!     6.0, 5.0,
//! ]).unwrap();
//! let y = vec![0, 0, 0, 1, 1, 1];
//!
//! let mut scaler = StandardScaler::new();
//! let x_scaled = scaler.fit_transform(&x).unwrap();
//!
//! let mut knn = KNearestNeighbors::new(3);
//! knn.fit(&x_scaled, &y).unwrap();
//!
//! let query = scaler.transform_vector(&[0.3, 0.3]).unwrap();
//! assert_eq!(knn.predict_one(&query).unwrap(), 0);
//! ```
//!
//! # Modules
//!
//! - [`vision`]: Deterministic color-histogram feature extraction
//! - [`preprocessing`]: Feature scaler and label encoder
//! - [`classification`]: Brute-force k-nearest-neighbor classifier
//! - [`metrics`]: Accuracy, precision/recall/F1, classification report
//! - [`model_selection`]: Seeded train/validation/test splitting
//! - [`training`]: Offline training orchestration over an image corpus
//! - [`bundle`]: The co-versioned fitted-model bundle and its persistence
//! - [`inference`]: Read-only per-request inference context
//! - [`serialization`]: `SafeTensors` persistence for numeric artifacts
//! - [`primitives`]: Row-major matrix storage
//! - [`error`]: The crate-wide error taxonomy

pub mod bundle;
pub mod classification;
pub mod error;
pub mod inference;
pub mod metrics;
pub mod model_selection;
pub mod prelude;
pub mod preprocessing;
pub mod primitives;
pub mod serialization;
pub mod training;
pub mod traits;
pub mod vision;
