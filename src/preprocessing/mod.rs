//! Preprocessing transformers: feature standardization and label encoding.
//!
//! Both transformers are fit once during training and applied read-only at
//! inference time; refitting at inference would silently change feature
//! semantics.
//!
//! # Example
//!
//! ```
//! use clasificar::prelude::*;
//!
//! let data = Matrix::from_vec(4, 2, vec![
//!     1.0, 100.0,
//!     2.0, 200.0,
//!     3.0, 300.0,
//!     4.0, 400.0,
//! ]).expect("valid matrix dimensions");
//!
//! let mut scaler = StandardScaler::new();
//! let scaled = scaler.fit_transform(&data).expect("fit_transform should succeed");
//! assert!(scaled.get(0, 0).abs() < 2.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ClasificarError, Result};
use crate::primitives::Matrix;
use crate::traits::Transformer;

/// Standardizes features by removing the mean and scaling to unit variance.
///
/// The standard score of a sample x is: z = (x - mean) / std, computed
/// per dimension. Dimensions with zero variance are passed through
/// unscaled so constant histogram bins cannot produce a division by zero.
///
/// # Example
///
/// ```
/// use clasificar::prelude::*;
///
/// let data = Matrix::from_vec(3, 2, vec![
///     0.0, 0.0,
///     1.0, 10.0,
///     2.0, 20.0,
/// ]).expect("valid matrix dimensions");
///
/// let mut scaler = StandardScaler::new();
/// scaler.fit(&data).expect("fit should succeed");
///
/// let scaled = scaler.transform_vector(&[1.0, 10.0]).expect("in-distribution vector");
/// assert!(scaled[0].abs() < 1e-6, "the mean maps to ~0");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StandardScaler {
    /// Mean of each feature (computed during fit).
    mean: Option<Vec<f32>>,
    /// Standard deviation of each feature (computed during fit).
    std: Option<Vec<f32>>,
}

/// Variances below this are treated as zero (identity scaling).
const VARIANCE_FLOOR: f32 = 1e-10;

impl StandardScaler {
    /// Creates a new, unfitted `StandardScaler`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            mean: None,
            std: None,
        }
    }

    /// Rebuilds a fitted scaler from persisted statistics.
    pub(crate) fn from_parts(mean: Vec<f32>, std: Vec<f32>) -> Result<Self> {
        if mean.len() != std.len() {
            return Err(ClasificarError::DimensionMismatch {
                expected: mean.len(),
                actual: std.len(),
            });
        }
        Ok(Self {
            mean: Some(mean),
            std: Some(std),
        })
    }

    /// Returns the mean of each feature.
    ///
    /// # Errors
    ///
    /// Returns [`ClasificarError::NotFitted`] if the scaler is not fitted.
    pub fn mean(&self) -> Result<&[f32]> {
        self.mean
            .as_deref()
            .ok_or(ClasificarError::NotFitted {
                component: "StandardScaler",
            })
    }

    /// Returns the standard deviation of each feature.
    ///
    /// # Errors
    ///
    /// Returns [`ClasificarError::NotFitted`] if the scaler is not fitted.
    pub fn std(&self) -> Result<&[f32]> {
        self.std
            .as_deref()
            .ok_or(ClasificarError::NotFitted {
                component: "StandardScaler",
            })
    }

    /// Returns true if the scaler has been fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.mean.is_some()
    }

    /// Number of features seen at fit time, if fitted.
    #[must_use]
    pub fn n_features(&self) -> Option<usize> {
        self.mean.as_ref().map(Vec::len)
    }

    /// Standardizes a single feature vector using the fitted statistics.
    ///
    /// This is the inference-path entry point; it never refits.
    ///
    /// # Errors
    ///
    /// Returns [`ClasificarError::NotFitted`] if the scaler is not fitted,
    /// or [`ClasificarError::DimensionMismatch`] if the vector length
    /// differs from the length seen at fit time.
    pub fn transform_vector(&self, vector: &[f32]) -> Result<Vec<f32>> {
        let mean = self.mean()?;
        let std = self.std()?;

        if vector.len() != mean.len() {
            return Err(ClasificarError::DimensionMismatch {
                expected: mean.len(),
                actual: vector.len(),
            });
        }

        Ok(vector
            .iter()
            .zip(mean.iter().zip(std.iter()))
            .map(|(&x, (&m, &s))| {
                let centered = x - m;
                if s > VARIANCE_FLOOR {
                    centered / s
                } else {
                    centered
                }
            })
            .collect())
    }
}

impl Transformer for StandardScaler {
    /// Computes the mean and population standard deviation of each feature.
    fn fit(&mut self, x: &Matrix<f32>) -> Result<()> {
        let (n_samples, n_features) = x.shape();

        if n_samples == 0 {
            return Err(ClasificarError::data("cannot fit scaler on zero samples"));
        }

        let mut mean = vec![0.0; n_features];
        for (j, mean_j) in mean.iter_mut().enumerate() {
            let mut sum = 0.0;
            for i in 0..n_samples {
                sum += x.get(i, j);
            }
            *mean_j = sum / n_samples as f32;
        }

        let mut std = vec![0.0; n_features];
        for (j, std_j) in std.iter_mut().enumerate() {
            let mut sum_sq = 0.0;
            for i in 0..n_samples {
                let diff = x.get(i, j) - mean[j];
                sum_sq += diff * diff;
            }
            // Population std (divide by n, not n-1).
            *std_j = (sum_sq / n_samples as f32).sqrt();
        }

        self.mean = Some(mean);
        self.std = Some(std);

        Ok(())
    }

    /// Standardizes every row using the fitted mean and std.
    fn transform(&self, x: &Matrix<f32>) -> Result<Matrix<f32>> {
        let mean = self.mean()?;
        let std = self.std()?;

        let (n_samples, n_features) = x.shape();
        if n_features != mean.len() {
            return Err(ClasificarError::DimensionMismatch {
                expected: mean.len(),
                actual: n_features,
            });
        }

        let mut result = vec![0.0; n_samples * n_features];
        for i in 0..n_samples {
            for j in 0..n_features {
                let centered = x.get(i, j) - mean[j];
                result[i * n_features + j] = if std[j] > VARIANCE_FLOOR {
                    centered / std[j]
                } else {
                    centered
                };
            }
        }

        Matrix::from_vec(n_samples, n_features, result).map_err(Into::into)
    }
}

/// Bidirectional mapping between label strings and dense class indices.
///
/// Fitting collects the distinct labels and assigns indices in sorted
/// order, so the mapping is deterministic and reproducible for any
/// permutation of the same training label multiset.
///
/// # Example
///
/// ```
/// use clasificar::preprocessing::LabelEncoder;
///
/// let mut encoder = LabelEncoder::new();
/// encoder.fit(&["pear".into(), "apple".into(), "pear".into()]).expect("non-empty labels");
///
/// assert_eq!(encoder.encode("apple").expect("seen label"), 0);
/// assert_eq!(encoder.decode(1).expect("valid index"), "pear");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Creates a new, unfitted `LabelEncoder`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            classes: Vec::new(),
        }
    }

    /// Rebuilds a fitted encoder from a persisted class list.
    pub(crate) fn from_classes(classes: Vec<String>) -> Self {
        Self { classes }
    }

    /// Learns the sorted distinct labels from the training label multiset.
    ///
    /// # Errors
    ///
    /// Returns [`ClasificarError::Data`] if no labels are provided.
    pub fn fit(&mut self, labels: &[String]) -> Result<()> {
        if labels.is_empty() {
            return Err(ClasificarError::data("cannot fit encoder on zero labels"));
        }
        let mut classes: Vec<String> = labels.to_vec();
        classes.sort_unstable();
        classes.dedup();
        self.classes = classes;
        Ok(())
    }

    /// Maps a label string to its dense class index.
    ///
    /// # Errors
    ///
    /// Returns [`ClasificarError::UnknownLabel`] if the label was never
    /// seen during fit.
    pub fn encode(&self, label: &str) -> Result<usize> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(label))
            .map_err(|_| ClasificarError::UnknownLabel {
                label: label.to_string(),
            })
    }

    /// Maps every label in a slice to its class index.
    ///
    /// # Errors
    ///
    /// Returns [`ClasificarError::UnknownLabel`] on the first unseen label.
    pub fn encode_all(&self, labels: &[String]) -> Result<Vec<usize>> {
        labels.iter().map(|l| self.encode(l)).collect()
    }

    /// Maps a class index back to its label string.
    ///
    /// # Errors
    ///
    /// Returns [`ClasificarError::IndexOutOfRange`] if the index is not in
    /// `[0, n_classes)`.
    pub fn decode(&self, index: usize) -> Result<&str> {
        self.classes
            .get(index)
            .map(String::as_str)
            .ok_or(ClasificarError::IndexOutOfRange {
                index,
                len: self.classes.len(),
            })
    }

    /// The fixed, sorted class ordering.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Number of distinct classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Returns true if the encoder has been fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        !self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests;
