//! K-Nearest Neighbors classification.
//!
//! A memory-based model: `fit` stores the full scaled reference set and
//! `predict` scans it. The brute-force O(n·d) distance computation per
//! query is a deliberate design choice that keeps the distance metric and
//! tie-breaking rules visible and testable; at the reference-set sizes
//! this crate targets (tens of thousands of 512-dim vectors) it is fast
//! enough that an approximate index would buy nothing but opacity.
//!
//! # Example
//!
//! ```
//! use clasificar::classification::KNearestNeighbors;
//! use clasificar::primitives::Matrix;
//!
//! let x = Matrix::from_vec(6, 2, vec![
//!     0.0, 0.0,  // class 0
//!     0.0, 1.0,  // class 0
//!     1.0, 0.0,  // class 0
//!     5.0, 5.0,  // class 1
//!     5.0, 6.0,  // class 1
//!     6.0, 5.0,  // class 1
//! ]).expect("6x2 matrix with 12 values");
//! let y = vec![0, 0, 0, 1, 1, 1];
//!
//! let mut knn = KNearestNeighbors::new(3);
//! knn.fit(&x, &y).expect("valid training data with 6 samples");
//!
//! assert_eq!(knn.predict_one(&[0.5, 0.5]).expect("fitted"), 0);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ClasificarError, Result};
use crate::primitives::Matrix;

/// K-Nearest Neighbors classifier with Euclidean distance and uniform
/// majority voting.
///
/// Probability estimates are vote fractions: the share of the k nearest
/// reference vectors belonging to each class. With k = 5 a probability can
/// only take values in {0.0, 0.2, 0.4, 0.6, 0.8, 1.0}; the reported
/// confidence is exactly this coarse top vote fraction, by design.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KNearestNeighbors {
    /// Number of neighbors consulted per query.
    k: usize,
    /// Total number of classes the probability vector is aligned to.
    /// Zero means "derive from the labels at fit time".
    n_classes: usize,
    /// Scaled reference vectors (stored during fit).
    references: Option<Matrix<f32>>,
    /// Class index of each reference vector (stored during fit).
    labels: Option<Vec<usize>>,
}

impl KNearestNeighbors {
    /// Creates a new classifier that votes among `k` neighbors.
    #[must_use]
    pub fn new(k: usize) -> Self {
        Self {
            k,
            n_classes: 0,
            references: None,
            labels: None,
        }
    }

    /// Fixes the length of the probability vector.
    ///
    /// Use this when the label codec knows classes that may be absent from
    /// a particular training partition, so `predict_proba` stays aligned
    /// to the codec's full class ordering.
    #[must_use]
    pub fn with_num_classes(mut self, n_classes: usize) -> Self {
        self.n_classes = n_classes;
        self
    }

    /// Rebuilds a fitted classifier from persisted parts.
    pub(crate) fn from_parts(
        k: usize,
        n_classes: usize,
        references: Matrix<f32>,
        labels: Vec<usize>,
    ) -> Result<Self> {
        let mut model = Self::new(k).with_num_classes(n_classes);
        model.fit(&references, &labels)?;
        Ok(model)
    }

    /// Number of neighbors consulted per query.
    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of classes the probability vector is aligned to.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Number of stored reference vectors, if fitted.
    #[must_use]
    pub fn n_references(&self) -> Option<usize> {
        self.references.as_ref().map(Matrix::n_rows)
    }

    /// Feature dimensionality of the stored reference set, if fitted.
    #[must_use]
    pub fn n_features(&self) -> Option<usize> {
        self.references.as_ref().map(Matrix::n_cols)
    }

    /// Returns true if the classifier has been fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.references.is_some()
    }

    /// Stored reference matrix, if fitted.
    pub(crate) fn references(&self) -> Option<&Matrix<f32>> {
        self.references.as_ref()
    }

    /// Stored reference labels, if fitted.
    pub(crate) fn labels(&self) -> Option<&[usize]> {
        self.labels.as_deref()
    }

    /// Stores the reference set. kNN is a lazy learner: all computation is
    /// deferred to prediction time.
    ///
    /// # Errors
    ///
    /// Returns [`ClasificarError::InvalidHyperparameter`] if k is zero or
    /// exceeds the number of samples, and [`ClasificarError::Data`] if the
    /// reference set is empty, label counts don't match, or a label falls
    /// outside the configured class count.
    pub fn fit(&mut self, x: &Matrix<f32>, y: &[usize]) -> Result<()> {
        let (n_samples, _) = x.shape();

        if n_samples == 0 {
            return Err(ClasificarError::data("cannot fit with zero samples"));
        }
        if y.len() != n_samples {
            return Err(ClasificarError::data(format!(
                "reference set has {n_samples} vectors but {} labels",
                y.len()
            )));
        }
        if self.k == 0 {
            return Err(ClasificarError::InvalidHyperparameter {
                param: "k".to_string(),
                value: "0".to_string(),
                constraint: "k >= 1".to_string(),
            });
        }
        if self.k > n_samples {
            return Err(ClasificarError::InvalidHyperparameter {
                param: "k".to_string(),
                value: self.k.to_string(),
                constraint: format!("k <= n_samples ({n_samples})"),
            });
        }

        let max_label = *y.iter().max().expect("n_samples > 0");
        if self.n_classes == 0 {
            self.n_classes = max_label + 1;
        } else if max_label >= self.n_classes {
            return Err(ClasificarError::data(format!(
                "label {max_label} outside configured class count {}",
                self.n_classes
            )));
        }

        self.references = Some(x.clone());
        self.labels = Some(y.to_vec());

        Ok(())
    }

    /// Predicts the class index for a single query vector.
    ///
    /// The prediction is always the argmax of [`predict_proba_one`]; vote
    /// ties resolve to the lowest class index.
    ///
    /// [`predict_proba_one`]: KNearestNeighbors::predict_proba_one
    ///
    /// # Errors
    ///
    /// Returns [`ClasificarError::NotFitted`] before `fit`, or
    /// [`ClasificarError::DimensionMismatch`] for a wrong-length query.
    pub fn predict_one(&self, query: &[f32]) -> Result<usize> {
        let (index, _) = self.predict_with_proba_one(query)?;
        Ok(index)
    }

    /// Returns the per-class vote fractions for a single query vector.
    ///
    /// The result has exactly `n_classes` entries aligned to the fixed
    /// class ordering; classes absent from the neighborhood get 0.0, and
    /// the entries sum to 1.0.
    ///
    /// # Errors
    ///
    /// Returns [`ClasificarError::NotFitted`] before `fit`, or
    /// [`ClasificarError::DimensionMismatch`] for a wrong-length query.
    pub fn predict_proba_one(&self, query: &[f32]) -> Result<Vec<f32>> {
        let (_, proba) = self.predict_with_proba_one(query)?;
        Ok(proba)
    }

    /// Predicts the class index and vote fractions in a single reference
    /// scan.
    ///
    /// # Errors
    ///
    /// Returns [`ClasificarError::NotFitted`] before `fit`, or
    /// [`ClasificarError::DimensionMismatch`] for a wrong-length query.
    pub fn predict_with_proba_one(&self, query: &[f32]) -> Result<(usize, Vec<f32>)> {
        let votes = self.neighbor_votes(query)?;

        let mut best = 0;
        for (class, &count) in votes.iter().enumerate() {
            if count > votes[best] {
                best = class;
            }
        }

        let k = self.k as f32;
        let proba: Vec<f32> = votes.iter().map(|&count| count as f32 / k).collect();
        Ok((best, proba))
    }

    /// Predicts class indices for every row of `x`.
    ///
    /// # Errors
    ///
    /// Returns [`ClasificarError::NotFitted`] before `fit`, or
    /// [`ClasificarError::DimensionMismatch`] on feature-count mismatch.
    pub fn predict(&self, x: &Matrix<f32>) -> Result<Vec<usize>> {
        (0..x.n_rows()).map(|i| self.predict_one(x.row(i))).collect()
    }

    /// Returns vote fractions for every row of `x`.
    ///
    /// # Errors
    ///
    /// Returns [`ClasificarError::NotFitted`] before `fit`, or
    /// [`ClasificarError::DimensionMismatch`] on feature-count mismatch.
    pub fn predict_proba(&self, x: &Matrix<f32>) -> Result<Vec<Vec<f32>>> {
        (0..x.n_rows())
            .map(|i| self.predict_proba_one(x.row(i)))
            .collect()
    }

    /// Scans the full reference set and counts class votes among the k
    /// nearest neighbors.
    ///
    /// Distances are computed in insertion order and ranked with a stable
    /// sort, so equidistant references keep their original order.
    fn neighbor_votes(&self, query: &[f32]) -> Result<Vec<usize>> {
        let references = self.references.as_ref().ok_or(ClasificarError::NotFitted {
            component: "KNearestNeighbors",
        })?;
        let labels = self.labels.as_ref().ok_or(ClasificarError::NotFitted {
            component: "KNearestNeighbors",
        })?;

        let n_features = references.n_cols();
        if query.len() != n_features {
            return Err(ClasificarError::DimensionMismatch {
                expected: n_features,
                actual: query.len(),
            });
        }

        let mut distances: Vec<(f32, usize)> = Vec::with_capacity(labels.len());
        for (i, &label) in labels.iter().enumerate() {
            distances.push((euclidean(query, references.row(i)), label));
        }
        distances.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut votes = vec![0usize; self.n_classes];
        for &(_, label) in &distances[..self.k] {
            votes[label] += 1;
        }
        Ok(votes)
    }
}

/// Euclidean distance between two equal-length vectors.
fn euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let diff = x - y;
            diff * diff
        })
        .sum::<f32>()
        .sqrt()
}


#[cfg(test)]
mod tests_contract;
