//! Dataset splitting utilities for model selection.
//!
//! Splits are randomized with an explicit seed so training runs are
//! reproducible; the shuffle order is the only source of randomness in the
//! whole training pipeline.

use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{ClasificarError, Result};
use crate::primitives::Matrix;

/// Splits features and labels into random train and test subsets.
///
/// # Arguments
///
/// * `x` - Feature matrix (`n_samples` × `n_features`)
/// * `y` - Class index per sample
/// * `test_size` - Proportion of the dataset for the test split (0.0 to 1.0)
/// * `random_state` - Optional random seed for reproducibility
///
/// # Returns
///
/// Tuple of (`x_train`, `x_test`, `y_train`, `y_test`).
///
/// # Errors
///
/// Returns [`ClasificarError::Data`] if the proportions are out of range,
/// sample counts disagree, or either resulting partition would be empty.
///
/// # Example
///
/// ```
/// use clasificar::model_selection::train_test_split;
/// use clasificar::primitives::Matrix;
///
/// let x = Matrix::from_vec(10, 2, (0..20).map(|i| i as f32).collect()).expect("valid");
/// let y = vec![0, 1, 0, 1, 0, 1, 0, 1, 0, 1];
///
/// let (x_train, x_test, y_train, y_test) =
///     train_test_split(&x, &y, 0.2, Some(42)).expect("valid split");
/// assert_eq!(x_train.n_rows(), 8);
/// assert_eq!(x_test.n_rows(), 2);
/// assert_eq!(y_train.len(), 8);
/// assert_eq!(y_test.len(), 2);
/// ```
#[allow(clippy::type_complexity)]
pub fn train_test_split(
    x: &Matrix<f32>,
    y: &[usize],
    test_size: f32,
    random_state: Option<u64>,
) -> Result<(Matrix<f32>, Matrix<f32>, Vec<usize>, Vec<usize>)> {
    let (n_train, _) = validate_split_inputs(x, y, test_size)?;
    let n_samples = x.n_rows();

    let indices = shuffle_indices(n_samples, random_state);
    let (x_train, y_train) = extract_samples(x, y, &indices[..n_train]);
    let (x_test, y_test) = extract_samples(x, y, &indices[n_train..]);

    Ok((x_train, x_test, y_train, y_test))
}

/// Partition of a labeled dataset into train, validation, and test sets.
#[derive(Debug, Clone)]
pub struct ThreeWaySplit {
    pub x_train: Matrix<f32>,
    pub y_train: Vec<usize>,
    pub x_validation: Matrix<f32>,
    pub y_validation: Vec<usize>,
    pub x_test: Matrix<f32>,
    pub y_test: Vec<usize>,
}

/// Splits a dataset three ways: train, validation, and test.
///
/// The holdout (validation + test) fraction is carved off first, then
/// divided between validation and test in proportion, each stage with its
/// own seeded shuffle.
///
/// # Errors
///
/// Returns [`ClasificarError::Data`] if the proportions leave any
/// partition empty or the inputs are inconsistent.
pub fn train_validation_test_split(
    x: &Matrix<f32>,
    y: &[usize],
    validation_size: f32,
    test_size: f32,
    random_state: Option<u64>,
) -> Result<ThreeWaySplit> {
    let holdout = validation_size + test_size;
    let (x_train, x_holdout, y_train, y_holdout) = train_test_split(x, y, holdout, random_state)?;
    let (x_validation, x_test, y_validation, y_test) = train_test_split(
        &x_holdout,
        &y_holdout,
        test_size / holdout,
        random_state,
    )?;

    Ok(ThreeWaySplit {
        x_train,
        y_train,
        x_validation,
        y_validation,
        x_test,
        y_test,
    })
}

/// Validates inputs and returns (`n_train`, `n_test`).
fn validate_split_inputs(x: &Matrix<f32>, y: &[usize], test_size: f32) -> Result<(usize, usize)> {
    if test_size <= 0.0 || test_size >= 1.0 {
        return Err(ClasificarError::data(format!(
            "test_size must be between 0 and 1, got {test_size}"
        )));
    }

    let n_samples = x.n_rows();
    if n_samples != y.len() {
        return Err(ClasificarError::data(format!(
            "x and y must have the same number of samples, got {n_samples} and {}",
            y.len()
        )));
    }

    let n_test = (n_samples as f32 * test_size).round() as usize;
    let n_train = n_samples - n_test;

    if n_test == 0 || n_train == 0 {
        return Err(ClasificarError::data(format!(
            "split would leave an empty partition (n_train={n_train}, n_test={n_test})"
        )));
    }

    Ok((n_train, n_test))
}

/// Shuffles indices with an optional random seed.
fn shuffle_indices(n_samples: usize, random_state: Option<u64>) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n_samples).collect();

    if let Some(seed) = random_state {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);
    } else {
        let mut rng = rand::thread_rng();
        indices.shuffle(&mut rng);
    }

    indices
}

/// Gathers the selected rows of `x` and entries of `y`.
fn extract_samples(x: &Matrix<f32>, y: &[usize], indices: &[usize]) -> (Matrix<f32>, Vec<usize>) {
    let n_features = x.n_cols();
    let mut data = Vec::with_capacity(indices.len() * n_features);
    let mut labels = Vec::with_capacity(indices.len());

    for &i in indices {
        data.extend_from_slice(x.row(i));
        labels.push(y[i]);
    }

    let matrix = Matrix::from_vec(indices.len(), n_features, data)
        .expect("gathered data length matches rows * cols");
    (matrix, labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(n: usize) -> (Matrix<f32>, Vec<usize>) {
        let x = Matrix::from_vec(n, 2, (0..n * 2).map(|i| i as f32).collect()).expect("valid");
        let y = (0..n).map(|i| i % 2).collect();
        (x, y)
    }

    #[test]
    fn test_split_sizes() {
        let (x, y) = dataset(10);
        let (x_train, x_test, y_train, y_test) =
            train_test_split(&x, &y, 0.2, Some(42)).expect("split");

        assert_eq!(x_train.n_rows(), 8);
        assert_eq!(x_test.n_rows(), 2);
        assert_eq!(y_train.len(), 8);
        assert_eq!(y_test.len(), 2);
        assert_eq!(x_train.n_cols(), 2);
        assert_eq!(x_test.n_cols(), 2);
    }

    #[test]
    fn test_split_reproducible_with_seed() {
        let (x, y) = dataset(10);
        let (a_train, a_test, ay_train, ay_test) =
            train_test_split(&x, &y, 0.2, Some(42)).expect("first");
        let (b_train, b_test, by_train, by_test) =
            train_test_split(&x, &y, 0.2, Some(42)).expect("second");

        assert_eq!(a_train.as_slice(), b_train.as_slice());
        assert_eq!(a_test.as_slice(), b_test.as_slice());
        assert_eq!(ay_train, by_train);
        assert_eq!(ay_test, by_test);
    }

    #[test]
    fn test_split_rows_pair_with_labels() {
        // Every extracted row must still carry its own label.
        let (x, y) = dataset(10);
        let (x_train, x_test, y_train, y_test) =
            train_test_split(&x, &y, 0.3, Some(7)).expect("split");

        for (row, &label) in (0..x_train.n_rows()).map(|i| x_train.row(i)).zip(&y_train) {
            let original = (row[0] as usize) / 2;
            assert_eq!(original % 2, label);
        }
        for (row, &label) in (0..x_test.n_rows()).map(|i| x_test.row(i)).zip(&y_test) {
            let original = (row[0] as usize) / 2;
            assert_eq!(original % 2, label);
        }
    }

    #[test]
    fn test_split_invalid_test_size() {
        let (x, y) = dataset(10);
        assert!(train_test_split(&x, &y, 0.0, Some(1)).is_err());
        assert!(train_test_split(&x, &y, 1.0, Some(1)).is_err());
    }

    #[test]
    fn test_split_length_mismatch() {
        let (x, _) = dataset(10);
        let y = vec![0, 1];
        assert!(matches!(
            train_test_split(&x, &y, 0.2, Some(1)).unwrap_err(),
            ClasificarError::Data { .. }
        ));
    }

    #[test]
    fn test_split_too_small_for_partition() {
        let (x, y) = dataset(2);
        // 10% of 2 samples rounds to zero test rows.
        assert!(train_test_split(&x, &y, 0.1, Some(1)).is_err());
    }

    #[test]
    fn test_three_way_split_proportions() {
        let (x, y) = dataset(40);
        let split =
            train_validation_test_split(&x, &y, 0.15, 0.15, Some(42)).expect("three-way split");

        assert_eq!(split.x_train.n_rows(), 28);
        assert_eq!(split.x_validation.n_rows(), 6);
        assert_eq!(split.x_test.n_rows(), 6);
        assert_eq!(
            split.x_train.n_rows() + split.x_validation.n_rows() + split.x_test.n_rows(),
            40
        );
    }

    #[test]
    fn test_three_way_split_disjoint() {
        let (x, y) = dataset(20);
        let split =
            train_validation_test_split(&x, &y, 0.15, 0.15, Some(3)).expect("three-way split");

        let mut seen: Vec<f32> = Vec::new();
        for m in [&split.x_train, &split.x_validation, &split.x_test] {
            for i in 0..m.n_rows() {
                seen.push(m.row(i)[0]);
            }
        }
        seen.sort_by(f32::total_cmp);
        let before = seen.len();
        seen.dedup();
        assert_eq!(before, seen.len(), "partitions must not share samples");
        assert_eq!(before, 20);
    }

    #[test]
    fn test_three_way_split_reproducible() {
        let (x, y) = dataset(40);
        let a = train_validation_test_split(&x, &y, 0.15, 0.15, Some(9)).expect("first");
        let b = train_validation_test_split(&x, &y, 0.15, 0.15, Some(9)).expect("second");
        assert_eq!(a.x_train.as_slice(), b.x_train.as_slice());
        assert_eq!(a.y_test, b.y_test);
    }
}
