use super::*;

fn owned(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_scaler_fit_transform_standardizes() {
    let data = Matrix::from_vec(3, 2, vec![0.0, 0.0, 1.0, 10.0, 2.0, 20.0]).expect("matrix");
    let mut scaler = StandardScaler::new();
    let scaled = scaler.fit_transform(&data).expect("fit_transform");

    // Each column has mean ~0 after standardization.
    for j in 0..2 {
        let mut sum = 0.0;
        for i in 0..3 {
            sum += scaled.get(i, j);
        }
        assert!((sum / 3.0).abs() < 1e-6, "column {j} mean should be ~0");
    }
}

#[test]
fn test_scaler_transform_vector_matches_matrix_transform() {
    let data = Matrix::from_vec(4, 3, vec![
        1.0, 5.0, 9.0,
        2.0, 6.0, 10.0,
        3.0, 7.0, 11.0,
        4.0, 8.0, 12.0,
    ])
    .expect("matrix");
    let mut scaler = StandardScaler::new();
    let scaled = scaler.fit_transform(&data).expect("fit_transform");

    let single = scaler.transform_vector(data.row(2)).expect("vector transform");
    assert_eq!(single.as_slice(), scaled.row(2));
}

#[test]
fn test_scaler_zero_variance_dimension_is_identity() {
    // Second column is constant: transform must not divide by zero.
    let data = Matrix::from_vec(3, 2, vec![1.0, 7.0, 2.0, 7.0, 3.0, 7.0]).expect("matrix");
    let mut scaler = StandardScaler::new();
    scaler.fit(&data).expect("fit");

    let out = scaler.transform_vector(&[2.0, 9.0]).expect("transform");
    assert!(out.iter().all(|v| v.is_finite()));
    // Centered but unscaled: 9.0 - 7.0.
    assert!((out[1] - 2.0).abs() < 1e-6);
}

#[test]
fn test_scaler_dimension_mismatch() {
    let data = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).expect("matrix");
    let mut scaler = StandardScaler::new();
    scaler.fit(&data).expect("fit");

    let err = scaler.transform_vector(&[1.0, 2.0]).unwrap_err();
    assert!(matches!(
        err,
        ClasificarError::DimensionMismatch {
            expected: 3,
            actual: 2
        }
    ));
}

#[test]
fn test_scaler_transform_before_fit_fails() {
    let scaler = StandardScaler::new();
    let err = scaler.transform_vector(&[1.0]).unwrap_err();
    assert!(matches!(err, ClasificarError::NotFitted { .. }));
}

#[test]
fn test_scaler_fit_zero_samples_fails() {
    let data = Matrix::from_vec(0, 2, vec![]).expect("matrix");
    let mut scaler = StandardScaler::new();
    assert!(matches!(
        scaler.fit(&data).unwrap_err(),
        ClasificarError::Data { .. }
    ));
}

#[test]
fn test_scaler_never_refits_on_transform() {
    let fit_data = Matrix::from_vec(2, 1, vec![0.0, 10.0]).expect("matrix");
    let mut scaler = StandardScaler::new();
    scaler.fit(&fit_data).expect("fit");
    let mean_before = scaler.mean().expect("fitted").to_vec();

    // Transforming very different data must leave the statistics untouched.
    let _ = scaler.transform_vector(&[1000.0]).expect("transform");
    assert_eq!(scaler.mean().expect("fitted"), mean_before.as_slice());
}

#[test]
fn test_encoder_round_trip() {
    let mut encoder = LabelEncoder::new();
    encoder
        .fit(&owned(&["healthy", "rust", "blight", "healthy"]))
        .expect("fit");

    for label in encoder.classes().to_vec() {
        let idx = encoder.encode(&label).expect("seen label");
        assert_eq!(encoder.decode(idx).expect("valid index"), label);
    }
}

#[test]
fn test_encoder_sorted_deterministic_ordering() {
    let mut a = LabelEncoder::new();
    a.fit(&owned(&["pear", "apple", "fig"])).expect("fit");
    let mut b = LabelEncoder::new();
    b.fit(&owned(&["fig", "pear", "apple", "pear"])).expect("fit");

    assert_eq!(a.classes(), b.classes());
    assert_eq!(a.classes(), &owned(&["apple", "fig", "pear"])[..]);
}

#[test]
fn test_encoder_unknown_label() {
    let mut encoder = LabelEncoder::new();
    encoder.fit(&owned(&["a", "b"])).expect("fit");

    let err = encoder.encode("c").unwrap_err();
    assert!(matches!(err, ClasificarError::UnknownLabel { .. }));
}

#[test]
fn test_encoder_index_out_of_range() {
    let mut encoder = LabelEncoder::new();
    encoder.fit(&owned(&["a", "b"])).expect("fit");

    let err = encoder.decode(2).unwrap_err();
    assert!(matches!(
        err,
        ClasificarError::IndexOutOfRange { index: 2, len: 2 }
    ));
}

#[test]
fn test_encoder_fit_empty_fails() {
    let mut encoder = LabelEncoder::new();
    assert!(matches!(
        encoder.fit(&[]).unwrap_err(),
        ClasificarError::Data { .. }
    ));
}

#[test]
fn test_encoder_encode_all() {
    let mut encoder = LabelEncoder::new();
    encoder.fit(&owned(&["x", "y"])).expect("fit");

    let indices = encoder.encode_all(&owned(&["y", "x", "y"])).expect("all seen");
    assert_eq!(indices, vec![1, 0, 1]);
}
