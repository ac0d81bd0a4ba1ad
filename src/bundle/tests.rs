use super::*;
use crate::traits::Transformer;
use tempfile::tempdir;

fn fitted_bundle() -> FittedModel {
    // Six samples, two classes, three features.
    let x = Matrix::from_vec(6, 3, vec![
        0.0, 0.1, 0.2,
        0.1, 0.0, 0.3,
        0.2, 0.2, 0.1,
        5.0, 5.1, 5.2,
        5.1, 5.0, 5.3,
        5.2, 5.2, 5.1,
    ])
    .expect("valid");
    let labels = vec!["sana".to_string(); 3]
        .into_iter()
        .chain(vec!["roya".to_string(); 3])
        .collect::<Vec<_>>();

    let mut encoder = LabelEncoder::new();
    encoder.fit(&labels).expect("fit encoder");
    let y = encoder.encode_all(&labels).expect("encode");

    let mut scaler = StandardScaler::new();
    let x_scaled = scaler.fit_transform(&x).expect("fit scaler");

    let mut classifier = KNearestNeighbors::new(3).with_num_classes(encoder.n_classes());
    classifier.fit(&x_scaled, &y).expect("fit classifier");

    FittedModel::new(scaler, encoder, classifier).expect("consistent bundle")
}

#[test]
fn test_save_load_round_trip() {
    let dir = tempdir().expect("tempdir");
    let model = fitted_bundle();
    model.save(dir.path()).expect("save");

    let loaded = FittedModel::load(dir.path()).expect("load");
    assert_eq!(loaded.run_id(), model.run_id());
    assert_eq!(loaded.n_features(), 3);
    assert_eq!(loaded.n_classes(), 2);
    assert_eq!(loaded.encoder().classes(), model.encoder().classes());
    assert_eq!(loaded.classifier().k(), 3);

    // The loaded classifier reproduces the original's predictions.
    let query = loaded
        .scaler()
        .transform_vector(&[0.1, 0.1, 0.2])
        .expect("transform");
    let original = model.classifier().predict_one(&query).expect("predict");
    let restored = loaded.classifier().predict_one(&query).expect("predict");
    assert_eq!(original, restored);
}

#[test]
fn test_load_missing_blob_fails_fast() {
    let dir = tempdir().expect("tempdir");
    let model = fitted_bundle();
    model.save(dir.path()).expect("save");
    std::fs::remove_file(dir.path().join(CLASSIFIER_FILE)).expect("remove");

    let err = FittedModel::load(dir.path()).unwrap_err();
    assert!(matches!(err, ClasificarError::Io(_)));
}

#[test]
fn test_load_corrupt_blob_fails_fast() {
    let dir = tempdir().expect("tempdir");
    let model = fitted_bundle();
    model.save(dir.path()).expect("save");
    std::fs::write(dir.path().join(SCALER_FILE), b"corrupt").expect("write");

    let err = FittedModel::load(dir.path()).unwrap_err();
    assert!(matches!(err, ClasificarError::Serialization(_)));
}

#[test]
fn test_load_rejects_mixed_runs() {
    let dir_a = tempdir().expect("tempdir a");
    let dir_b = tempdir().expect("tempdir b");
    fitted_bundle().save(dir_a.path()).expect("save a");
    fitted_bundle().save(dir_b.path()).expect("save b");

    // Swap run B's scaler into run A's directory.
    std::fs::copy(dir_b.path().join(SCALER_FILE), dir_a.path().join(SCALER_FILE))
        .expect("copy scaler");

    let err = FittedModel::load(dir_a.path()).unwrap_err();
    assert!(matches!(err, ClasificarError::ArtifactMismatch { .. }));
    assert!(err.to_string().contains("different runs"));
}

#[test]
fn test_new_rejects_dimension_mismatch() {
    let model = fitted_bundle();

    // A scaler fit on 2 features cannot pair with a 3-feature classifier.
    let mut narrow_scaler = StandardScaler::new();
    let narrow = Matrix::from_vec(2, 2, vec![0.0, 1.0, 2.0, 3.0]).expect("valid");
    narrow_scaler.fit(&narrow).expect("fit");

    let err = FittedModel::new(
        narrow_scaler,
        model.encoder().clone(),
        model.classifier().clone(),
    )
    .unwrap_err();
    assert!(matches!(err, ClasificarError::ArtifactMismatch { .. }));
}

#[test]
fn test_new_rejects_class_count_mismatch() {
    let model = fitted_bundle();

    let mut wide_encoder = LabelEncoder::new();
    wide_encoder
        .fit(&["a".to_string(), "b".to_string(), "c".to_string()])
        .expect("fit");

    let err = FittedModel::new(
        model.scaler().clone(),
        wide_encoder,
        model.classifier().clone(),
    )
    .unwrap_err();
    assert!(matches!(err, ClasificarError::ArtifactMismatch { .. }));
}

#[test]
fn test_new_rejects_unfitted_artifacts() {
    let model = fitted_bundle();
    let err = FittedModel::new(
        StandardScaler::new(),
        model.encoder().clone(),
        model.classifier().clone(),
    )
    .unwrap_err();
    assert!(matches!(err, ClasificarError::NotFitted { .. }));
}

#[test]
fn test_distinct_runs_have_distinct_ids() {
    let a = fitted_bundle();
    let b = fitted_bundle();
    assert_ne!(a.run_id(), b.run_id());
}
