// Falsification suite: each test states a property of the classifier and
// tries to break it. Failure messages name the violated property.

use super::*;

fn fitted(k: usize) -> KNearestNeighbors {
    let x = Matrix::from_vec(6, 2, vec![
        0.0, 0.0, 0.5, 0.5, 1.0, 0.0,
        5.0, 5.0, 5.5, 5.5, 6.0, 5.0,
    ])
    .expect("valid");
    let y = vec![0, 0, 0, 1, 1, 1];
    let mut knn = KNearestNeighbors::new(k);
    knn.fit(&x, &y).expect("fit");
    knn
}

/// Predictions stay inside the fitted label set.
#[test]
fn contract_predictions_in_label_range() {
    let knn = fitted(3);
    for query in [[0.0, 0.0], [2.5, 2.5], [9.0, 9.0], [-3.0, 4.0]] {
        let p = knn.predict_one(&query).expect("predict");
        assert!(p <= 1, "prediction {p} outside {{0, 1}}");
    }
}

/// Vote fractions always sum to 1 regardless of the query position.
#[test]
fn contract_proba_sums_to_one() {
    for k in [1, 3, 5] {
        let knn = fitted(k);
        for query in [[0.0, 0.0], [2.5, 2.5], [100.0, -100.0]] {
            let proba = knn.predict_proba_one(&query).expect("proba");
            let total: f32 = proba.iter().sum();
            assert!(
                (total - 1.0).abs() < 1e-6,
                "vote fractions sum to {total} for k={k}"
            );
        }
    }
}

/// With k = 5, vote fractions are quantized to multiples of 0.2.
#[test]
fn contract_proba_quantized_by_k() {
    let knn = fitted(5);
    let proba = knn.predict_proba_one(&[2.7, 2.7]).expect("proba");
    for &p in &proba {
        let scaled = p * 5.0;
        assert!(
            (scaled - scaled.round()).abs() < 1e-6,
            "vote fraction {p} is not a multiple of 1/5"
        );
    }
}

/// Repeated prediction on identical input is bit-identical.
#[test]
fn contract_deterministic() {
    let knn = fitted(3);
    let queries = Matrix::from_vec(4, 2, vec![
        0.1, 0.1, 2.5, 2.5, 5.9, 5.9, -1.0, 7.0,
    ])
    .expect("valid");

    let first = knn.predict(&queries).expect("predict");
    let second = knn.predict(&queries).expect("predict");
    assert_eq!(first, second, "predictions differ on identical input");

    let p1 = knn.predict_proba(&queries).expect("proba");
    let p2 = knn.predict_proba(&queries).expect("proba");
    assert_eq!(p1, p2, "probabilities differ on identical input");
}

/// Well-separated clusters are classified perfectly.
#[test]
fn contract_separable_data() {
    let x = Matrix::from_vec(6, 2, vec![
        0.0, 0.0, 0.1, 0.1, 0.2, 0.2,
        100.0, 100.0, 100.1, 100.1, 100.2, 100.2,
    ])
    .expect("valid");
    let y = vec![0, 0, 0, 1, 1, 1];

    let mut knn = KNearestNeighbors::new(3);
    knn.fit(&x, &y).expect("fit");

    let preds = knn.predict(&x).expect("predict");
    assert_eq!(preds, y, "kNN cannot classify well-separated clusters");
}

/// The max vote fraction is at least the plurality share,
/// ceil(k / n_classes) / k.
#[test]
fn contract_confidence_at_least_plurality_share() {
    let knn = fitted(5);
    let proba = knn.predict_proba_one(&[2.0, 2.0]).expect("proba");
    let max = proba.iter().fold(0.0f32, |a, &b| a.max(b));
    // 5 votes over 2 classes: the winner holds >= 3.
    assert!(max >= 3.0 / 5.0 - 1e-6, "plurality share {max} below 3/5");
}
