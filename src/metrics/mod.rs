//! Classification metrics for evaluating model quality.
//!
//! Provides accuracy, precision, recall, F1-score, confusion matrix, and a
//! per-class text report for multi-class classification.

use std::fmt::Write as _;

use crate::primitives::Matrix;

/// Averaging strategy for multi-class metrics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Average {
    /// Calculate metrics for each label, return unweighted mean.
    Macro,
    /// Calculate metrics globally by counting total TP, FP, FN.
    Micro,
    /// Weighted mean by support (number of true instances per label).
    Weighted,
}

/// Compute classification accuracy.
///
/// accuracy = `correct_predictions` / `total_predictions`
///
/// # Panics
///
/// Panics if vectors have different lengths or are empty.
///
/// # Examples
///
/// ```
/// use clasificar::metrics::accuracy;
///
/// let y_true = vec![0, 1, 2, 0, 1, 2];
/// let y_pred = vec![0, 2, 1, 0, 0, 1];
/// let acc = accuracy(&y_pred, &y_true);
/// assert!((acc - 0.333333).abs() < 0.001);
/// ```
#[must_use]
pub fn accuracy(y_pred: &[usize], y_true: &[usize]) -> f32 {
    assert_eq!(y_pred.len(), y_true.len(), "Vectors must have same length");
    assert!(!y_true.is_empty(), "Vectors cannot be empty");

    let correct = y_pred
        .iter()
        .zip(y_true.iter())
        .filter(|(p, t)| p == t)
        .count();

    correct as f32 / y_true.len() as f32
}

/// Compute precision score (TP / (TP + FP)).
///
/// # Panics
///
/// Panics if vectors have different lengths or are empty.
#[must_use]
pub fn precision(y_pred: &[usize], y_true: &[usize], average: Average) -> f32 {
    let n_classes = count_classes(y_pred, y_true);
    let counts = ClassCounts::tally(y_pred, y_true, n_classes);
    counts.averaged(average, |c, i| c.class_precision(i))
}

/// Compute recall score (TP / (TP + FN)).
///
/// # Panics
///
/// Panics if vectors have different lengths or are empty.
#[must_use]
pub fn recall(y_pred: &[usize], y_true: &[usize], average: Average) -> f32 {
    let n_classes = count_classes(y_pred, y_true);
    let counts = ClassCounts::tally(y_pred, y_true, n_classes);
    counts.averaged(average, |c, i| c.class_recall(i))
}

/// Compute F1 score (harmonic mean of precision and recall).
///
/// # Panics
///
/// Panics if vectors have different lengths or are empty.
///
/// # Examples
///
/// ```
/// use clasificar::metrics::{f1_score, Average};
///
/// let y_true = vec![0, 1, 2, 0, 1, 2];
/// let y_pred = vec![0, 2, 1, 0, 0, 1];
/// let f1 = f1_score(&y_pred, &y_true, Average::Macro);
/// assert!((0.0..=1.0).contains(&f1));
/// ```
#[must_use]
pub fn f1_score(y_pred: &[usize], y_true: &[usize], average: Average) -> f32 {
    let n_classes = count_classes(y_pred, y_true);
    let counts = ClassCounts::tally(y_pred, y_true, n_classes);
    counts.averaged(average, ClassCounts::class_f1)
}

/// Compute the confusion matrix.
///
/// Element `[i, j]` is the count of samples with true label i and
/// predicted label j.
///
/// # Panics
///
/// Panics if vectors have different lengths or are empty.
#[must_use]
pub fn confusion_matrix(y_pred: &[usize], y_true: &[usize]) -> Matrix<usize> {
    let n_classes = count_classes(y_pred, y_true);

    let mut data = vec![0usize; n_classes * n_classes];
    for (&true_label, &pred_label) in y_true.iter().zip(y_pred.iter()) {
        data[true_label * n_classes + pred_label] += 1;
    }

    Matrix::from_vec(n_classes, n_classes, data)
        .expect("Confusion matrix dimensions match data length")
}

/// Render a per-class precision/recall/F1/support table plus overall
/// accuracy, with one row per entry of `class_names`.
///
/// # Panics
///
/// Panics if vectors have different lengths or are empty, or if a label
/// index is not covered by `class_names`.
///
/// # Examples
///
/// ```
/// use clasificar::metrics::classification_report;
///
/// let y_true = vec![0, 0, 1, 1];
/// let y_pred = vec![0, 1, 1, 1];
/// let names = vec!["cat".to_string(), "dog".to_string()];
/// let report = classification_report(&y_pred, &y_true, &names);
/// assert!(report.contains("cat"));
/// assert!(report.contains("accuracy"));
/// ```
#[must_use]
pub fn classification_report(y_pred: &[usize], y_true: &[usize], class_names: &[String]) -> String {
    assert_eq!(y_pred.len(), y_true.len(), "Vectors must have same length");
    assert!(!y_true.is_empty(), "Vectors cannot be empty");
    let observed = count_classes(y_pred, y_true);
    assert!(
        observed <= class_names.len(),
        "label index {} has no class name",
        observed - 1
    );

    let n_classes = class_names.len();
    let counts = ClassCounts::tally(y_pred, y_true, n_classes);

    let name_width = class_names
        .iter()
        .map(String::len)
        .max()
        .unwrap_or(0)
        .max("accuracy".len());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>name_width$}  {:>9}  {:>9}  {:>9}  {:>9}",
        "", "precision", "recall", "f1-score", "support"
    );
    out.push('\n');

    for (i, name) in class_names.iter().enumerate() {
        let _ = writeln!(
            out,
            "{name:>name_width$}  {:>9.2}  {:>9.2}  {:>9.2}  {:>9}",
            counts.class_precision(i),
            counts.class_recall(i),
            counts.class_f1(i),
            counts.support[i],
        );
    }

    out.push('\n');
    let _ = writeln!(
        out,
        "{:>name_width$}  {:>9}  {:>9}  {:>9.2}  {:>9}",
        "accuracy",
        "",
        "",
        accuracy(y_pred, y_true),
        y_true.len(),
    );
    let _ = writeln!(
        out,
        "{:>name_width$}  {:>9.2}  {:>9.2}  {:>9.2}  {:>9}",
        "macro avg",
        counts.averaged(Average::Macro, |c, i| c.class_precision(i)),
        counts.averaged(Average::Macro, |c, i| c.class_recall(i)),
        counts.averaged(Average::Macro, ClassCounts::class_f1),
        y_true.len(),
    );
    let _ = writeln!(
        out,
        "{:>name_width$}  {:>9.2}  {:>9.2}  {:>9.2}  {:>9}",
        "weighted avg",
        counts.averaged(Average::Weighted, |c, i| c.class_precision(i)),
        counts.averaged(Average::Weighted, |c, i| c.class_recall(i)),
        counts.averaged(Average::Weighted, ClassCounts::class_f1),
        y_true.len(),
    );

    out
}

/// Number of classes implied by the highest label index seen.
fn count_classes(y_pred: &[usize], y_true: &[usize]) -> usize {
    assert_eq!(y_pred.len(), y_true.len(), "Vectors must have same length");
    assert!(!y_true.is_empty(), "Vectors cannot be empty");
    y_true
        .iter()
        .chain(y_pred.iter())
        .max()
        .map_or(0, |&m| m + 1)
}

/// Per-class TP/FP/FN/support tallies shared by every metric.
struct ClassCounts {
    tp: Vec<usize>,
    fp: Vec<usize>,
    fn_counts: Vec<usize>,
    support: Vec<usize>,
}

impl ClassCounts {
    fn tally(y_pred: &[usize], y_true: &[usize], n_classes: usize) -> Self {
        let mut counts = Self {
            tp: vec![0; n_classes],
            fp: vec![0; n_classes],
            fn_counts: vec![0; n_classes],
            support: vec![0; n_classes],
        };

        for (&true_label, &pred_label) in y_true.iter().zip(y_pred.iter()) {
            counts.support[true_label] += 1;
            if true_label == pred_label {
                counts.tp[true_label] += 1;
            } else {
                counts.fp[pred_label] += 1;
                counts.fn_counts[true_label] += 1;
            }
        }

        counts
    }

    fn n_classes(&self) -> usize {
        self.tp.len()
    }

    fn class_precision(&self, i: usize) -> f32 {
        ratio(self.tp[i], self.tp[i] + self.fp[i])
    }

    fn class_recall(&self, i: usize) -> f32 {
        ratio(self.tp[i], self.tp[i] + self.fn_counts[i])
    }

    fn class_f1(&self, i: usize) -> f32 {
        let prec = self.class_precision(i);
        let rec = self.class_recall(i);
        if prec + rec == 0.0 {
            0.0
        } else {
            2.0 * prec * rec / (prec + rec)
        }
    }

    fn averaged(&self, average: Average, per_class: impl Fn(&Self, usize) -> f32) -> f32 {
        let n = self.n_classes();
        if n == 0 {
            return 0.0;
        }
        match average {
            Average::Micro => {
                // For single-label classification every micro metric
                // reduces to the same TP ratio.
                let total_tp: usize = self.tp.iter().sum();
                let total: usize = self.support.iter().sum();
                ratio(total_tp, total)
            }
            Average::Macro => {
                (0..n).map(|i| per_class(self, i)).sum::<f32>() / n as f32
            }
            Average::Weighted => {
                let total_support: usize = self.support.iter().sum();
                if total_support == 0 {
                    return 0.0;
                }
                (0..n)
                    .map(|i| per_class(self, i) * self.support[i] as f32 / total_support as f32)
                    .sum()
            }
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f32 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f32 / denominator as f32
    }
}
