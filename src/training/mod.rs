//! Offline training orchestration.
//!
//! Walks a directory-of-directories image corpus (one subdirectory per
//! category label), extracts features from every readable image, fits the
//! label encoder and scaler over the full corpus, selects k by validation
//! accuracy, and produces a [`FittedModel`] plus a quality report.
//!
//! Unreadable images are skipped and logged, never fatal; an entirely
//! empty corpus aborts the run before any artifact exists.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{info, warn};

use crate::bundle::FittedModel;
use crate::classification::KNearestNeighbors;
use crate::error::{ClasificarError, Result};
use crate::metrics::{accuracy, classification_report};
use crate::model_selection::train_validation_test_split;
use crate::preprocessing::{LabelEncoder, StandardScaler};
use crate::primitives::Matrix;
use crate::traits::Transformer;
use crate::vision;

/// The k values tried during the validation sweep.
pub const DEFAULT_CANDIDATE_KS: &[usize] = &[3, 5, 7, 9];

/// Fraction of the corpus held out for validation by default.
pub const DEFAULT_VALIDATION_SIZE: f32 = 0.15;
/// Fraction of the corpus held out for the final test by default.
pub const DEFAULT_TEST_SIZE: f32 = 0.15;
/// Default shuffle seed.
pub const DEFAULT_RANDOM_STATE: u64 = 42;

/// Orchestrates one training run over an image corpus.
///
/// # Example
///
/// ```no_run
/// use clasificar::training::Trainer;
///
/// let (model, report) = Trainer::new("data/leaves")
///     .with_random_state(42)
///     .run()
///     .expect("training run");
/// println!("k={} test accuracy={:.2}", model.classifier().k(), report.test_accuracy);
/// ```
#[derive(Debug, Clone)]
pub struct Trainer {
    corpus_dir: PathBuf,
    candidate_ks: Vec<usize>,
    validation_size: f32,
    test_size: f32,
    random_state: u64,
    output_dir: Option<PathBuf>,
}

/// Quality signal of a completed training run.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    /// Valid examples extracted from the corpus.
    pub n_examples: usize,
    /// Images skipped because they could not be decoded.
    pub n_skipped: usize,
    /// Samples in the train partition.
    pub n_train: usize,
    /// Samples in the validation partition.
    pub n_validation: usize,
    /// Samples in the test partition.
    pub n_test: usize,
    /// Validation accuracy per candidate k, in sweep order.
    pub validation_accuracy: Vec<(usize, f32)>,
    /// The winning k (highest validation accuracy, ties to the smallest).
    pub best_k: usize,
    /// Accuracy on the held-out test partition.
    pub test_accuracy: f32,
    /// Per-class precision/recall/F1 table for the test partition.
    pub class_report: String,
}

impl Trainer {
    /// Creates a trainer for the corpus rooted at `corpus_dir` with the
    /// default sweep, split proportions, and seed.
    pub fn new<P: AsRef<Path>>(corpus_dir: P) -> Self {
        Self {
            corpus_dir: corpus_dir.as_ref().to_path_buf(),
            candidate_ks: DEFAULT_CANDIDATE_KS.to_vec(),
            validation_size: DEFAULT_VALIDATION_SIZE,
            test_size: DEFAULT_TEST_SIZE,
            random_state: DEFAULT_RANDOM_STATE,
            output_dir: None,
        }
    }

    /// Persists the fitted bundle into `dir` at the end of a successful
    /// run. A run that aborts writes nothing.
    #[must_use]
    pub fn with_output_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.output_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Replaces the candidate k sweep. Values are sorted and deduplicated
    /// so ties always resolve to the smallest k.
    #[must_use]
    pub fn with_candidate_ks(mut self, ks: &[usize]) -> Self {
        let mut ks = ks.to_vec();
        ks.sort_unstable();
        ks.dedup();
        self.candidate_ks = ks;
        self
    }

    /// Sets the shuffle seed for reproducible splits.
    #[must_use]
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = random_state;
        self
    }

    /// Sets the validation and test hold-out fractions.
    #[must_use]
    pub fn with_split(mut self, validation_size: f32, test_size: f32) -> Self {
        self.validation_size = validation_size;
        self.test_size = test_size;
        self
    }

    /// Runs the full training procedure and returns the fitted bundle
    /// plus its quality report.
    ///
    /// # Errors
    ///
    /// Returns [`ClasificarError::Data`] if the corpus yields zero valid
    /// examples, is structurally malformed, or is too small for the
    /// configured split and sweep; I/O errors propagate as
    /// [`ClasificarError::Io`].
    pub fn run(&self) -> Result<(FittedModel, TrainingReport)> {
        let corpus = self.load_corpus()?;
        info!(
            n_examples = corpus.features.len(),
            n_skipped = corpus.n_skipped,
            n_labels = corpus.labels.len(),
            "corpus extraction complete"
        );

        let mut encoder = LabelEncoder::new();
        encoder.fit(&corpus.labels)?;
        let y = encoder.encode_all(&corpus.labels)?;

        let x = Matrix::from_rows(&corpus.features)
            .map_err(|e| ClasificarError::data(e.to_string()))?;
        let mut scaler = StandardScaler::new();
        let x_scaled = scaler.fit_transform(&x)?;

        let split = train_validation_test_split(
            &x_scaled,
            &y,
            self.validation_size,
            self.test_size,
            Some(self.random_state),
        )?;
        info!(
            n_train = split.x_train.n_rows(),
            n_validation = split.x_validation.n_rows(),
            n_test = split.x_test.n_rows(),
            "dataset split"
        );

        let n_classes = encoder.n_classes();
        let mut validation_accuracy = Vec::new();
        let mut best: Option<(usize, f32)> = None;

        for &k in &self.candidate_ks {
            if k > split.x_train.n_rows() {
                warn!(k, n_train = split.x_train.n_rows(), "skipping candidate k larger than train partition");
                continue;
            }
            let mut candidate = KNearestNeighbors::new(k).with_num_classes(n_classes);
            candidate.fit(&split.x_train, &split.y_train)?;
            let predictions = candidate.predict(&split.x_validation)?;
            let acc = accuracy(&predictions, &split.y_validation);
            info!(k, validation_accuracy = acc, "sweep candidate evaluated");
            validation_accuracy.push((k, acc));

            // Strict comparison over an ascending sweep keeps the
            // smallest k on ties.
            if best.map_or(true, |(_, best_acc)| acc > best_acc) {
                best = Some((k, acc));
            }
        }

        let (best_k, best_acc) = best.ok_or_else(|| {
            ClasificarError::data(format!(
                "no candidate k fits the train partition of {} samples",
                split.x_train.n_rows()
            ))
        })?;
        info!(best_k, validation_accuracy = best_acc, "selected k");

        let mut classifier = KNearestNeighbors::new(best_k).with_num_classes(n_classes);
        classifier.fit(&split.x_train, &split.y_train)?;

        let test_predictions = classifier.predict(&split.x_test)?;
        let test_accuracy = accuracy(&test_predictions, &split.y_test);
        let class_report =
            classification_report(&test_predictions, &split.y_test, encoder.classes());
        info!(test_accuracy, "held-out evaluation complete\n{class_report}");

        let report = TrainingReport {
            n_examples: corpus.features.len(),
            n_skipped: corpus.n_skipped,
            n_train: split.x_train.n_rows(),
            n_validation: split.x_validation.n_rows(),
            n_test: split.x_test.n_rows(),
            validation_accuracy,
            best_k,
            test_accuracy,
            class_report,
        };

        let model = FittedModel::new(scaler, encoder, classifier)?;
        if let Some(dir) = &self.output_dir {
            model.save(dir)?;
        }
        Ok((model, report))
    }

    /// Walks the corpus and extracts features from every readable image.
    ///
    /// Per-image decode failures are logged and skipped; only an entirely
    /// unusable corpus is an error.
    fn load_corpus(&self) -> Result<Corpus> {
        let mut work: Vec<(PathBuf, String)> = Vec::new();
        let mut saw_category_dir = false;

        let mut entries: Vec<_> = std::fs::read_dir(&self.corpus_dir)?
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort_by_key(std::fs::DirEntry::path);

        for entry in entries {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            saw_category_dir = true;
            let Some(label) = path.file_name().and_then(|n| n.to_str()) else {
                return Err(ClasificarError::data(format!(
                    "category directory {} has a non-UTF-8 name",
                    path.display()
                )));
            };
            info!(label, "scanning category directory");

            let mut files: Vec<_> = std::fs::read_dir(&path)?
                .collect::<std::io::Result<Vec<_>>>()?;
            files.sort_by_key(std::fs::DirEntry::path);
            for file in files {
                let file_path = file.path();
                if file_path.is_file() {
                    work.push((file_path, label.to_string()));
                }
            }
        }

        if !saw_category_dir {
            return Err(ClasificarError::data(format!(
                "corpus {} contains no category directories",
                self.corpus_dir.display()
            )));
        }

        // Per-image work is independent; extract in parallel, preserving
        // the deterministic work-list order in the collected output.
        let extracted: Vec<Option<(Vec<f32>, String)>> = work
            .par_iter()
            .map(|(path, label)| match extract_file(path) {
                Ok(features) => Some((features, label.clone())),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable image");
                    None
                }
            })
            .collect();

        let n_total = extracted.len();
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for item in extracted.into_iter().flatten() {
            features.push(item.0);
            labels.push(item.1);
        }
        let n_skipped = n_total - features.len();

        if features.is_empty() {
            return Err(ClasificarError::data(format!(
                "no valid examples extracted from {}",
                self.corpus_dir.display()
            )));
        }

        Ok(Corpus {
            features,
            labels,
            n_skipped,
        })
    }
}

/// Extracted corpus: one feature vector and label per readable image.
struct Corpus {
    features: Vec<Vec<f32>>,
    labels: Vec<String>,
    n_skipped: usize,
}

/// Reads and extracts one image file.
fn extract_file(path: &Path) -> Result<Vec<f32>> {
    let payload = std::fs::read(path)
        .map_err(|e| ClasificarError::extraction(format!("cannot read {}: {e}", path.display())))?;
    vision::extract_from_bytes(&payload)
}
