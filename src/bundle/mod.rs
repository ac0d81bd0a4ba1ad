//! The fitted-model bundle: scaler, label encoder, and classifier from one
//! training run.
//!
//! The three artifacts are persisted as separate blobs but form a single
//! versioned unit: every blob carries the run id it was produced by, and
//! loading refuses any combination whose run ids, feature dimensionality,
//! or class counts disagree. Mixing a scaler from one run with a
//! classifier from another must fail before a single prediction is made.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::classification::KNearestNeighbors;
use crate::error::{ClasificarError, Result};
use crate::preprocessing::{LabelEncoder, StandardScaler};
use crate::primitives::Matrix;
use crate::serialization::safetensors;

/// File name of the scaler blob inside a bundle directory.
pub const SCALER_FILE: &str = "scaler.safetensors";
/// File name of the classifier blob inside a bundle directory.
pub const CLASSIFIER_FILE: &str = "knn.safetensors";
/// File name of the label-encoder blob inside a bundle directory.
pub const ENCODER_FILE: &str = "label_encoder.json";

/// The label encoder's on-disk form.
#[derive(Debug, Serialize, Deserialize)]
struct EncoderDocument {
    run_id: String,
    classes: Vec<String>,
}

/// The three co-versioned artifacts of one training run.
///
/// Constructed by the trainer, persisted with [`FittedModel::save`], and
/// loaded once at service start with [`FittedModel::load`]. After loading
/// the bundle is read-only; a new training run is the only way to replace
/// it.
#[derive(Debug, Clone)]
pub struct FittedModel {
    run_id: String,
    scaler: StandardScaler,
    encoder: LabelEncoder,
    classifier: KNearestNeighbors,
}

impl FittedModel {
    /// Bundles freshly fitted artifacts under a new run id.
    ///
    /// # Errors
    ///
    /// Returns [`ClasificarError::ArtifactMismatch`] if the artifacts are
    /// not mutually consistent, or [`ClasificarError::NotFitted`] if any
    /// of them is unfitted.
    pub fn new(
        scaler: StandardScaler,
        encoder: LabelEncoder,
        classifier: KNearestNeighbors,
    ) -> Result<Self> {
        let run_id = format!("{:016x}", rand::random::<u64>());
        Self::from_parts(run_id, scaler, encoder, classifier)
    }

    fn from_parts(
        run_id: String,
        scaler: StandardScaler,
        encoder: LabelEncoder,
        classifier: KNearestNeighbors,
    ) -> Result<Self> {
        let scaler_dim = scaler.n_features().ok_or(ClasificarError::NotFitted {
            component: "StandardScaler",
        })?;
        let classifier_dim = classifier.n_features().ok_or(ClasificarError::NotFitted {
            component: "KNearestNeighbors",
        })?;
        if !encoder.is_fitted() {
            return Err(ClasificarError::NotFitted {
                component: "LabelEncoder",
            });
        }

        if scaler_dim != classifier_dim {
            return Err(ClasificarError::ArtifactMismatch {
                message: format!(
                    "scaler has {scaler_dim} features but classifier stores {classifier_dim}"
                ),
            });
        }
        if encoder.n_classes() != classifier.n_classes() {
            return Err(ClasificarError::ArtifactMismatch {
                message: format!(
                    "encoder knows {} classes but classifier is aligned to {}",
                    encoder.n_classes(),
                    classifier.n_classes()
                ),
            });
        }

        Ok(Self {
            run_id,
            scaler,
            encoder,
            classifier,
        })
    }

    /// Identifier of the training run that produced this bundle.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// The fitted feature scaler.
    #[must_use]
    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    /// The fitted label encoder.
    #[must_use]
    pub fn encoder(&self) -> &LabelEncoder {
        &self.encoder
    }

    /// The fitted classifier.
    #[must_use]
    pub fn classifier(&self) -> &KNearestNeighbors {
        &self.classifier
    }

    /// Feature dimensionality shared by all three artifacts.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.scaler.n_features().expect("bundle is always fitted")
    }

    /// Number of classes shared by encoder and classifier.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.encoder.n_classes()
    }

    /// Persists the bundle as three blobs in `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if any blob cannot be serialized or written.
    pub fn save<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let mut user = safetensors::UserMetadata::new();
        user.insert("run_id".to_string(), self.run_id.clone());

        // Scaler blob: per-dimension statistics.
        let mut tensors = safetensors::TensorMap::new();
        let mean = self.scaler.mean()?;
        let std = self.scaler.std()?;
        tensors.insert("mean".to_string(), (mean.to_vec(), vec![mean.len()]));
        tensors.insert("std".to_string(), (std.to_vec(), vec![std.len()]));
        safetensors::save(dir.join(SCALER_FILE), &tensors, &user)?;

        // Classifier blob: full reference set, labels, and k.
        let references = self
            .classifier
            .references()
            .ok_or(ClasificarError::NotFitted {
                component: "KNearestNeighbors",
            })?;
        let labels = self.classifier.labels().ok_or(ClasificarError::NotFitted {
            component: "KNearestNeighbors",
        })?;
        let (n_refs, n_features) = references.shape();
        let mut tensors = safetensors::TensorMap::new();
        tensors.insert(
            "references".to_string(),
            (references.as_slice().to_vec(), vec![n_refs, n_features]),
        );
        tensors.insert(
            "labels".to_string(),
            (labels.iter().map(|&l| l as f32).collect(), vec![n_refs]),
        );
        tensors.insert(
            "k".to_string(),
            (vec![self.classifier.k() as f32], vec![1]),
        );
        let mut classifier_user = user.clone();
        classifier_user.insert(
            "n_classes".to_string(),
            self.classifier.n_classes().to_string(),
        );
        safetensors::save(dir.join(CLASSIFIER_FILE), &tensors, &classifier_user)?;

        // Encoder blob: class names are strings, so JSON instead of tensors.
        let document = EncoderDocument {
            run_id: self.run_id.clone(),
            classes: self.encoder.classes().to_vec(),
        };
        let json = serde_json::to_string_pretty(&document)?;
        std::fs::write(dir.join(ENCODER_FILE), json)?;

        info!(run_id = %self.run_id, dir = %dir.display(), "saved fitted model bundle");
        Ok(())
    }

    /// Loads and cross-checks the three blobs from `dir`.
    ///
    /// Fails fast: a missing or corrupt blob, mismatched run ids, or
    /// incompatible shapes all abort the load so no service ever runs on a
    /// partially loaded or mixed-run model.
    ///
    /// # Errors
    ///
    /// Returns [`ClasificarError::Io`] / [`ClasificarError::Serialization`]
    /// for unreadable blobs and [`ClasificarError::ArtifactMismatch`] for
    /// run-pairing violations.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();

        // Scaler blob.
        let (metadata, user, raw) = safetensors::load(dir.join(SCALER_FILE))?;
        let scaler_run_id = required_metadata(&user, "run_id", SCALER_FILE)?;
        let mean = extract_named(&metadata, &raw, "mean", SCALER_FILE)?;
        let std = extract_named(&metadata, &raw, "std", SCALER_FILE)?;
        let scaler = StandardScaler::from_parts(mean, std)?;

        // Classifier blob.
        let (metadata, user, raw) = safetensors::load(dir.join(CLASSIFIER_FILE))?;
        let classifier_run_id = required_metadata(&user, "run_id", CLASSIFIER_FILE)?;
        let n_classes: usize = required_metadata(&user, "n_classes", CLASSIFIER_FILE)?
            .parse()
            .map_err(|_| {
                ClasificarError::Serialization(format!(
                    "{CLASSIFIER_FILE}: n_classes metadata is not an integer"
                ))
            })?;
        let reference_meta = metadata.get("references").ok_or_else(|| {
            ClasificarError::Serialization(format!("{CLASSIFIER_FILE}: missing 'references' tensor"))
        })?;
        let &[n_refs, n_features] = reference_meta.shape.as_slice() else {
            return Err(ClasificarError::Serialization(format!(
                "{CLASSIFIER_FILE}: 'references' tensor must be 2-D, got shape {:?}",
                reference_meta.shape
            )));
        };
        let reference_data = safetensors::extract_tensor(&raw, reference_meta)?;
        let references = Matrix::from_vec(n_refs, n_features, reference_data)
            .map_err(|e| ClasificarError::Serialization(format!("{CLASSIFIER_FILE}: {e}")))?;
        let labels: Vec<usize> = extract_named(&metadata, &raw, "labels", CLASSIFIER_FILE)?
            .into_iter()
            .map(|l| l as usize)
            .collect();
        let k = extract_named(&metadata, &raw, "k", CLASSIFIER_FILE)?
            .first()
            .copied()
            .ok_or_else(|| {
                ClasificarError::Serialization(format!("{CLASSIFIER_FILE}: empty 'k' tensor"))
            })? as usize;
        let classifier = KNearestNeighbors::from_parts(k, n_classes, references, labels)?;

        // Encoder blob.
        let encoder_json = std::fs::read_to_string(dir.join(ENCODER_FILE))?;
        let document: EncoderDocument = serde_json::from_str(&encoder_json)?;
        let encoder = LabelEncoder::from_classes(document.classes);

        // Run pairing comes first: a dimension check on mixed-run blobs
        // would report the wrong problem.
        if scaler_run_id != classifier_run_id || scaler_run_id != document.run_id {
            return Err(ClasificarError::ArtifactMismatch {
                message: format!(
                    "artifacts come from different runs: scaler={scaler_run_id}, \
                     classifier={classifier_run_id}, encoder={}",
                    document.run_id
                ),
            });
        }

        let model = Self::from_parts(scaler_run_id, scaler, encoder, classifier)?;
        info!(
            run_id = %model.run_id,
            n_features = model.n_features(),
            n_classes = model.n_classes(),
            "loaded fitted model bundle"
        );
        Ok(model)
    }
}

fn required_metadata(
    user: &BTreeMap<String, String>,
    key: &str,
    file: &str,
) -> Result<String> {
    user.get(key).cloned().ok_or_else(|| {
        ClasificarError::Serialization(format!("{file}: missing '{key}' metadata"))
    })
}

fn extract_named(
    metadata: &safetensors::SafeTensorsMetadata,
    raw: &[u8],
    name: &str,
    file: &str,
) -> Result<Vec<f32>> {
    let meta = metadata.get(name).ok_or_else(|| {
        ClasificarError::Serialization(format!("{file}: missing '{name}' tensor"))
    })?;
    safetensors::extract_tensor(raw, meta)
}

#[cfg(test)]
mod tests;
