//! Single-image inference.
//!
//! [`InferenceContext`] owns the loaded [`FittedModel`] and composes the
//! full pipeline for one request: payload validation → feature extraction
//! → scaling → classification → label decoding. The context is immutable
//! after construction and safe to share across request handlers; no
//! request ever mutates scaler, encoder, or classifier state, so
//! concurrent calls need no locking.

use std::path::Path;

use serde::Serialize;
use tracing::{error, info};

use crate::bundle::FittedModel;
use crate::error::{ClasificarError, Result};
use crate::vision;

/// The result of classifying one image.
///
/// `all_probabilities` is aligned to the encoder's fixed class ordering
/// and sums to 1.0; `confidence` is its maximum entry — the fraction of
/// nearest neighbors agreeing with the predicted class.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    /// Decoded category name of the winning class.
    pub predicted_class: String,
    /// Top vote fraction among the k nearest neighbors, in [0, 1].
    pub confidence: f32,
    /// Vote fraction per class, in the encoder's class order.
    pub all_probabilities: Vec<f32>,
}

/// Immutable inference pipeline, constructed once at startup.
#[derive(Debug, Clone)]
pub struct InferenceContext {
    model: FittedModel,
}

impl InferenceContext {
    /// Wraps an already-loaded model bundle.
    #[must_use]
    pub fn new(model: FittedModel) -> Self {
        Self { model }
    }

    /// Loads the bundle from `dir` and builds the context.
    ///
    /// Fails fast so a service refuses to start on a missing, corrupt, or
    /// mixed-run bundle.
    ///
    /// # Errors
    ///
    /// Propagates every [`FittedModel::load`] failure.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        Ok(Self::new(FittedModel::load(dir)?))
    }

    /// The loaded model bundle.
    #[must_use]
    pub fn model(&self) -> &FittedModel {
        &self.model
    }

    /// Classifies one image payload.
    ///
    /// The declared media type is validated before any decoding work; a
    /// payload that fails to decode is a client-class
    /// [`ClasificarError::FeatureExtraction`], while unexpected internal
    /// failures are logged here with context and propagated unchanged.
    ///
    /// # Errors
    ///
    /// - [`ClasificarError::Validation`] if `content_type` is missing or
    ///   does not declare an image
    /// - [`ClasificarError::FeatureExtraction`] if the payload cannot be
    ///   decoded
    /// - any internal error from the scaler or classifier, which always
    ///   indicates a bug or artifact mismatch rather than a bad request
    pub fn predict(&self, payload: &[u8], content_type: Option<&str>) -> Result<Prediction> {
        match content_type {
            None => {
                return Err(ClasificarError::validation(
                    "missing content type; the payload must declare an image media type",
                ))
            }
            Some(declared) if !declared.trim().starts_with("image/") => {
                return Err(ClasificarError::validation(format!(
                    "content type {declared:?} does not declare an image"
                )))
            }
            Some(_) => {}
        }

        let features = vision::extract_from_bytes(payload)?;

        let result = self.classify_features(&features);
        if let Err(e) = &result {
            if !e.is_client_error() {
                error!(error = %e, "inference failed after extraction");
            }
        }
        result
    }

    /// Runs the model stages on an already-extracted feature vector.
    fn classify_features(&self, features: &[f32]) -> Result<Prediction> {
        let scaled = self.model.scaler().transform_vector(features)?;
        let (class_index, all_probabilities) =
            self.model.classifier().predict_with_proba_one(&scaled)?;
        let predicted_class = self.model.encoder().decode(class_index)?.to_string();
        let confidence = all_probabilities[class_index];

        info!(
            predicted_class = %predicted_class,
            confidence,
            "classified image"
        );

        Ok(Prediction {
            predicted_class,
            confidence,
            all_probabilities,
        })
    }
}
