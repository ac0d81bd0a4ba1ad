//! Error types for clasificar operations.
//!
//! One crate-wide error enum keeps the failure taxonomy visible at the
//! service boundary: caller-fixable request problems, per-image extraction
//! failures, fatal training-data problems, and programming or artifact
//! mismatches that must never be silently ignored.

use std::fmt;

/// Main error type for clasificar operations.
///
/// # Examples
///
/// ```
/// use clasificar::error::ClasificarError;
///
/// let err = ClasificarError::DimensionMismatch {
///     expected: 512,
///     actual: 256,
/// };
/// assert!(err.to_string().contains("dimension mismatch"));
/// ```
#[derive(Debug)]
pub enum ClasificarError {
    /// Request rejected before any processing (bad or missing media type).
    Validation {
        /// Human-readable reason the request was rejected
        message: String,
    },

    /// Image decode or histogram computation failed.
    FeatureExtraction {
        /// What went wrong while extracting
        message: String,
    },

    /// Training corpus is unusable (empty, malformed structure).
    Data {
        /// Description of the corpus problem
        message: String,
    },

    /// Operation requires a fitted component.
    NotFitted {
        /// Component that was used before `fit`
        component: &'static str,
    },

    /// Input dimensionality differs from the dimensionality seen at fit time.
    DimensionMismatch {
        /// Expected number of features
        expected: usize,
        /// Actual number of features
        actual: usize,
    },

    /// Label was never seen during fit.
    UnknownLabel {
        /// The offending label
        label: String,
    },

    /// Class index outside the fitted range.
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of classes
        len: usize,
    },

    /// Invalid hyperparameter value provided.
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Persisted artifacts do not belong to the same training run.
    ArtifactMismatch {
        /// Which pairing check failed
        message: String,
    },

    /// I/O error (file not found, permission denied, etc.).
    Io(std::io::Error),

    /// Serialization/deserialization error.
    Serialization(String),

    /// Generic error with string message.
    Other(String),
}

impl fmt::Display for ClasificarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClasificarError::Validation { message } => {
                write!(f, "Validation failed: {message}")
            }
            ClasificarError::FeatureExtraction { message } => {
                write!(f, "Feature extraction failed: {message}")
            }
            ClasificarError::Data { message } => {
                write!(f, "Data error: {message}")
            }
            ClasificarError::NotFitted { component } => {
                write!(f, "{component} is not fitted; call fit() first")
            }
            ClasificarError::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "Feature dimension mismatch: expected {expected}, got {actual}"
                )
            }
            ClasificarError::UnknownLabel { label } => {
                write!(f, "Unknown label: {label:?} was not seen during fit")
            }
            ClasificarError::IndexOutOfRange { index, len } => {
                write!(f, "Class index {index} out of range (n_classes={len})")
            }
            ClasificarError::InvalidHyperparameter {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid hyperparameter: {param} = {value}, expected {constraint}"
                )
            }
            ClasificarError::ArtifactMismatch { message } => {
                write!(f, "Artifact mismatch: {message}")
            }
            ClasificarError::Io(e) => write!(f, "I/O error: {e}"),
            ClasificarError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            ClasificarError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ClasificarError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClasificarError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClasificarError {
    fn from(err: std::io::Error) -> Self {
        ClasificarError::Io(err)
    }
}

impl From<&str> for ClasificarError {
    fn from(msg: &str) -> Self {
        ClasificarError::Other(msg.to_string())
    }
}

impl From<String> for ClasificarError {
    fn from(msg: String) -> Self {
        ClasificarError::Other(msg)
    }
}

impl From<serde_json::Error> for ClasificarError {
    fn from(err: serde_json::Error) -> Self {
        ClasificarError::Serialization(err.to_string())
    }
}

impl ClasificarError {
    /// Create a validation error with a descriptive message.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a feature-extraction error with a descriptive message.
    #[must_use]
    pub fn extraction(message: impl Into<String>) -> Self {
        Self::FeatureExtraction {
            message: message.into(),
        }
    }

    /// Create a data error with a descriptive message.
    #[must_use]
    pub fn data(message: impl Into<String>) -> Self {
        Self::Data {
            message: message.into(),
        }
    }

    /// True for errors the caller can fix by changing the request
    /// (client-class), false for internal or artifact errors (server-class).
    ///
    /// A transport layer maps this to 400 vs 500.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ClasificarError::Validation { .. } | ClasificarError::FeatureExtraction { .. }
        )
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, ClasificarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_display() {
        let err = ClasificarError::DimensionMismatch {
            expected: 512,
            actual: 3,
        };
        assert!(err.to_string().contains("dimension mismatch"));
        assert!(err.to_string().contains("512"));
        assert!(err.to_string().contains('3'));
    }

    #[test]
    fn test_not_fitted_display() {
        let err = ClasificarError::NotFitted {
            component: "StandardScaler",
        };
        assert!(err.to_string().contains("StandardScaler"));
        assert!(err.to_string().contains("not fitted"));
    }

    #[test]
    fn test_unknown_label_display() {
        let err = ClasificarError::UnknownLabel {
            label: "Tomato___rust".to_string(),
        };
        assert!(err.to_string().contains("Tomato___rust"));
    }

    #[test]
    fn test_client_error_split() {
        assert!(ClasificarError::validation("bad content type").is_client_error());
        assert!(ClasificarError::extraction("decode failed").is_client_error());
        assert!(!ClasificarError::data("empty corpus").is_client_error());
        assert!(!ClasificarError::NotFitted { component: "kNN" }.is_client_error());
        assert!(!ClasificarError::Serialization("truncated".into()).is_client_error());
    }

    #[test]
    fn test_io_error_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = ClasificarError::from(io);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_from_str_and_string() {
        let a: ClasificarError = "plain message".into();
        assert_eq!(a.to_string(), "plain message");
        let b: ClasificarError = String::from("owned message").into();
        assert_eq!(b.to_string(), "owned message");
    }
}
