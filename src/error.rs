//! Error types for similarity configuration.
//!
//! Scoring itself is total and never fails; only turning settings into a
//! similarity can go wrong.

use thiserror::Error;

/// Errors raised while building similarities from settings.
#[derive(Debug, Error)]
pub enum SimilarityError {
  /// The `type` setting names a similarity that does not exist.
  #[error("unknown similarity type: {0}")]
  UnknownKind(String),

  /// A setting was present but could not be interpreted.
  #[error("invalid setting `{key}`: {reason}")]
  InvalidSetting {
    /// The offending settings key.
    key: String,
    /// Why the value was rejected.
    reason: String,
  },

  /// Settings JSON could not be parsed.
  #[error("invalid settings JSON: {0}")]
  Json(#[from] serde_json::Error),
}

impl SimilarityError {
  pub(crate) fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
    SimilarityError::InvalidSetting {
      key: key.into(),
      reason: reason.into(),
    }
  }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SimilarityError>;
