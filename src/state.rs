//! Per-field statistics gathered while a document is inverted.

use serde::{Deserialize, Serialize};

/// What an indexing pass knows about one field of one document at the time
/// its norm is computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldInvertState {
  /// The field name.
  pub name: String,
  /// Number of tokens seen, overlaps included.
  #[serde(default)]
  pub length: u32,
  /// Tokens that were stacked on the previous position (position increment
  /// of zero), e.g. synonyms.
  #[serde(default)]
  pub num_overlap: u32,
  /// Last token position.
  #[serde(default)]
  pub position: u32,
  /// Last character offset.
  #[serde(default)]
  pub offset: u32,
  /// Index-time boost for the field.
  #[serde(default = "default_boost")]
  pub boost: f32,
}

fn default_boost() -> f32 {
  1.0
}

impl FieldInvertState {
  /// Creates an empty state for a field with a neutral boost.
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      length: 0,
      num_overlap: 0,
      position: 0,
      offset: 0,
      boost: default_boost(),
    }
  }

  /// Sets the token counts.
  pub fn with_length(mut self, length: u32, num_overlap: u32) -> Self {
    self.length = length;
    self.num_overlap = num_overlap;
    self
  }

  /// Sets the boost.
  pub fn with_boost(mut self, boost: f32) -> Self {
    self.boost = boost;
    self
  }

  /// Sets the last position and offset.
  pub fn with_position(mut self, position: u32, offset: u32) -> Self {
    self.position = position;
    self.offset = offset;
    self
  }

  /// The term count fed to length normalization.
  ///
  /// When `discount_overlaps` is set, stacked tokens do not count.
  pub fn num_terms(&self, discount_overlaps: bool) -> u32 {
    if discount_overlaps {
      self.length.saturating_sub(self.num_overlap)
    } else {
      self.length
    }
  }
}
