//! A similarity that flattens every TF-IDF factor to a constant.
//!
//! Each term that matches contributes the same weight regardless of how
//! often it occurs, how rare it is, how long the field is or how close
//! phrase terms sit. The only signal left is the field boost, which
//! [`ConstantSimilarity::length_norm`] passes through.

use crate::norm::{NormCodec, NormValue};
use crate::similarity::Similarity;

/// Constant-factor scoring.
///
/// Where the classic formulas would be `overlap / max_overlap`,
/// `1 / sqrt(sum_of_squared_weights)`, `boost / sqrt(num_terms)`,
/// `sqrt(freq)`, `1 / (distance + 1)` and `ln(num_docs / (doc_freq + 1)) + 1`,
/// this strategy returns `1.0`, except for length normalization which returns
/// the boost.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantSimilarity {
  discount_overlaps: bool,
  norm_codec: NormCodec,
}

impl Default for ConstantSimilarity {
  fn default() -> Self {
    Self {
      discount_overlaps: true,
      norm_codec: NormCodec::SmallFloat,
    }
  }
}

impl ConstantSimilarity {
  /// Creates a constant similarity with byte-encoded norms and overlap
  /// discounting enabled.
  pub fn new() -> Self {
    Self::default()
  }

  /// Builder: set overlap discounting.
  pub fn with_discount_overlaps(mut self, discount: bool) -> Self {
    self.discount_overlaps = discount;
    self
  }

  /// Builder: set how norms are stored.
  pub fn with_norm_codec(mut self, codec: NormCodec) -> Self {
    self.norm_codec = codec;
    self
  }

  /// The norm codec in use.
  pub fn norm_codec(&self) -> NormCodec {
    self.norm_codec
  }
}

impl Similarity for ConstantSimilarity {
  fn name(&self) -> &str {
    "constant"
  }

  fn coord(&self, _overlap: u32, _max_overlap: u32) -> f32 {
    1.0
  }

  fn query_norm(&self, _sum_of_squared_weights: f32) -> f32 {
    1.0
  }

  fn length_norm(&self, boost: f32, _num_terms: u32) -> f32 {
    boost
  }

  fn tf(&self, _freq: f32) -> f32 {
    1.0
  }

  fn sloppy_freq(&self, _distance: u32) -> f32 {
    1.0
  }

  fn score_payload(&self, _doc: u32, _start: u32, _end: u32, _payload: &[u8]) -> f32 {
    1.0
  }

  fn idf(&self, _doc_freq: u64, _num_docs: u64) -> f32 {
    1.0
  }

  fn encode_norm_value(&self, norm: f32) -> NormValue {
    self.norm_codec.encode(norm)
  }

  fn decode_norm_value(&self, byte: NormValue) -> f32 {
    self.norm_codec.decode(byte)
  }

  fn discount_overlaps(&self) -> bool {
    self.discount_overlaps
  }

  fn set_discount_overlaps(&mut self, discount: bool) {
    self.discount_overlaps = discount;
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::norm::NORM_ONE;
  use crate::state::FieldInvertState;

  #[test]
  fn test_factors_are_flat() {
    let sim = ConstantSimilarity::new();
    assert_eq!(sim.coord(1, 5), 1.0);
    assert_eq!(sim.coord(0, 0), 1.0);
    assert_eq!(sim.query_norm(16.0), 1.0);
    assert_eq!(sim.tf(1.0), 1.0);
    assert_eq!(sim.tf(100.0), 1.0);
    assert_eq!(sim.sloppy_freq(7), 1.0);
    assert_eq!(sim.score_payload(3, 0, 4, b"abc"), 1.0);
    assert_eq!(sim.idf(1, 1_000_000), 1.0);
    assert_eq!(sim.idf(0, 0), 1.0);
  }

  #[test]
  fn test_length_norm_returns_boost() {
    let sim = ConstantSimilarity::new();
    assert_eq!(sim.length_norm(1.0, 1), 1.0);
    assert_eq!(sim.length_norm(3.5, 10_000), 3.5);
    assert_eq!(sim.length_norm(0.25, 0), 0.25);
  }

  #[test]
  fn test_discount_overlaps_accessors() {
    let mut sim = ConstantSimilarity::new();
    assert!(sim.discount_overlaps());
    sim.set_discount_overlaps(false);
    assert!(!sim.discount_overlaps());
    sim.set_discount_overlaps(true);
    assert!(sim.discount_overlaps());
  }

  #[test]
  fn test_compute_norm_ignores_length() {
    let sim = ConstantSimilarity::new();
    let short = FieldInvertState::new("body").with_length(2, 0);
    let long = FieldInvertState::new("body").with_length(2_000, 40);
    assert_eq!(sim.compute_norm(&short), NORM_ONE);
    assert_eq!(sim.compute_norm(&short), sim.compute_norm(&long));

    let boosted = FieldInvertState::new("title").with_length(3, 0).with_boost(2.0);
    assert_eq!(sim.decode_norm_value(sim.compute_norm(&boosted)), 2.0);
  }

  #[test]
  fn test_omitted_norms() {
    assert_eq!(ConstantSimilarity::new().norm_codec(), NormCodec::SmallFloat);
    let sim = ConstantSimilarity::new().with_norm_codec(NormCodec::Omitted);
    assert_eq!(sim.norm_codec(), NormCodec::Omitted);
    let boosted = FieldInvertState::new("title").with_length(3, 0).with_boost(4.0);
    assert_eq!(sim.decode_norm_value(sim.compute_norm(&boosted)), 1.0);
  }

  #[test]
  fn test_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ConstantSimilarity>();
  }
}
