//! Classic vector-space TF-IDF scoring.
//!
//! # Formulas
//!
//! - coord = overlap / max_overlap
//! - query_norm = 1 / sqrt(sum_of_squared_weights)
//! - length_norm = boost * 1 / sqrt(num_terms)
//! - tf = sqrt(freq)
//! - sloppy_freq = 1 / (distance + 1)
//! - idf = ln(num_docs / (doc_freq + 1)) + 1

use crate::norm::{NormCodec, NormValue};
use crate::similarity::Similarity;

/// The textbook TF-IDF similarity.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassicSimilarity {
  discount_overlaps: bool,
  norm_codec: NormCodec,
}

impl Default for ClassicSimilarity {
  fn default() -> Self {
    Self {
      discount_overlaps: true,
      norm_codec: NormCodec::SmallFloat,
    }
  }
}

impl ClassicSimilarity {
  /// Creates a classic similarity with byte-encoded norms and overlap
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

impl Similarity for ClassicSimilarity {
  fn name(&self) -> &str {
    "classic"
  }

  fn coord(&self, overlap: u32, max_overlap: u32) -> f32 {
    if max_overlap == 0 {
      return 0.0;
    }
    overlap as f32 / max_overlap as f32
  }

  fn query_norm(&self, sum_of_squared_weights: f32) -> f32 {
    // An empty or all-zero query has nothing to normalize.
    if sum_of_squared_weights <= 0.0 {
      return 1.0;
    }
    (1.0 / (sum_of_squared_weights as f64).sqrt()) as f32
  }

  fn length_norm(&self, boost: f32, num_terms: u32) -> f32 {
    if num_terms == 0 {
      return boost;
    }
    boost * (1.0 / (num_terms as f64).sqrt()) as f32
  }

  fn tf(&self, freq: f32) -> f32 {
    freq.sqrt()
  }

  fn sloppy_freq(&self, distance: u32) -> f32 {
    1.0 / (distance as f32 + 1.0)
  }

  fn score_payload(&self, _doc: u32, _start: u32, _end: u32, _payload: &[u8]) -> f32 {
    1.0
  }

  fn idf(&self, doc_freq: u64, num_docs: u64) -> f32 {
    ((num_docs as f64 / (doc_freq as f64 + 1.0)).ln() + 1.0) as f32
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
