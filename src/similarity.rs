//! The `Similarity` trait, which defines the scoring contract consulted by a
//! TF-IDF search engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SimilarityError;
use crate::norm::NormValue;
use crate::state::FieldInvertState;

/// A pluggable relevance scoring strategy.
///
/// An engine scoring a document against a query multiplies together the
/// factors returned here. At index time it calls [`Similarity::compute_norm`]
/// once per field and stores the resulting byte; at query time it reads the
/// byte back with [`Similarity::decode_norm_value`].
///
/// Every method is a pure function of its arguments and the strategy's
/// configuration, so a single instance can be shared across query threads.
/// The `Send` and `Sync` bounds make that sharing explicit.
pub trait Similarity: fmt::Debug + Send + Sync {
  /// A stable identifier, used in logs and by the registry.
  fn name(&self) -> &str;

  /// Coordination factor: rewards documents matching more of the query's
  /// clauses. `overlap` is how many clauses matched out of `max_overlap`.
  fn coord(&self, overlap: u32, max_overlap: u32) -> f32;

  /// Normalizes the query weight so that scores from different queries are
  /// comparable.
  fn query_norm(&self, sum_of_squared_weights: f32) -> f32;

  /// Length normalization for a field containing `num_terms` terms, scaled
  /// by the field's index-time `boost`.
  fn length_norm(&self, boost: f32, num_terms: u32) -> f32;

  /// Score contribution of a term occurring `freq` times in a document.
  fn tf(&self, freq: f32) -> f32;

  /// Frequency contribution of a sloppy phrase match whose terms are
  /// `distance` positions apart.
  fn sloppy_freq(&self, distance: u32) -> f32;

  /// Score contribution of a payload attached to one term occurrence.
  fn score_payload(&self, doc: u32, start: u32, end: u32, payload: &[u8]) -> f32;

  /// Inverse document frequency of a term found in `doc_freq` of
  /// `num_docs` documents.
  fn idf(&self, doc_freq: u64, num_docs: u64) -> f32;

  /// Compresses a length norm into the byte stored in the index.
  fn encode_norm_value(&self, norm: f32) -> NormValue;

  /// Expands a stored norm byte.
  fn decode_norm_value(&self, byte: NormValue) -> f32;

  /// Reads a stored norm back. Same as [`Similarity::decode_norm_value`].
  fn decode_norm(&self, byte: NormValue) -> f32 {
    self.decode_norm_value(byte)
  }

  /// Whether overlapping tokens are excluded from a field's term count.
  fn discount_overlaps(&self) -> bool;

  /// Changes how overlapping tokens are counted.
  ///
  /// Intended for construction time only; a strategy shared behind an `Arc`
  /// can no longer be reconfigured.
  fn set_discount_overlaps(&mut self, discount: bool);

  /// Computes the stored norm for an inverted field.
  ///
  /// The term count honours [`Similarity::discount_overlaps`] before it is
  /// passed to [`Similarity::length_norm`].
  fn compute_norm(&self, state: &FieldInvertState) -> NormValue {
    let num_terms = state.num_terms(self.discount_overlaps());
    self.encode_norm_value(self.length_norm(state.boost, num_terms))
  }
}

/// The built-in similarity families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityKind {
  /// Every factor is flattened to a constant; only field boosts survive.
  Constant,
  /// The textbook TF-IDF formulas.
  #[serde(alias = "default")]
  Classic,
}

impl SimilarityKind {
  /// The settings string for this kind.
  pub fn as_str(self) -> &'static str {
    match self {
      SimilarityKind::Constant => "constant",
      SimilarityKind::Classic => "classic",
    }
  }
}

impl fmt::Display for SimilarityKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for SimilarityKind {
  type Err = SimilarityError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "constant" => Ok(SimilarityKind::Constant),
      "classic" | "default" => Ok(SimilarityKind::Classic),
      other => Err(SimilarityError::UnknownKind(other.to_string())),
    }
  }
}
