//! TF-IDF document scoring driven by a [`Similarity`].
//!
//! This is the arithmetic an engine performs with the factors a similarity
//! hands out. It works on statistics that were gathered elsewhere: term
//! frequencies per document, document frequencies per term, the collection
//! size and the stored field norm.
//!
//! For a query `q` and document `d` the score is
//!
//! ```text
//! coord(matched, |q|) * Σ tf(freq(t, d)) * idf(t)² * boost(t) * query_norm * norm(d)
//! ```
//!
//! where the sum runs over the query terms present in `d` and `query_norm`
//! is taken over the sum of `(idf(t) * boost(t))²` for every query term.

use crate::norm::NormValue;
use crate::similarity::Similarity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A query term together with its corpus statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermStats {
  /// The term text.
  pub term: String,
  /// Number of documents containing the term.
  pub doc_freq: u64,
  /// Query-time boost.
  #[serde(default = "default_boost")]
  pub boost: f32,
}

fn default_boost() -> f32 {
  1.0
}

impl TermStats {
  /// Creates term statistics with a neutral boost.
  pub fn new(term: impl Into<String>, doc_freq: u64) -> Self {
    Self {
      term: term.into(),
      doc_freq,
      boost: default_boost(),
    }
  }

  /// Builder: set boost.
  pub fn with_boost(mut self, boost: f32) -> Self {
    self.boost = boost;
    self
  }
}

/// Collection-wide statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CollectionStats {
  /// Total documents in the collection.
  pub num_docs: u64,
}

impl CollectionStats {
  /// Creates collection statistics.
  pub fn new(num_docs: u64) -> Self {
    Self { num_docs }
  }
}

/// What the scorer needs to know about one document's field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocStats {
  /// Occurrences of each term in the field.
  pub term_freqs: HashMap<String, f32>,
  /// The stored norm byte for the field.
  pub norm: NormValue,
}

impl DocStats {
  /// Creates document statistics from a stored norm.
  pub fn new(norm: NormValue) -> Self {
    Self {
      term_freqs: HashMap::new(),
      norm,
    }
  }

  /// Builder: record a term frequency.
  pub fn with_term(mut self, term: impl Into<String>, freq: f32) -> Self {
    self.term_freqs.insert(term.into(), freq);
    self
  }
}

/// A tree describing how a score was put together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
  /// The value this node contributes.
  pub value: f32,
  /// Human readable description of the value.
  pub description: String,
  /// The factors this value was derived from.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub details: Vec<Explanation>,
}

impl Explanation {
  /// Creates a leaf explanation.
  pub fn new(value: f32, description: impl Into<String>) -> Self {
    Self {
      value,
      description: description.into(),
      details: Vec::new(),
    }
  }

  /// Builder: attach a sub-explanation.
  pub fn with_detail(mut self, detail: Explanation) -> Self {
    self.details.push(detail);
    self
  }
}

#[derive(Debug, Clone)]
struct WeightedTerm {
  term: String,
  boost: f32,
  idf: f32,
  /// `idf * boost * query_norm * idf`, the part of the score that does not
  /// depend on the document.
  weight: f32,
}

/// Scores documents against a fixed set of query terms.
#[derive(Debug)]
pub struct TfIdfScorer<'a> {
  similarity: &'a dyn Similarity,
  terms: Vec<WeightedTerm>,
  query_norm: f32,
  /// Nothing can match in a collection without documents.
  empty_collection: bool,
}

impl<'a> TfIdfScorer<'a> {
  /// Prepares the query side of the computation.
  ///
  /// IDFs and the query normalization are computed once here so that
  /// scoring a document only has to look at its own statistics.
  pub fn new(
    similarity: &'a dyn Similarity,
    query_terms: &[TermStats],
    collection: CollectionStats,
  ) -> Self {
    let idfs: Vec<f32> = query_terms
      .iter()
      .map(|t| similarity.idf(t.doc_freq, collection.num_docs))
      .collect();

    let sum_of_squared_weights: f32 = query_terms
      .iter()
      .zip(&idfs)
      .map(|(t, idf)| {
        let query_weight = idf * t.boost;
        query_weight * query_weight
      })
      .sum();

    let query_norm = similarity.query_norm(sum_of_squared_weights);

    let terms = query_terms
      .iter()
      .zip(idfs)
      .map(|(t, idf)| WeightedTerm {
        term: t.term.clone(),
        boost: t.boost,
        idf,
        weight: idf * t.boost * query_norm * idf,
      })
      .collect();

    Self {
      similarity,
      terms,
      query_norm,
      empty_collection: collection.num_docs == 0,
    }
  }

  /// The query normalization factor in effect.
  pub fn query_norm(&self) -> f32 {
    self.query_norm
  }

  /// Number of query terms.
  pub fn num_terms(&self) -> usize {
    self.terms.len()
  }

  /// Scores a single document.
  pub fn score(&self, doc: &DocStats) -> f32 {
    if self.terms.is_empty() || self.empty_collection {
      return 0.0;
    }

    let norm = self.similarity.decode_norm(doc.norm);
    let mut sum = 0.0;
    let mut matched = 0u32;

    for term in &self.terms {
      if let Some(&freq) = doc.term_freqs.get(&term.term) {
        sum += self.term_score(term, freq, norm);
        matched += 1;
      }
    }

    if matched == 0 {
      return 0.0;
    }

    sum * self.similarity.coord(matched, self.terms.len() as u32)
  }

  /// Scores every document, in input order.
  pub fn score_all(&self, docs: &[DocStats]) -> Vec<f32> {
    #[cfg(feature = "parallel")]
    let iter = docs.par_iter();
    #[cfg(not(feature = "parallel"))]
    let iter = docs.iter();

    iter.map(|doc| self.score(doc)).collect()
  }

  /// Breaks the score of a document down into its factors.
  ///
  /// The root value is always equal to [`TfIdfScorer::score`] for the same
  /// document.
  pub fn explain(&self, doc: &DocStats) -> Explanation {
    if self.empty_collection {
      return Explanation::new(0.0, "empty collection");
    }

    let norm = self.similarity.decode_norm(doc.norm);
    let mut sum = 0.0;
    let mut matched = 0u32;
    let mut sum_expl = Explanation::new(0.0, "sum of:");

    for term in &self.terms {
      let Some(&freq) = doc.term_freqs.get(&term.term) else {
        continue;
      };
      let value = self.term_score(term, freq, norm);
      sum += value;
      matched += 1;

      sum_expl = sum_expl.with_detail(
        Explanation::new(value, format!("weight({}), product of:", term.term))
          .with_detail(Explanation::new(
            self.similarity.tf(freq),
            format!("tf(freq={freq})"),
          ))
          .with_detail(Explanation::new(term.idf, "idf"))
          .with_detail(Explanation::new(term.idf, "idf"))
          .with_detail(Explanation::new(term.boost, "boost"))
          .with_detail(Explanation::new(self.query_norm, "query_norm"))
          .with_detail(Explanation::new(norm, format!("field_norm(byte={})", doc.norm))),
      );
    }
    sum_expl.value = sum;

    if matched == 0 {
      return Explanation::new(0.0, "no matching terms");
    }

    let total = self.terms.len() as u32;
    let coord = self.similarity.coord(matched, total);
    Explanation::new(sum * coord, format!("{} score, product of:", self.similarity.name()))
      .with_detail(sum_expl)
      .with_detail(Explanation::new(coord, format!("coord({matched}/{total})")))
  }

  fn term_score(&self, term: &WeightedTerm, freq: f32, norm: f32) -> f32 {
    self.similarity.tf(freq) * term.weight * norm
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::norm::NORM_ONE;
  use crate::prelude::*;

  fn query() -> Vec<TermStats> {
    vec![TermStats::new("rust", 5), TermStats::new("search", 50)]
  }

  #[test]
  fn test_constant_scoring_is_boolean() {
    let sim = ConstantSimilarity::new();
    let scorer = TfIdfScorer::new(&sim, &query(), CollectionStats::new(100));

    let once = DocStats::new(NORM_ONE).with_term("rust", 1.0);
    let often = DocStats::new(NORM_ONE).with_term("rust", 100.0);
    let both = DocStats::new(NORM_ONE)
      .with_term("rust", 1.0)
      .with_term("search", 7.0);

    assert_eq!(scorer.score(&once), 1.0);
    assert_eq!(scorer.score(&often), 1.0);
    assert_eq!(scorer.score(&both), 2.0);
  }

  #[test]
  fn test_constant_scoring_keeps_boosts() {
    let sim = ConstantSimilarity::new();
    let terms = vec![TermStats::new("rust", 5).with_boost(3.0)];
    let scorer = TfIdfScorer::new(&sim, &terms, CollectionStats::new(100));

    let boosted_field = sim.compute_norm(&FieldInvertState::new("title").with_boost(2.0));
    let doc = DocStats::new(boosted_field).with_term("rust", 4.0);
    assert_eq!(scorer.score(&doc), 6.0);
  }

  #[test]
  fn test_classic_scoring_ranks() {
    let sim = ClassicSimilarity::new();
    let scorer = TfIdfScorer::new(&sim, &query(), CollectionStats::new(100));

    let once = DocStats::new(NORM_ONE).with_term("rust", 1.0);
    let often = DocStats::new(NORM_ONE).with_term("rust", 9.0);
    let common = DocStats::new(NORM_ONE).with_term("search", 1.0);
    let both = DocStats::new(NORM_ONE)
      .with_term("rust", 1.0)
      .with_term("search", 1.0);

    assert!(scorer.score(&often) > scorer.score(&once));
    assert!(scorer.score(&once) > scorer.score(&common));
    assert!(scorer.score(&both) > scorer.score(&once));
  }

  #[test]
  fn test_no_match_and_empty_query() {
    let sim = ClassicSimilarity::new();
    let doc = DocStats::new(NORM_ONE).with_term("java", 2.0);

    let scorer = TfIdfScorer::new(&sim, &query(), CollectionStats::new(100));
    assert_eq!(scorer.score(&doc), 0.0);

    let empty = TfIdfScorer::new(&sim, &[], CollectionStats::new(100));
    assert_eq!(empty.num_terms(), 0);
    assert_eq!(empty.query_norm(), 1.0);
    assert_eq!(empty.score(&doc), 0.0);
  }

  #[test]
  fn test_empty_collection_scores_zero() {
    let sim = ClassicSimilarity::new();
    assert_eq!(sim.idf(0, 0), f32::NEG_INFINITY);

    let terms = vec![TermStats::new("rust", 0)];
    let scorer = TfIdfScorer::new(&sim, &terms, CollectionStats::new(0));
    let doc = DocStats::new(NORM_ONE).with_term("rust", 1.0);

    assert_eq!(scorer.score(&doc), 0.0);
    assert_eq!(scorer.score_all(&[doc.clone()]), vec![0.0]);

    let explanation = scorer.explain(&doc);
    assert_eq!(explanation.value, 0.0);
    assert_eq!(explanation.description, "empty collection");
  }

  #[test]
  fn test_explain_matches_score() {
    let sim = ClassicSimilarity::new();
    let scorer = TfIdfScorer::new(&sim, &query(), CollectionStats::new(100));
    let doc = DocStats::new(120).with_term("rust", 4.0);

    let explanation = scorer.explain(&doc);
    assert_eq!(explanation.value, scorer.score(&doc));
    assert_eq!(explanation.details.len(), 2);
    assert_eq!(explanation.details[1].description, "coord(1/2)");
    assert_eq!(explanation.details[1].value, 0.5);

    let json = serde_json::to_value(&explanation).unwrap();
    assert_eq!(json["description"], "classic score, product of:");
  }

  #[test]
  fn test_explain_without_match() {
    let sim = ConstantSimilarity::new();
    let scorer = TfIdfScorer::new(&sim, &query(), CollectionStats::new(100));
    let explanation = scorer.explain(&DocStats::new(NORM_ONE));
    assert_eq!(explanation.value, 0.0);
    assert!(explanation.details.is_empty());
  }

  #[test]
  fn test_score_all_preserves_order() {
    let sim = ClassicSimilarity::new();
    let scorer = TfIdfScorer::new(&sim, &query(), CollectionStats::new(100));
    let docs = vec![
      DocStats::new(NORM_ONE).with_term("search", 1.0),
      DocStats::new(NORM_ONE),
      DocStats::new(NORM_ONE).with_term("rust", 2.0),
    ];

    let scores = scorer.score_all(&docs);
    let expected: Vec<f32> = docs.iter().map(|d| scorer.score(d)).collect();
    assert_eq!(scores, expected);
    assert_eq!(scores[1], 0.0);
  }
}
