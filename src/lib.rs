//! Similarus - pluggable relevance scoring for TF-IDF style search engines.
//!
//! Similarus provides a `Similarity` trait describing the scoring contract a
//! search engine consults (coordination, query normalization, length norms,
//! term frequency, proximity, payloads, IDF and byte-encoded field norms),
//! a couple of ready-made strategies, and a registry that builds strategies
//! by name from key/value settings.

pub mod error;
pub mod norm;
pub mod registry;
pub mod scorer;
pub mod similarities;
pub mod similarity;
pub mod state;

pub mod prelude {
  //! Convenient re-exports for common types and traits.

  pub use crate::error::SimilarityError;
  pub use crate::norm::*;
  pub use crate::registry::*;
  pub use crate::scorer::*;
  pub use crate::similarities::*;
  pub use crate::similarity::*;
  pub use crate::state::*;
}
