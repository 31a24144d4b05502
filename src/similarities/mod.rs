//! Built-in `Similarity` implementations.
//!
//! # Available Similarities
//!
//! - [`ConstantSimilarity`](crate::similarities::ConstantSimilarity): flattens
//!   coordination, query normalization, term frequency, proximity, payloads
//!   and IDF to `1.0`. Length normalization passes the field boost through
//!   untouched, so ranking reduces to boolean matching plus boosts.
//! - [`ClassicSimilarity`](crate::similarities::ClassicSimilarity): the
//!   textbook TF-IDF formulas that the constant variant suppresses.
//!
//! # Example: Comparing Strategies
//!
//! ```rust
//! use similarus::prelude::*;
//!
//! let flat = ConstantSimilarity::new();
//! let classic = ClassicSimilarity::new();
//!
//! assert_eq!(flat.tf(100.0), 1.0);
//! assert_eq!(classic.tf(100.0), 10.0);
//! assert_eq!(flat.length_norm(2.0, 400), 2.0);
//! assert_eq!(classic.length_norm(2.0, 400), 0.1);
//! ```

/// The textbook TF-IDF formulas.
pub mod classic;
/// Constant-factor scoring.
pub mod constant;

pub use classic::ClassicSimilarity;
pub use constant::ConstantSimilarity;
