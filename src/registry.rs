//! Named similarity construction and caching.
//!
//! Index configuration refers to similarities by name. Each name comes with
//! a flat settings map, for example:
//!
//! ```json
//! {
//!   "flat":    { "type": "constant", "norm_codec": "omitted" },
//!   "ranked":  { "type": "classic", "discount_overlaps": false }
//! }
//! ```
//!
//! The registry builds a similarity the first time a name is requested and
//! hands out the same shared instance afterwards.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{Result, SimilarityError};
use crate::norm::NormCodec;
use crate::similarities::{ClassicSimilarity, ConstantSimilarity};
use crate::similarity::{Similarity, SimilarityKind};

/// Settings key selecting the similarity family.
pub const TYPE_KEY: &str = "type";
/// Settings key for overlap discounting.
pub const DISCOUNT_OVERLAPS_KEY: &str = "discount_overlaps";
/// Settings key for the norm codec.
pub const NORM_CODEC_KEY: &str = "norm_codec";

const KNOWN_KEYS: [&str; 3] = [TYPE_KEY, DISCOUNT_OVERLAPS_KEY, NORM_CODEC_KEY];

/// Flat key/value configuration for one similarity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings {
  values: HashMap<String, Value>,
}

impl Settings {
  /// Creates empty settings. Every key falls back to its default.
  pub fn new() -> Self {
    Self::default()
  }

  /// Parses settings from a JSON object.
  pub fn from_json(json: &str) -> Result<Self> {
    Ok(serde_json::from_str(json)?)
  }

  /// Builder: set a value.
  pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    self.values.insert(key.into(), value.into());
    self
  }

  /// Raw access to a value.
  pub fn get(&self, key: &str) -> Option<&Value> {
    self.values.get(key)
  }

  /// Reads a string value.
  pub fn get_str(&self, key: &str) -> Result<Option<&str>> {
    match self.values.get(key) {
      None => Ok(None),
      Some(Value::String(s)) => Ok(Some(s.as_str())),
      Some(other) => Err(SimilarityError::invalid(key, format!("expected a string, got {other}"))),
    }
  }

  /// Reads a boolean value. The strings `"true"` and `"false"` are accepted
  /// as well.
  pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
    match self.values.get(key) {
      None => Ok(None),
      Some(Value::Bool(b)) => Ok(Some(*b)),
      Some(Value::String(s)) => match s.as_str() {
        "true" => Ok(Some(true)),
        "false" => Ok(Some(false)),
        _ => Err(SimilarityError::invalid(key, format!("expected a boolean, got `{s}`"))),
      },
      Some(other) => Err(SimilarityError::invalid(key, format!("expected a boolean, got {other}"))),
    }
  }

  /// The configured keys.
  pub fn keys(&self) -> impl Iterator<Item = &str> {
    self.values.keys().map(String::as_str)
  }

  /// Whether no keys are set.
  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }
}

/// Builds a fresh similarity from settings, without caching.
///
/// Missing keys take their defaults: type `constant`, overlap discounting
/// on, `small_float` norms. Unrecognized keys are ignored with a warning.
pub fn build_similarity(settings: &Settings) -> Result<Box<dyn Similarity>> {
  let kind = match settings.get_str(TYPE_KEY)? {
    Some(name) => name.parse::<SimilarityKind>()?,
    None => SimilarityKind::Constant,
  };
  let discount_overlaps = settings.get_bool(DISCOUNT_OVERLAPS_KEY)?.unwrap_or(true);
  let norm_codec = match settings.get_str(NORM_CODEC_KEY)? {
    Some(name) => name.parse::<NormCodec>()?,
    None => NormCodec::default(),
  };

  for key in settings.keys().filter(|k| !KNOWN_KEYS.contains(k)) {
    warn!(key, %kind, "ignoring unknown similarity setting");
  }

  debug!(%kind, discount_overlaps, %norm_codec, "building similarity");

  Ok(match kind {
    SimilarityKind::Constant => Box::new(
      ConstantSimilarity::new()
        .with_discount_overlaps(discount_overlaps)
        .with_norm_codec(norm_codec),
    ),
    SimilarityKind::Classic => Box::new(
      ClassicSimilarity::new()
        .with_discount_overlaps(discount_overlaps)
        .with_norm_codec(norm_codec),
    ),
  })
}

/// Maps similarity names to shared instances.
///
/// Lookups and inserts may happen from any thread. Instances are immutable
/// once registered.
#[derive(Default)]
pub struct SimilarityRegistry {
  entries: DashMap<String, Arc<dyn Similarity>>,
}

impl SimilarityRegistry {
  /// Creates an empty registry.
  pub fn new() -> Self {
    Self::default()
  }

  /// Builds a registry from an object mapping names to settings objects.
  pub fn from_json(json: &str) -> Result<Self> {
    let config: HashMap<String, Settings> = serde_json::from_str(json)?;
    let registry = Self::new();
    for (name, settings) in &config {
      registry.create(name, settings)?;
    }
    Ok(registry)
  }

  /// Returns the similarity registered under `name`, building and caching
  /// it from `settings` if there is none yet.
  ///
  /// Settings are only consulted on the first call for a name.
  pub fn create(&self, name: &str, settings: &Settings) -> Result<Arc<dyn Similarity>> {
    if let Some(existing) = self.get(name) {
      debug!(name, "similarity cache hit");
      return Ok(existing);
    }

    let built: Arc<dyn Similarity> = Arc::from(build_similarity(settings)?);
    // Another thread may have won the race; keep whichever landed first.
    let entry = self.entries.entry(name.to_string()).or_insert(built);
    debug!(name, similarity = entry.value().name(), "similarity registered");
    Ok(Arc::clone(entry.value()))
  }

  /// Registers a similarity, replacing any previous entry of the same name.
  pub fn register(&self, name: impl Into<String>, similarity: Arc<dyn Similarity>) {
    let name = name.into();
    let new_name = similarity.name().to_string();
    if let Some(previous) = self.entries.insert(name.clone(), similarity) {
      debug!(
        name = %name,
        previous = previous.name(),
        replacement = %new_name,
        "similarity overwritten"
      );
    }
  }

  /// Looks up a registered similarity.
  pub fn get(&self, name: &str) -> Option<Arc<dyn Similarity>> {
    self.entries.get(name).map(|entry| Arc::clone(entry.value()))
  }

  /// Removes a similarity, returning it if it was registered.
  pub fn remove(&self, name: &str) -> Option<Arc<dyn Similarity>> {
    self.entries.remove(name).map(|(_, similarity)| similarity)
  }

  /// Registered names, in no particular order.
  pub fn names(&self) -> Vec<String> {
    self.entries.iter().map(|entry| entry.key().clone()).collect()
  }

  /// Number of registered similarities.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Whether nothing is registered.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl std::fmt::Debug for SimilarityRegistry {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SimilarityRegistry")
      .field("names", &self.names())
      .finish()
  }
}
