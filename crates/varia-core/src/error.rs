//! Error types for `varia-core`.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::FieldError;

#[derive(Debug, Error)]
pub enum Error {
  /// Semantic misconfiguration caught eagerly by the config builder or at
  /// key-set resolution (empty key set, duplicate keys, and so on).
  #[error("invalid configuration: {0}")]
  Configuration(String),

  /// A variation attribute the resolved default record does not expose or
  /// has no value for.
  #[error("unknown variation attribute: {0}")]
  UnknownAttribute(String),

  /// A key outside the configured key set.
  #[error("variation key not in configured key set: {0}")]
  UnknownKey(String),

  /// One or more records failed field validation; the main record's save
  /// is refused as a whole.
  #[error("validation failed: {0}")]
  Validation(ValidationErrors),

  /// The store reported a successful insert but left the main record
  /// without a primary key.
  #[error("main record has no primary key after insert")]
  MissingPrimaryKey,

  /// A storage failure, propagated as-is. The cascade does not roll back
  /// siblings already saved before the failure.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error into [`Error::Store`].
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Aggregated validation result ────────────────────────────────────────────

/// Field errors collected across the main record and its variation records.
///
/// Variation errors are namespaced by the key of the record they belong to,
/// rendered `key.attribute: message`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
  pub main:       Vec<FieldError>,
  pub variations: Vec<VariationFieldError>,
}

impl ValidationErrors {
  pub fn is_empty(&self) -> bool {
    self.main.is_empty() && self.variations.is_empty()
  }

  pub fn len(&self) -> usize { self.main.len() + self.variations.len() }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut first = true;
    for err in &self.main {
      if !first {
        write!(f, "; ")?;
      }
      write!(f, "{err}")?;
      first = false;
    }
    for err in &self.variations {
      if !first {
        write!(f, "; ")?;
      }
      write!(f, "{err}")?;
      first = false;
    }
    Ok(())
  }
}

/// A field error on one variation record, tagged with that record's key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationFieldError {
  /// Rendered form of the record's key.
  pub key:   String,
  pub error: FieldError,
}

impl fmt::Display for VariationFieldError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}.{}", self.key, self.error)
  }
}
