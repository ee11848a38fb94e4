//! Record traits and attribute primitives.
//!
//! Attribute values are dynamically typed ([`serde_json::Value`]) so the
//! bridge can forward reads and writes by name without knowing the concrete
//! record layout. A `None` from [`VariationRecord::attribute`] means the
//! attribute is unknown to the record *or* has never been set; an explicit
//! null is `Some(AttributeValue::Null)`.

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

// ─── Primitives ──────────────────────────────────────────────────────────────

/// Storage-assigned primary key of a main record.
pub type RecordId = i64;

/// Dynamically-typed attribute payload.
pub type AttributeValue = serde_json::Value;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
  pub attribute: String,
  pub message:   String,
}

impl FieldError {
  pub fn new(attribute: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      attribute: attribute.into(),
      message:   message.into(),
    }
  }
}

impl fmt::Display for FieldError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.attribute, self.message)
  }
}

// ─── Keys ────────────────────────────────────────────────────────────────────

/// A variation key value (e.g. a language id).
///
/// `Display` is used to namespace aggregated validation errors; `to_value`
/// is how backends bind the key into queries.
pub trait VariationKey:
  Clone + PartialEq + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync
{
  fn to_value(&self) -> AttributeValue;
}

impl VariationKey for i64 {
  fn to_value(&self) -> AttributeValue { AttributeValue::from(*self) }
}

impl VariationKey for String {
  fn to_value(&self) -> AttributeValue { AttributeValue::from(self.clone()) }
}

// ─── Main record ─────────────────────────────────────────────────────────────

/// The host entity that owns a set of variation records.
///
/// The bridge never persists a main record itself; it only needs the
/// record's identity and validation result to drive the cascades.
pub trait MainRecord: Send + Sync {
  /// Primary key; `None` until first successful persistence.
  fn id(&self) -> Option<RecordId>;

  /// Called by the store after insert, with the storage-assigned key.
  fn set_id(&mut self, id: RecordId);

  fn is_new_record(&self) -> bool;

  fn mark_persisted(&mut self);

  /// Run the record's own validation rules. Empty result means valid.
  fn validate(&self) -> Vec<FieldError>;
}

// ─── Variation record ────────────────────────────────────────────────────────

/// One slice of a main record's data for one key value.
///
/// A variation record splits into the foreign key back to its owner, the key
/// attribute, and the variation-specific attributes named by
/// [`attribute_names`](Self::attribute_names).
pub trait VariationRecord: Clone + Send + Sync {
  type Key: VariationKey;

  /// The variation-specific attribute names this record exposes.
  fn attribute_names() -> &'static [&'static str];

  /// A blank, unsaved record for `key`: owner unset, all attributes unset.
  fn new_for_key(key: Self::Key) -> Self;

  fn key(&self) -> &Self::Key;

  /// Foreign key to the owning main record; `None` until the owner is
  /// persisted and the cascade links this record to it.
  fn owner_id(&self) -> Option<RecordId>;

  fn set_owner_id(&mut self, id: RecordId);

  fn is_new_record(&self) -> bool;

  fn mark_persisted(&mut self);

  /// Read an attribute by name. `None` when the name is unknown or the
  /// attribute has never been set.
  fn attribute(&self, name: &str) -> Option<AttributeValue>;

  /// Write an attribute by name. Returns `false` when the record does not
  /// expose the name (the write is rejected).
  fn set_attribute(&mut self, name: &str, value: AttributeValue) -> bool;

  /// Run the record's validation rules. Empty result means valid.
  fn validate(&self) -> Vec<FieldError>;
}
