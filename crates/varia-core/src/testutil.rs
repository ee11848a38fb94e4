//! In-memory fixtures shared by the unit tests: a vector-backed store and
//! minimal `Page`/`Translation` record types.

use std::sync::{
  Mutex,
  atomic::{AtomicI64, Ordering},
};

use thiserror::Error;

use crate::{
  record::{
    AttributeValue, FieldError, MainRecord, RecordId, VariationKey as _,
    VariationRecord,
  },
  store::{MainStore, VariationQuery, VariationStore},
};

#[derive(Debug, Error)]
#[error("memory store failure: {0}")]
pub struct MemoryError(pub String);

// ─── Records ─────────────────────────────────────────────────────────────────

const TRANSLATION_ATTRIBUTES: &[&str] =
  &["title", "description", "summary", "brief"];

/// Per-language slice of a [`Page`]. `title` and `description` are required.
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
  key:    i64,
  owner:  Option<RecordId>,
  is_new: bool,
  attrs:  serde_json::Map<String, AttributeValue>,
}

impl VariationRecord for Translation {
  type Key = i64;

  fn attribute_names() -> &'static [&'static str] { TRANSLATION_ATTRIBUTES }

  fn new_for_key(key: i64) -> Self {
    Self {
      key,
      owner: None,
      is_new: true,
      attrs: serde_json::Map::new(),
    }
  }

  fn key(&self) -> &i64 { &self.key }

  fn owner_id(&self) -> Option<RecordId> { self.owner }

  fn set_owner_id(&mut self, id: RecordId) { self.owner = Some(id); }

  fn is_new_record(&self) -> bool { self.is_new }

  fn mark_persisted(&mut self) { self.is_new = false; }

  fn attribute(&self, name: &str) -> Option<AttributeValue> {
    self.attrs.get(name).cloned()
  }

  fn set_attribute(&mut self, name: &str, value: AttributeValue) -> bool {
    if !TRANSLATION_ATTRIBUTES.contains(&name) {
      return false;
    }
    self.attrs.insert(name.to_owned(), value);
    true
  }

  fn validate(&self) -> Vec<FieldError> {
    let mut errors = Vec::new();
    for required in ["title", "description"] {
      let blank = match self.attrs.get(required) {
        Some(AttributeValue::String(s)) => s.is_empty(),
        Some(AttributeValue::Null) | None => true,
        Some(_) => false,
      };
      if blank {
        errors.push(FieldError::new(required, "cannot be blank"));
      }
    }
    errors
  }
}

/// Minimal main record with a required `name`.
#[derive(Debug, Clone)]
pub struct Page {
  id:     Option<RecordId>,
  name:   String,
  is_new: bool,
}

impl Page {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      id:     None,
      name:   name.into(),
      is_new: true,
    }
  }
}

impl MainRecord for Page {
  fn id(&self) -> Option<RecordId> { self.id }

  fn set_id(&mut self, id: RecordId) { self.id = Some(id); }

  fn is_new_record(&self) -> bool { self.is_new }

  fn mark_persisted(&mut self) { self.is_new = false; }

  fn validate(&self) -> Vec<FieldError> {
    if self.name.is_empty() {
      vec![FieldError::new("name", "cannot be blank")]
    } else {
      Vec::new()
    }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// Vector-backed store; rows keyed by `(owner, key)` like the real backends.
pub struct MemoryStore {
  rows:     Mutex<Vec<Translation>>,
  next_id:  AtomicI64,
  fail_key: Mutex<Option<i64>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self {
      rows:     Mutex::new(Vec::new()),
      next_id:  AtomicI64::new(1),
      fail_key: Mutex::new(None),
    }
  }

  /// Insert a persisted translation row directly, bypassing the cascades.
  pub fn seed_translation(
    &self,
    owner: RecordId,
    key: i64,
    attrs: &[(&str, &str)],
  ) {
    let mut row = Translation::new_for_key(key);
    row.set_owner_id(owner);
    for (name, value) in attrs {
      row.set_attribute(name, (*value).into());
    }
    row.mark_persisted();
    self.rows.lock().unwrap().push(row);
  }

  pub fn translation_count(&self) -> usize {
    self.rows.lock().unwrap().len()
  }

  /// Make every subsequent save of a row with `key` fail.
  pub fn fail_saves_for_key(&self, key: i64) {
    *self.fail_key.lock().unwrap() = Some(key);
  }

  fn matches(row: &Translation, query: &VariationQuery<i64>) -> bool {
    if row.owner_id() != Some(query.owner_id) || *row.key() != query.key {
      return false;
    }
    query.conditions.iter().all(|(column, value)| {
      if column == "language_id" {
        &row.key().to_value() == value
      } else {
        row.attribute(column).as_ref() == Some(value)
      }
    })
  }
}

impl VariationStore<Translation> for MemoryStore {
  type Error = MemoryError;

  async fn find_variation(
    &self,
    query: &VariationQuery<i64>,
  ) -> Result<Option<Translation>, MemoryError> {
    let rows = self.rows.lock().unwrap();
    Ok(rows.iter().find(|row| Self::matches(row, query)).cloned())
  }

  async fn save_variation(
    &self,
    record: &mut Translation,
  ) -> Result<(), MemoryError> {
    if let Some(fail) = *self.fail_key.lock().unwrap() {
      if *record.key() == fail {
        return Err(MemoryError(format!("forced failure for key {fail}")));
      }
    }

    record.mark_persisted();
    let mut rows = self.rows.lock().unwrap();
    let position = rows
      .iter()
      .position(|row| row.owner_id() == record.owner_id() && row.key() == record.key());
    match position {
      Some(index) => rows[index] = record.clone(),
      None => rows.push(record.clone()),
    }
    Ok(())
  }
}

impl MainStore<Page> for MemoryStore {
  type Error = MemoryError;

  async fn insert_main(&self, record: &mut Page) -> Result<(), MemoryError> {
    let id = self.next_id.fetch_add(1, Ordering::SeqCst);
    record.set_id(id);
    record.mark_persisted();
    Ok(())
  }

  async fn update_main(&self, _record: &Page) -> Result<(), MemoryError> {
    Ok(())
  }
}
