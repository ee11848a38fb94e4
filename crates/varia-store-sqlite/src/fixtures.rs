//! Test fixtures: a catalog `Item` translated per language by
//! `ItemTranslation`, with the DDL the tests run against the in-memory
//! database.

use varia_core::record::{
  AttributeValue, FieldError, MainRecord, RecordId, VariationRecord,
};

use crate::store::{SqliteMain, SqliteVariation};

pub const SCHEMA: &str = "
CREATE TABLE items (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL
);

CREATE TABLE item_translations (
    item_id     INTEGER NOT NULL REFERENCES items(id),
    language_id INTEGER NOT NULL,
    title       TEXT,
    description TEXT,
    summary     TEXT,
    brief       TEXT,
    PRIMARY KEY (item_id, language_id)
);
";

// ─── Item ────────────────────────────────────────────────────────────────────

/// Main record: a catalog item whose textual attributes live per language in
/// [`ItemTranslation`]. `name` is required.
#[derive(Debug, Clone)]
pub struct Item {
  id:       Option<RecordId>,
  pub name: String,
  is_new:   bool,
}

impl Item {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      id:     None,
      name:   name.into(),
      is_new: true,
    }
  }
}

impl MainRecord for Item {
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

impl SqliteMain for Item {
  const TABLE: &'static str = "items";
  const ID_COLUMN: &'static str = "id";

  fn attribute_names() -> &'static [&'static str] { &["name"] }

  fn attribute(&self, name: &str) -> Option<AttributeValue> {
    match name {
      "name" => Some(self.name.clone().into()),
      _ => None,
    }
  }

  fn load(id: RecordId, attrs: serde_json::Map<String, AttributeValue>) -> Self {
    let name = match attrs.get("name") {
      Some(AttributeValue::String(s)) => s.clone(),
      _ => String::new(),
    };
    Self {
      id: Some(id),
      name,
      is_new: false,
    }
  }
}

// ─── ItemTranslation ─────────────────────────────────────────────────────────

const TRANSLATION_ATTRIBUTES: &[&str] =
  &["title", "description", "summary", "brief"];

/// One language slice of an [`Item`]. `title` and `description` are required.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemTranslation {
  language: i64,
  item_id:  Option<RecordId>,
  is_new:   bool,
  attrs:    serde_json::Map<String, AttributeValue>,
}

impl VariationRecord for ItemTranslation {
  type Key = i64;

  fn attribute_names() -> &'static [&'static str] { TRANSLATION_ATTRIBUTES }

  fn new_for_key(key: i64) -> Self {
    Self {
      language: key,
      item_id:  None,
      is_new:   true,
      attrs:    serde_json::Map::new(),
    }
  }

  fn key(&self) -> &i64 { &self.language }

  fn owner_id(&self) -> Option<RecordId> { self.item_id }

  fn set_owner_id(&mut self, id: RecordId) { self.item_id = Some(id); }

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

impl SqliteVariation for ItemTranslation {
  const TABLE: &'static str = "item_translations";
  const OWNER_COLUMN: &'static str = "item_id";
  const KEY_COLUMN: &'static str = "language_id";

  fn load(
    owner: RecordId,
    key: i64,
    attrs: serde_json::Map<String, AttributeValue>,
  ) -> Self {
    Self {
      language: key,
      item_id:  Some(owner),
      is_new:   false,
      attrs,
    }
  }
}

impl ItemTranslation {
  /// Convenience accessor for tests.
  pub fn title(&self) -> Option<String> {
    match self.attrs.get("title") {
      Some(AttributeValue::String(s)) => Some(s.clone()),
      _ => None,
    }
  }
}
