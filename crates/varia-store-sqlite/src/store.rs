//! [`SqliteStore`] — the SQLite implementation of the Varia store traits.
//!
//! The store is schema-agnostic: any record type that maps itself onto a
//! table through [`SqliteVariation`] or [`SqliteMain`] gets a
//! [`VariationStore`] / [`MainStore`] implementation for free. SQL text is
//! assembled from the mapping's table and column names with numbered
//! placeholders; values are always bound, never interpolated.

use std::path::Path;

use rusqlite::{OptionalExtension as _, types::Value as SqlValue};
use tracing::debug;

use varia_core::{
  record::{AttributeValue, MainRecord, RecordId, VariationKey as _, VariationRecord},
  store::{MainStore, VariationQuery, VariationStore},
};

use crate::{
  Error, Result,
  encode::{decode_value, encode_value},
};

// ─── Table mappings ──────────────────────────────────────────────────────────

/// Table mapping for a variation record type.
///
/// Variation rows are keyed by `(OWNER_COLUMN, KEY_COLUMN)`; the
/// variation-specific attributes live in the columns named by
/// [`VariationRecord::attribute_names`].
pub trait SqliteVariation: VariationRecord {
  const TABLE: &'static str;
  const OWNER_COLUMN: &'static str;
  const KEY_COLUMN: &'static str;

  /// Rebuild a persisted record from its stored attributes.
  /// The result must report `is_new_record() == false`.
  fn load(
    owner: RecordId,
    key: Self::Key,
    attrs: serde_json::Map<String, AttributeValue>,
  ) -> Self;
}

/// Table mapping for a main record type. The primary key column is
/// storage-assigned (`last_insert_rowid`).
pub trait SqliteMain: MainRecord {
  const TABLE: &'static str;
  const ID_COLUMN: &'static str;

  /// The non-key attribute columns this record stores.
  fn attribute_names() -> &'static [&'static str];

  fn attribute(&self, name: &str) -> Option<AttributeValue>;

  /// Rebuild a persisted record.
  /// The result must report `is_new_record() == false`.
  fn load(id: RecordId, attrs: serde_json::Map<String, AttributeValue>) -> Self;
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Varia store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path`. The schema is host-owned; run the
  /// DDL through [`execute_batch`](Self::execute_batch) before first use.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Ok(Self { conn })
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Ok(Self { conn })
  }

  /// Run host-supplied DDL (or any other statement batch).
  pub async fn execute_batch(&self, sql: &str) -> Result<()> {
    let sql = sql.to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(&sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Load a main record by primary key. Returns `None` if no row matches.
  pub async fn find_main<M: SqliteMain>(
    &self,
    id: RecordId,
  ) -> Result<Option<M>> {
    let columns = M::attribute_names();
    let sql = format!(
      "SELECT {}{}{} FROM {} WHERE {} = ?1",
      M::ID_COLUMN,
      if columns.is_empty() { "" } else { ", " },
      columns.join(", "),
      M::TABLE,
      M::ID_COLUMN,
    );
    let count = columns.len();

    let row: Option<Vec<SqlValue>> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        Ok(
          stmt
            .query_row(rusqlite::params![id], |row| {
              let mut values = Vec::with_capacity(count);
              for index in 0..count {
                values.push(row.get::<_, SqlValue>(index + 1)?);
              }
              Ok(values)
            })
            .optional()?,
        )
      })
      .await?;

    match row {
      None => Ok(None),
      Some(values) => {
        let mut attrs = serde_json::Map::new();
        for (name, value) in columns.iter().zip(values) {
          attrs.insert((*name).to_owned(), decode_value(value)?);
        }
        Ok(Some(M::load(id, attrs)))
      }
    }
  }
}

// ─── VariationStore impl ─────────────────────────────────────────────────────

impl<V: SqliteVariation> VariationStore<V> for SqliteStore {
  type Error = Error;

  async fn find_variation(
    &self,
    query: &VariationQuery<V::Key>,
  ) -> Result<Option<V>> {
    let columns = V::attribute_names();
    let mut sql = format!(
      "SELECT {} FROM {} WHERE {} = ?1 AND {} = ?2",
      columns.join(", "),
      V::TABLE,
      V::OWNER_COLUMN,
      V::KEY_COLUMN,
    );
    let mut params: Vec<SqlValue> = vec![
      SqlValue::Integer(query.owner_id),
      encode_value(&query.key.to_value())?,
    ];
    for (index, (column, value)) in query.conditions.iter().enumerate() {
      sql.push_str(&format!(" AND {} = ?{}", column, index + 3));
      params.push(encode_value(value)?);
    }

    let count = columns.len();
    let row: Option<Vec<SqlValue>> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        Ok(
          stmt
            .query_row(rusqlite::params_from_iter(params), |row| {
              let mut values = Vec::with_capacity(count);
              for index in 0..count {
                values.push(row.get::<_, SqlValue>(index)?);
              }
              Ok(values)
            })
            .optional()?,
        )
      })
      .await?;

    debug!(
      table = V::TABLE,
      owner_id = query.owner_id,
      key = %query.key,
      found = row.is_some(),
      "variation lookup"
    );

    match row {
      None => Ok(None),
      Some(values) => {
        let mut attrs = serde_json::Map::new();
        for (name, value) in columns.iter().zip(values) {
          attrs.insert((*name).to_owned(), decode_value(value)?);
        }
        Ok(Some(V::load(query.owner_id, query.key.clone(), attrs)))
      }
    }
  }

  async fn save_variation(&self, record: &mut V) -> Result<()> {
    let owner = record.owner_id().ok_or(Error::MissingPrimaryKey)?;
    let columns = V::attribute_names();
    let key_value = encode_value(&record.key().to_value())?;

    let mut values = Vec::with_capacity(columns.len());
    for name in columns {
      let attribute = record.attribute(name).unwrap_or(AttributeValue::Null);
      values.push(encode_value(&attribute)?);
    }

    if record.is_new_record() {
      let placeholders: Vec<String> =
        (1..=columns.len() + 2).map(|i| format!("?{i}")).collect();
      let sql = format!(
        "INSERT INTO {} ({}, {}, {}) VALUES ({})",
        V::TABLE,
        V::OWNER_COLUMN,
        V::KEY_COLUMN,
        columns.join(", "),
        placeholders.join(", "),
      );
      let mut params = vec![SqlValue::Integer(owner), key_value];
      params.extend(values);

      self
        .conn
        .call(move |conn| {
          conn.execute(&sql, rusqlite::params_from_iter(params))?;
          Ok(())
        })
        .await?;

      record.mark_persisted();
      debug!(table = V::TABLE, owner_id = owner, key = %record.key(), "variation inserted");
    } else {
      let assignments: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(index, column)| format!("{} = ?{}", column, index + 1))
        .collect();
      let sql = format!(
        "UPDATE {} SET {} WHERE {} = ?{} AND {} = ?{}",
        V::TABLE,
        assignments.join(", "),
        V::OWNER_COLUMN,
        columns.len() + 1,
        V::KEY_COLUMN,
        columns.len() + 2,
      );
      let mut params = values;
      params.push(SqlValue::Integer(owner));
      params.push(key_value);

      self
        .conn
        .call(move |conn| {
          conn.execute(&sql, rusqlite::params_from_iter(params))?;
          Ok(())
        })
        .await?;

      debug!(table = V::TABLE, owner_id = owner, key = %record.key(), "variation updated");
    }

    Ok(())
  }
}

// ─── MainStore impl ──────────────────────────────────────────────────────────

impl<M: SqliteMain> MainStore<M> for SqliteStore {
  type Error = Error;

  async fn insert_main(&self, record: &mut M) -> Result<()> {
    let columns = M::attribute_names();
    let sql = if columns.is_empty() {
      format!("INSERT INTO {} DEFAULT VALUES", M::TABLE)
    } else {
      let placeholders: Vec<String> =
        (1..=columns.len()).map(|i| format!("?{i}")).collect();
      format!(
        "INSERT INTO {} ({}) VALUES ({})",
        M::TABLE,
        columns.join(", "),
        placeholders.join(", "),
      )
    };

    let mut params = Vec::with_capacity(columns.len());
    for name in columns {
      let attribute = record.attribute(name).unwrap_or(AttributeValue::Null);
      params.push(encode_value(&attribute)?);
    }

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(&sql, rusqlite::params_from_iter(params))?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    record.set_id(id);
    record.mark_persisted();
    debug!(table = M::TABLE, id, "main record inserted");
    Ok(())
  }

  async fn update_main(&self, record: &M) -> Result<()> {
    let id = record.id().ok_or(Error::MissingPrimaryKey)?;
    let columns = M::attribute_names();
    if columns.is_empty() {
      return Ok(());
    }

    let assignments: Vec<String> = columns
      .iter()
      .enumerate()
      .map(|(index, column)| format!("{} = ?{}", column, index + 1))
      .collect();
    let sql = format!(
      "UPDATE {} SET {} WHERE {} = ?{}",
      M::TABLE,
      assignments.join(", "),
      M::ID_COLUMN,
      columns.len() + 1,
    );

    let mut params = Vec::with_capacity(columns.len() + 1);
    for name in columns {
      let attribute = record.attribute(name).unwrap_or(AttributeValue::Null);
      params.push(encode_value(&attribute)?);
    }
    params.push(SqlValue::Integer(id));

    self
      .conn
      .call(move |conn| {
        conn.execute(&sql, rusqlite::params_from_iter(params))?;
        Ok(())
      })
      .await?;

    debug!(table = M::TABLE, id, "main record updated");
    Ok(())
  }
}
