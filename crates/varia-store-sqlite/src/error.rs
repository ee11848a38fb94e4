//! Error type for `varia-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] varia_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// A column held a value the attribute codec cannot represent
  /// (e.g. a BLOB, or a number outside the JSON range).
  #[error("column decode error: {0}")]
  Decode(String),

  /// Attempted to save or update a record that has no primary key yet.
  #[error("record is not persisted: missing primary key")]
  MissingPrimaryKey,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
