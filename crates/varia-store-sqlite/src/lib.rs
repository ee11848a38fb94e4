//! SQLite backend for the Varia store traits.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Table layout is host-owned: record
//! types declare their mapping through [`SqliteMain`] and
//! [`SqliteVariation`], and the host creates the schema itself (the test
//! fixtures show the expected DDL shape).

mod encode;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{SqliteMain, SqliteStore, SqliteVariation};

#[cfg(test)]
mod fixtures;
