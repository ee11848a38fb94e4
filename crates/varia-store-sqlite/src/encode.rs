//! Codec between dynamic attribute values and SQLite column values.
//!
//! The mapping is deliberately plain: null/integer/real/text map directly,
//! booleans are stored as 0/1, and arrays/objects are stored as compact JSON
//! text. Reads are therefore not fully type-preserving (a stored boolean
//! comes back as an integer); record types with stricter expectations
//! normalise in their own accessors.

use rusqlite::types::Value as SqlValue;
use varia_core::record::AttributeValue;

use crate::{Error, Result};

pub fn encode_value(value: &AttributeValue) -> Result<SqlValue> {
  Ok(match value {
    AttributeValue::Null => SqlValue::Null,
    AttributeValue::Bool(b) => SqlValue::Integer(i64::from(*b)),
    AttributeValue::Number(n) => {
      if let Some(i) = n.as_i64() {
        SqlValue::Integer(i)
      } else if let Some(f) = n.as_f64() {
        SqlValue::Real(f)
      } else {
        return Err(Error::Decode(format!("unrepresentable number: {n}")));
      }
    }
    AttributeValue::String(s) => SqlValue::Text(s.clone()),
    AttributeValue::Array(_) | AttributeValue::Object(_) => {
      SqlValue::Text(serde_json::to_string(value)?)
    }
  })
}

pub fn decode_value(value: SqlValue) -> Result<AttributeValue> {
  Ok(match value {
    SqlValue::Null => AttributeValue::Null,
    SqlValue::Integer(i) => AttributeValue::from(i),
    SqlValue::Real(f) => AttributeValue::from(f),
    SqlValue::Text(s) => AttributeValue::String(s),
    SqlValue::Blob(_) => {
      return Err(Error::Decode("BLOB columns are not supported".into()));
    }
  })
}
