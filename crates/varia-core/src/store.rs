//! The store traits and supporting query type.
//!
//! These are the collaborator interfaces the bridge consumes. Backends (e.g.
//! `varia-store-sqlite`) implement them; the bridge and the lifecycle
//! helpers depend on the abstraction, not on any concrete backend.

use std::future::Future;

use crate::record::{
  AttributeValue, MainRecord, RecordId, VariationKey, VariationRecord,
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`VariationStore::find_variation`].
///
/// The bridge always queries by `(owner_id, key)`; `conditions` carries the
/// extra equality conditions from the configured query filter. A
/// callback-form filter receives `&mut VariationQuery` and may refine it
/// further.
#[derive(Debug, Clone)]
pub struct VariationQuery<K: VariationKey> {
  /// Foreign-key value the variation row must reference.
  pub owner_id:   RecordId,
  /// Key value the variation row must carry.
  pub key:        K,
  /// Extra `column = value` conditions, ANDed onto the lookup.
  pub conditions: Vec<(String, AttributeValue)>,
}

impl<K: VariationKey> VariationQuery<K> {
  pub fn new(owner_id: RecordId, key: K) -> Self {
    Self {
      owner_id,
      key,
      conditions: Vec::new(),
    }
  }

  /// Add an equality condition.
  pub fn and_where(
    &mut self,
    column: impl Into<String>,
    value: impl Into<AttributeValue>,
  ) -> &mut Self {
    self.conditions.push((column.into(), value.into()));
    self
  }
}

// ─── Traits ──────────────────────────────────────────────────────────────────

/// Storage access for variation records.
///
/// All methods return `Send` futures so the traits can be used in
/// multi-threaded async runtimes.
pub trait VariationStore<V: VariationRecord>: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Look up the single variation row matching `query`, or `None`.
  fn find_variation(
    &self,
    query: &VariationQuery<V::Key>,
  ) -> impl Future<Output = Result<Option<V>, Self::Error>> + Send;

  /// Insert the record when it is new, update it otherwise. On success the
  /// record is marked persisted.
  fn save_variation(
    &self,
    record: &mut V,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Persistence primitives for the main record.
///
/// Main-record persistence itself is the host's concern; this trait is the
/// minimal surface the save cascade needs to invoke at the right points.
pub trait MainStore<M: MainRecord>: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Insert the record and assign its storage-generated primary key.
  fn insert_main(
    &self,
    record: &mut M,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send;

  /// Update an already-persisted record.
  fn update_main(
    &self,
    record: &M,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
