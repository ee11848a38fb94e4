//! [`VariationBridge`] — flattened attribute access over a set of variation
//! records.
//!
//! The bridge wraps the configuration and two per-instance caches: the
//! materialised variation set and the resolved default key. It never owns
//! the main record; the owner's identity is passed per call so the bridge
//! can be held next to any host entity.

use crate::{
  config::VariationConfig,
  error::{Error, Result, VariationFieldError},
  record::{AttributeValue, RecordId, VariationRecord},
  store::{VariationQuery, VariationStore},
};

/// Bridges a main record to its per-key variation records.
///
/// Records are materialised lazily, one key at a time: per-key access (the
/// default-variation surface included) loads or creates that record alone,
/// and [`variation_models`](Self::variation_models) completes the set.
/// Materialised records are cached for the lifetime of the bridge —
/// repeated calls return the same records, and nothing invalidates the
/// cache automatically. External mutation of the underlying rows is not
/// observed; construct a fresh bridge to re-read.
pub struct VariationBridge<V: VariationRecord> {
  config:           VariationConfig<V>,
  models:           Vec<V>,
  complete:         bool,
  resolved_default: Option<V::Key>,
}

impl<V: VariationRecord> VariationBridge<V> {
  pub fn new(config: VariationConfig<V>) -> Self {
    Self {
      config,
      models: Vec::new(),
      complete: false,
      resolved_default: None,
    }
  }

  /// Whether any variation record has been materialised yet.
  pub fn is_materialized(&self) -> bool {
    self.complete || !self.models.is_empty()
  }

  // ── Materialisation ───────────────────────────────────────────────────────

  /// Load-or-create the full variation set: exactly one record per
  /// configured key, in key-set order.
  ///
  /// For each key, when `owner` is known an existing row is looked up by
  /// `(owner, key)` plus the configured query filter; keys without a stored
  /// row yield new unsaved records with the key set, configured defaults
  /// applied, and the owner linked when already known. Records materialised
  /// earlier through per-key access are kept, moved into key-set order.
  pub async fn variation_models<S>(
    &mut self,
    store: &S,
    owner: Option<RecordId>,
  ) -> Result<&[V]>
  where
    S: VariationStore<V>,
  {
    self.materialize_all(store, owner).await?;
    Ok(&self.models)
  }

  async fn materialize_all<S>(
    &mut self,
    store: &S,
    owner: Option<RecordId>,
  ) -> Result<()>
  where
    S: VariationStore<V>,
  {
    if self.complete {
      return Ok(());
    }

    let keys = self.config.resolve_key_set()?;
    let mut models = Vec::with_capacity(keys.len());
    for key in keys {
      let model = match self.take_materialized(&key) {
        Some(model) => model,
        None => self.load_or_create(store, owner, key).await?,
      };
      models.push(model);
    }

    self.models = models;
    self.complete = true;
    Ok(())
  }

  /// Materialise the record for `key` alone, returning its cache index.
  async fn materialize_one<S>(
    &mut self,
    store: &S,
    owner: Option<RecordId>,
    key: &V::Key,
  ) -> Result<usize>
  where
    S: VariationStore<V>,
  {
    if let Some(index) = self.models.iter().position(|m| m.key() == key) {
      return Ok(index);
    }
    if self.complete || !self.config.resolve_key_set()?.contains(key) {
      return Err(Error::UnknownKey(key.to_string()));
    }

    let model = self.load_or_create(store, owner, key.clone()).await?;
    self.models.push(model);
    Ok(self.models.len() - 1)
  }

  async fn load_or_create<S>(
    &self,
    store: &S,
    owner: Option<RecordId>,
    key: V::Key,
  ) -> Result<V>
  where
    S: VariationStore<V>,
  {
    let existing = match owner {
      Some(owner_id) => {
        let mut query = VariationQuery::new(owner_id, key.clone());
        self.config.apply_filter(&mut query);
        store.find_variation(&query).await.map_err(Error::store)?
      }
      None => None,
    };

    Ok(match existing {
      Some(model) => model,
      None => {
        let mut model = V::new_for_key(key);
        for (attribute, default) in &self.config.defaults {
          model.set_attribute(attribute, default.produce());
        }
        if let Some(owner_id) = owner {
          model.set_owner_id(owner_id);
        }
        model
      }
    })
  }

  fn take_materialized(&mut self, key: &V::Key) -> Option<V> {
    let index = self.models.iter().position(|m| m.key() == key)?;
    Some(self.models.remove(index))
  }

  // ── Per-key access ────────────────────────────────────────────────────────

  /// The record whose key equals `key`, materialising it when not yet
  /// cached. Keys outside the configured key set fail with
  /// [`Error::UnknownKey`].
  pub async fn variation_model<S>(
    &mut self,
    store: &S,
    owner: Option<RecordId>,
    key: &V::Key,
  ) -> Result<&V>
  where
    S: VariationStore<V>,
  {
    let index = self.materialize_one(store, owner, key).await?;
    Ok(&self.models[index])
  }

  /// Mutable access to the record whose key equals `key`, materialising it
  /// when not yet cached.
  pub async fn variation_model_mut<S>(
    &mut self,
    store: &S,
    owner: Option<RecordId>,
    key: &V::Key,
  ) -> Result<&mut V>
  where
    S: VariationStore<V>,
  {
    let index = self.materialize_one(store, owner, key).await?;
    Ok(&mut self.models[index])
  }

  // ── Default variation ─────────────────────────────────────────────────────

  /// Resolve the configured default-key rule, once.
  fn default_key(&mut self) -> V::Key {
    match &self.resolved_default {
      Some(key) => key.clone(),
      None => {
        let key = self.config.resolve_default_key();
        self.resolved_default = Some(key.clone());
        key
      }
    }
  }

  /// The record selected by the default-key rule.
  pub async fn default_variation_model<S>(
    &mut self,
    store: &S,
    owner: Option<RecordId>,
  ) -> Result<&V>
  where
    S: VariationStore<V>,
  {
    let key = self.default_key();
    self.variation_model(store, owner, &key).await
  }

  /// Mutable access to the record selected by the default-key rule.
  pub async fn default_variation_model_mut<S>(
    &mut self,
    store: &S,
    owner: Option<RecordId>,
  ) -> Result<&mut V>
  where
    S: VariationStore<V>,
  {
    let key = self.default_key();
    self.variation_model_mut(store, owner, &key).await
  }

  // ── Flattened attribute access ────────────────────────────────────────────

  /// Read `name` from the default variation record.
  ///
  /// Unset attributes with a configured default read back as that default
  /// (it was applied at materialisation). An attribute the record neither
  /// stores nor defaults fails with [`Error::UnknownAttribute`].
  pub async fn variation_attribute<S>(
    &mut self,
    store: &S,
    owner: Option<RecordId>,
    name: &str,
  ) -> Result<AttributeValue>
  where
    S: VariationStore<V>,
  {
    let model = self.default_variation_model(store, owner).await?;
    model
      .attribute(name)
      .ok_or_else(|| Error::UnknownAttribute(name.to_owned()))
  }

  /// Write `name` on the default variation record, materialising it first
  /// when absent.
  pub async fn set_variation_attribute<S>(
    &mut self,
    store: &S,
    owner: Option<RecordId>,
    name: &str,
    value: impl Into<AttributeValue>,
  ) -> Result<()>
  where
    S: VariationStore<V>,
  {
    let model = self.default_variation_model_mut(store, owner).await?;
    if !model.set_attribute(name, value.into()) {
      return Err(Error::UnknownAttribute(name.to_owned()));
    }
    Ok(())
  }

  // ── Cascades ──────────────────────────────────────────────────────────────

  /// Validate every materialised record passing the save filter.
  ///
  /// Records never materialised do not participate: an untouched key
  /// neither blocks nor reports anything. Returns the collected field
  /// errors, each tagged with the key of the record it belongs to; an
  /// empty result means every participating record is valid.
  pub fn validate_variations(&self) -> Vec<VariationFieldError> {
    let mut errors = Vec::new();
    for model in &self.models {
      if !self.config.passes_save_filter(model) {
        continue;
      }
      for error in model.validate() {
        errors.push(VariationFieldError {
          key: model.key().to_string(),
          error,
        });
      }
    }
    errors
  }

  /// Persist every materialised record passing the save filter, linking
  /// each to `owner` first when not already linked.
  ///
  /// Records never materialised are left untouched in storage; a bridge
  /// with nothing materialised saves nothing. The first store failure
  /// propagates immediately; records saved before it stay saved.
  /// Atomicity across the cascade is the host's concern — wrap the call
  /// in a transaction scope if partial saves are unacceptable.
  pub async fn save_variations<S>(
    &mut self,
    store: &S,
    owner: RecordId,
  ) -> Result<()>
  where
    S: VariationStore<V>,
  {
    // Split borrow: the filter reads config while records are mutated.
    let config = &self.config;
    for model in &mut self.models {
      if !config.passes_save_filter(model) {
        continue;
      }
      if model.owner_id().is_none() {
        model.set_owner_id(owner);
      }
      store.save_variation(model).await.map_err(Error::store)?;
    }
    Ok(())
  }
}
