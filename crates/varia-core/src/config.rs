//! Typed configuration for [`crate::VariationBridge`].
//!
//! The original option surface is a builder: every option has a literal
//! setter and, where the option supports it, a closure-valued `_with`
//! variant. [`VariationConfigBuilder::build`] validates eagerly, so a
//! misconfigured bridge fails at construction rather than on first use.

use std::{collections::HashSet, fmt};

use crate::{
  error::{Error, Result},
  record::{AttributeValue, VariationKey, VariationRecord},
  store::VariationQuery,
};

// ─── Option values ───────────────────────────────────────────────────────────

/// The configured key set: a literal ordered sequence or a zero-argument
/// producer evaluated once per materialisation.
pub(crate) enum KeySet<K> {
  Fixed(Vec<K>),
  Producer(Box<dyn Fn() -> Vec<K> + Send + Sync>),
}

/// The default-key rule: a literal key or a zero-argument producer.
pub(crate) enum DefaultKey<K> {
  Fixed(K),
  Producer(Box<dyn Fn() -> K + Send + Sync>),
}

/// A default attribute value: a literal or a zero-argument producer.
pub(crate) enum DefaultValue {
  Literal(AttributeValue),
  Producer(Box<dyn Fn() -> AttributeValue + Send + Sync>),
}

impl DefaultValue {
  pub(crate) fn produce(&self) -> AttributeValue {
    match self {
      Self::Literal(value) => value.clone(),
      Self::Producer(f) => f(),
    }
  }
}

/// Extra filtering applied to the query that loads existing variation rows.
pub(crate) enum QueryFilter<K: VariationKey> {
  /// Extra equality conditions.
  Conditions(Vec<(String, AttributeValue)>),
  /// Arbitrary refinement of the query.
  Refine(Box<dyn Fn(&mut VariationQuery<K>) + Send + Sync>),
}

pub(crate) type SaveFilter<V> = Box<dyn Fn(&V) -> bool + Send + Sync>;

// ─── Config ──────────────────────────────────────────────────────────────────

/// Validated configuration for a [`crate::VariationBridge`].
///
/// Built through [`VariationConfigBuilder`]; immutable afterwards.
pub struct VariationConfig<V: VariationRecord> {
  pub(crate) key_set:     KeySet<V::Key>,
  pub(crate) default_key: DefaultKey<V::Key>,
  pub(crate) defaults:    Vec<(String, DefaultValue)>,
  pub(crate) filter:      Option<QueryFilter<V::Key>>,
  pub(crate) save_filter: Option<SaveFilter<V>>,
}

impl<V: VariationRecord> VariationConfig<V> {
  pub fn builder() -> VariationConfigBuilder<V> {
    VariationConfigBuilder::new()
  }

  /// Evaluate the key-set option into a concrete key sequence.
  pub(crate) fn resolve_key_set(&self) -> Result<Vec<V::Key>> {
    let keys = match &self.key_set {
      KeySet::Fixed(keys) => keys.clone(),
      KeySet::Producer(f) => f(),
    };
    if keys.is_empty() {
      return Err(Error::Configuration("key set resolved to empty".into()));
    }
    let mut seen = HashSet::new();
    for key in &keys {
      if !seen.insert(key.clone()) {
        return Err(Error::Configuration(format!(
          "key set contains duplicate key: {key}"
        )));
      }
    }
    Ok(keys)
  }

  /// Evaluate the default-key option.
  pub(crate) fn resolve_default_key(&self) -> V::Key {
    match &self.default_key {
      DefaultKey::Fixed(key) => key.clone(),
      DefaultKey::Producer(f) => f(),
    }
  }

  /// Apply the configured query filter to `query`.
  pub(crate) fn apply_filter(&self, query: &mut VariationQuery<V::Key>) {
    match &self.filter {
      None => {}
      Some(QueryFilter::Conditions(conds)) => {
        query.conditions.extend(conds.iter().cloned());
      }
      Some(QueryFilter::Refine(f)) => f(query),
    }
  }

  /// Whether `record` participates in the validate/save cascades.
  pub(crate) fn passes_save_filter(&self, record: &V) -> bool {
    self.save_filter.as_ref().is_none_or(|f| f(record))
  }
}

impl<V: VariationRecord> fmt::Debug for VariationConfig<V> {
  /// Closure-valued options render as `"<producer>"` placeholders.
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let key_set: &dyn fmt::Debug = match &self.key_set {
      KeySet::Fixed(keys) => keys,
      KeySet::Producer(_) => &"<producer>",
    };
    let default_key: &dyn fmt::Debug = match &self.default_key {
      DefaultKey::Fixed(key) => key,
      DefaultKey::Producer(_) => &"<producer>",
    };
    let defaults: Vec<&str> =
      self.defaults.iter().map(|(name, _)| name.as_str()).collect();
    f.debug_struct("VariationConfig")
      .field("key_set", key_set)
      .field("default_key", default_key)
      .field("defaults", &defaults)
      .field("has_filter", &self.filter.is_some())
      .field("has_save_filter", &self.save_filter.is_some())
      .finish()
  }
}

// ─── Builder ─────────────────────────────────────────────────────────────────

/// Builder for [`VariationConfig`]. The key set and the default key are
/// required; everything else is optional.
pub struct VariationConfigBuilder<V: VariationRecord> {
  key_set:     Option<KeySet<V::Key>>,
  default_key: Option<DefaultKey<V::Key>>,
  defaults:    Vec<(String, DefaultValue)>,
  filter:      Option<QueryFilter<V::Key>>,
  save_filter: Option<SaveFilter<V>>,
}

impl<V: VariationRecord> VariationConfigBuilder<V> {
  pub fn new() -> Self {
    Self {
      key_set:     None,
      default_key: None,
      defaults:    Vec::new(),
      filter:      None,
      save_filter: None,
    }
  }

  /// The ordered key values that must exist, one variation record each.
  pub fn key_set(mut self, keys: impl IntoIterator<Item = V::Key>) -> Self {
    self.key_set = Some(KeySet::Fixed(keys.into_iter().collect()));
    self
  }

  /// Producer form of [`key_set`](Self::key_set), evaluated once per
  /// materialisation.
  pub fn key_set_with(
    mut self,
    producer: impl Fn() -> Vec<V::Key> + Send + Sync + 'static,
  ) -> Self {
    self.key_set = Some(KeySet::Producer(Box::new(producer)));
    self
  }

  /// The key designating the default variation record.
  pub fn default_key(mut self, key: V::Key) -> Self {
    self.default_key = Some(DefaultKey::Fixed(key));
    self
  }

  /// Producer form of [`default_key`](Self::default_key), resolved once and
  /// cached by the bridge.
  pub fn default_key_with(
    mut self,
    producer: impl Fn() -> V::Key + Send + Sync + 'static,
  ) -> Self {
    self.default_key = Some(DefaultKey::Producer(Box::new(producer)));
    self
  }

  /// Default value applied to `attribute` when a brand-new variation record
  /// is instantiated. Also what a flattened read returns while no stored
  /// value shadows it.
  pub fn default_value(
    mut self,
    attribute: impl Into<String>,
    value: impl Into<AttributeValue>,
  ) -> Self {
    self
      .defaults
      .push((attribute.into(), DefaultValue::Literal(value.into())));
    self
  }

  /// Producer form of [`default_value`](Self::default_value), invoked once
  /// per instantiated record.
  pub fn default_value_with(
    mut self,
    attribute: impl Into<String>,
    producer: impl Fn() -> AttributeValue + Send + Sync + 'static,
  ) -> Self {
    self
      .defaults
      .push((attribute.into(), DefaultValue::Producer(Box::new(producer))));
    self
  }

  /// Extra equality condition on the query loading existing variation rows.
  /// May be called repeatedly; conditions accumulate.
  pub fn filter_where(
    mut self,
    column: impl Into<String>,
    value: impl Into<AttributeValue>,
  ) -> Self {
    let cond = (column.into(), value.into());
    match &mut self.filter {
      Some(QueryFilter::Conditions(conds)) => conds.push(cond),
      _ => self.filter = Some(QueryFilter::Conditions(vec![cond])),
    }
    self
  }

  /// Callback form of the query filter; replaces any accumulated
  /// [`filter_where`](Self::filter_where) conditions.
  pub fn filter_with(
    mut self,
    refine: impl Fn(&mut VariationQuery<V::Key>) + Send + Sync + 'static,
  ) -> Self {
    self.filter = Some(QueryFilter::Refine(Box::new(refine)));
    self
  }

  /// Predicate deciding whether a variation record participates in the
  /// validate/save cascades. Records failing it are skipped, not deleted.
  pub fn save_filter(
    mut self,
    predicate: impl Fn(&V) -> bool + Send + Sync + 'static,
  ) -> Self {
    self.save_filter = Some(Box::new(predicate));
    self
  }

  /// Validate and freeze the configuration.
  pub fn build(self) -> Result<VariationConfig<V>> {
    let key_set = self
      .key_set
      .ok_or_else(|| Error::Configuration("key set is required".into()))?;
    let default_key = self.default_key.ok_or_else(|| {
      Error::Configuration("default variation key is required".into())
    })?;

    if let KeySet::Fixed(keys) = &key_set {
      if keys.is_empty() {
        return Err(Error::Configuration("key set must not be empty".into()));
      }
      let mut seen = HashSet::new();
      for key in keys {
        if !seen.insert(key.clone()) {
          return Err(Error::Configuration(format!(
            "key set contains duplicate key: {key}"
          )));
        }
      }
      // Membership is only checkable eagerly when both options are literal;
      // a producer-valued default key is checked at resolution instead.
      if let DefaultKey::Fixed(default) = &default_key {
        if !keys.contains(default) {
          return Err(Error::Configuration(format!(
            "default variation key {default} is not in the key set"
          )));
        }
      }
    }

    let known = V::attribute_names();
    for (attribute, _) in &self.defaults {
      if !known.contains(&attribute.as_str()) {
        return Err(Error::Configuration(format!(
          "default value for unknown attribute: {attribute}"
        )));
      }
    }

    Ok(VariationConfig {
      key_set,
      default_key,
      defaults: self.defaults,
      filter: self.filter,
      save_filter: self.save_filter,
    })
  }
}

impl<V: VariationRecord> Default for VariationConfigBuilder<V> {
  fn default() -> Self { Self::new() }
}
