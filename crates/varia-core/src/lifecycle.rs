//! Validate/save orchestration across a main record and its variations.
//!
//! The host calls these at its own lifecycle points; they compose the store
//! primitives with the bridge's cascades. No transaction is opened here —
//! if the store fails partway through the variation cascade, the main
//! record and the variations saved before the failure stay committed.
//! Hosts that need atomicity wrap the call in their own transaction scope.

use crate::{
  bridge::VariationBridge,
  error::{Error, Result, ValidationErrors},
  record::{MainRecord, VariationRecord},
  store::{MainStore, VariationStore},
};

/// Validate the main record's own rules, then every materialised variation
/// record that passes the save filter.
///
/// Main-rule failures short-circuit: variations are only validated once the
/// main record itself is valid. Variations never materialised do not
/// participate. Any failure is reported as [`Error::Validation`] carrying
/// the aggregated field errors.
pub fn validate_with_variations<M, V>(
  main: &M,
  bridge: &VariationBridge<V>,
) -> Result<()>
where
  M: MainRecord,
  V: VariationRecord,
{
  let main_errors = main.validate();
  if !main_errors.is_empty() {
    return Err(Error::Validation(ValidationErrors {
      main:       main_errors,
      variations: Vec::new(),
    }));
  }

  let variation_errors = bridge.validate_variations();
  if !variation_errors.is_empty() {
    return Err(Error::Validation(ValidationErrors {
      main:       Vec::new(),
      variations: variation_errors,
    }));
  }
  Ok(())
}

/// Validate everything, persist the main record, then cascade the save to
/// the materialised variation records with the now-known primary key.
///
/// A validation failure refuses the save entirely. A store failure during
/// the cascade propagates with the main record (and any earlier variations)
/// already saved; see the module docs for the atomicity caveat.
pub async fn save_with_variations<M, V, S>(
  store: &S,
  main: &mut M,
  bridge: &mut VariationBridge<V>,
) -> Result<()>
where
  M: MainRecord,
  V: VariationRecord,
  S: MainStore<M> + VariationStore<V>,
{
  validate_with_variations(&*main, bridge)?;

  if main.is_new_record() {
    store.insert_main(main).await.map_err(Error::store)?;
  } else {
    store.update_main(main).await.map_err(Error::store)?;
  }

  let owner = main.id().ok_or(Error::MissingPrimaryKey)?;
  bridge.save_variations(store, owner).await
}
