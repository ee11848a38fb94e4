//! Core types and trait definitions for the Varia variation-record layer.
//!
//! A *main record* (e.g. a catalog item) exposes attributes that actually
//! live on *variation records* — one related row per key in a finite key set
//! (e.g. one translation per language). [`bridge::VariationBridge`] does the
//! heavy lifting: lazy materialisation of the variation set, default-key
//! selection, flattened attribute access, and the validate/save cascades.
//!
//! This crate is deliberately free of database dependencies. Storage backends
//! implement the [`store::VariationStore`] and [`store::MainStore`] traits
//! (e.g. `varia-store-sqlite`); higher layers depend on those abstractions,
//! not on any concrete backend.

pub mod bridge;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod record;
pub mod store;

#[cfg(test)]
pub(crate) mod testutil;

pub use bridge::VariationBridge;
pub use config::{VariationConfig, VariationConfigBuilder};
pub use error::{Error, Result};
