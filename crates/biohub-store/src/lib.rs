//! BioHub Store: row access for profiles, colabs, challenges, and the AI log.
//!
//! # Modules
//!
//! - [`store`]: the [`Store`] trait every backend implements
//! - [`rest`]: [`RestStore`], speaking PostgREST
//! - [`memory`]: [`MemoryStore`], keeping rows in process
//! - [`error`]: [`StoreError`] and the `Result` alias

#![doc = include_str!("../README.md")]

pub mod error;
pub mod memory;
pub mod rest;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use rest::RestStore;
pub use store::{SharedStore, Store};

use std::sync::Arc;

use biohub_core::{BiohubConfig, StoreBackend};

/// Builds the store selected by `store.backend`.
pub fn from_config(config: &BiohubConfig) -> SharedStore {
    match config.store.backend {
        StoreBackend::Rest => Arc::new(RestStore::from_config(config)),
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
    }
}
