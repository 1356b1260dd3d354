//! Shared engine state for commands and queries.
//!
//! This module defines the explicit dependency container every command
//! and query receives. There are no process globals: the statutory
//! tables are loaded once and shared read-only, and the store handle
//! carries all mutable state.

use std::sync::Arc;

use crate::config::StatutoryTables;

use super::store::MemStore;

/// Shared engine state.
///
/// Contains the resources shared across all commands and queries: the
/// loaded statutory tables (read-only after load) and the transactional
/// store. Cloning is cheap and shares both.
#[derive(Clone)]
pub struct EngineState {
    /// The loaded statutory schedules, keyed by effective year.
    tables: Arc<StatutoryTables>,
    /// The transactional store.
    store: Arc<MemStore>,
}

impl EngineState {
    /// Creates engine state over a fresh, empty store.
    pub fn new(tables: StatutoryTables) -> Self {
        Self {
            tables: Arc::new(tables),
            store: Arc::new(MemStore::new()),
        }
    }

    /// Creates engine state over an existing store handle.
    pub fn with_store(tables: Arc<StatutoryTables>, store: Arc<MemStore>) -> Self {
        Self { tables, store }
    }

    /// Returns a reference to the statutory tables.
    pub fn tables(&self) -> &StatutoryTables {
        &self.tables
    }

    /// Returns a reference to the store.
    pub fn store(&self) -> &MemStore {
        &self.store
    }
}
