//! Document storage for the career guidance platform.
//!
//! - [`store`] -- the [`DocumentStore`] interface every backend implements.
//! - [`memory`] -- in-process implementation used for development and tests.
//! - [`models`] -- document structs and request DTOs.
//! - [`repositories`] -- zero-sized repositories over named collections.

use std::sync::Arc;

pub mod memory;
pub mod models;
pub mod repositories;
pub mod store;

pub use memory::MemoryStore;
pub use store::{Document, DocumentStore, Query, StoreError};

/// Shared handle to the configured document store.
pub type DbPool = Arc<dyn DocumentStore>;

/// URL scheme selecting the in-memory store.
pub const MEMORY_SCHEME: &str = "memory://";

/// Open a store from a connection URL.
///
/// Only `memory://` is built in; other backends plug in by implementing
/// [`DocumentStore`] and constructing the pool directly.
pub async fn create_pool(url: &str) -> Result<DbPool, StoreError> {
    if url.starts_with(MEMORY_SCHEME) {
        tracing::info!("Using in-memory document store");
        return Ok(Arc::new(MemoryStore::new()));
    }
    Err(StoreError::UnsupportedUrl(url.to_string()))
}

/// Verify the store is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), StoreError> {
    pool.ping().await
}
