//! Key-value stores for the deck cache
//!
//! The cache only needs Redis-style hash commands on string values, so every
//! backend implements that small surface.

mod memory;
mod rest;
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;

pub use memory::MemoryKvStore;
pub use rest::RestKvStore;
pub use sqlite::SqliteKvStore;

use crate::config::KvBackend;
use crate::error::KvResult;

/// Hash operations on an external key-value store
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Short backend name for logs and the health endpoint
    fn name(&self) -> &'static str;

    /// Number of fields in the hash (0 if it does not exist)
    async fn hlen(&self, key: &str) -> KvResult<usize>;

    async fn hget(&self, key: &str, field: &str) -> KvResult<Option<String>>;

    /// All `(field, value)` pairs, sorted by field
    async fn hgetall(&self, key: &str) -> KvResult<Vec<(String, String)>>;

    async fn hset(&self, key: &str, field: &str, value: &str) -> KvResult<()>;

    /// Remove a field. Returns whether it existed.
    async fn hdel(&self, key: &str, field: &str) -> KvResult<bool>;

    /// Remove the whole hash
    async fn del(&self, key: &str) -> KvResult<()>;
}

/// Open the configured store, or `None` when no store is configured
pub fn connect(backend: &KvBackend) -> KvResult<Option<Arc<dyn KvStore>>> {
    let store: Arc<dyn KvStore> = match backend {
        KvBackend::None => return Ok(None),
        KvBackend::Memory => Arc::new(MemoryKvStore::new()),
        KvBackend::Sqlite { path } => Arc::new(SqliteKvStore::open(path)?),
        KvBackend::Rest { url, token } => Arc::new(RestKvStore::new(url, token)),
    };

    log::info!("Using {} key-value store", store.name());
    Ok(Some(store))
}
