//! In-process key-value store, lost on restart

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;

use super::KvStore;
use crate::error::{KvError, KvResult};

#[derive(Debug, Default)]
pub struct MemoryKvStore {
    hashes: RwLock<HashMap<String, BTreeMap<String, String>>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn hlen(&self, key: &str) -> KvResult<usize> {
        let hashes = self.hashes.read().map_err(|_| KvError::Poisoned)?;
        Ok(hashes.get(key).map_or(0, BTreeMap::len))
    }

    async fn hget(&self, key: &str, field: &str) -> KvResult<Option<String>> {
        let hashes = self.hashes.read().map_err(|_| KvError::Poisoned)?;
        Ok(hashes.get(key).and_then(|hash| hash.get(field)).cloned())
    }

    async fn hgetall(&self, key: &str) -> KvResult<Vec<(String, String)>> {
        let hashes = self.hashes.read().map_err(|_| KvError::Poisoned)?;
        Ok(hashes
            .get(key)
            .map(|hash| hash.iter().map(|(f, v)| (f.clone(), v.clone())).collect())
            .unwrap_or_default())
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> KvResult<()> {
        let mut hashes = self.hashes.write().map_err(|_| KvError::Poisoned)?;
        hashes
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
        Ok(())
    }

    async fn hdel(&self, key: &str, field: &str) -> KvResult<bool> {
        let mut hashes = self.hashes.write().map_err(|_| KvError::Poisoned)?;
        let Some(hash) = hashes.get_mut(key) else {
            return Ok(false);
        };
        let removed = hash.remove(field).is_some();
        if hash.is_empty() {
            hashes.remove(key);
        }
        Ok(removed)
    }

    async fn del(&self, key: &str) -> KvResult<()> {
        let mut hashes = self.hashes.write().map_err(|_| KvError::Poisoned)?;
        hashes.remove(key);
        Ok(())
    }
}
