//! Deck cache mirror
//!
//! All decks live in one hash (`decks`) in the key-value store, keyed by file
//! name, with the deck JSON as value. The hash is seeded from the deck files
//! the first time it is needed and only if it is empty. Reads prefer the hash;
//! writes go to the hash and, with write-through on, to the files as well.
//!
//! Without a configured store every operation goes straight to the files.

use std::sync::Arc;

use deck_common::{Deck, DeckInfo};
use tokio::sync::OnceCell;

use crate::config::Config;
use crate::deck_fs::DeckFs;
use crate::error::{KvResult, Result, StoreError};
use crate::kv::{self, KvStore};

/// Hash holding every cached deck
pub const DECKS_KEY: &str = "decks";

pub struct DeckCache {
    fs: DeckFs,
    store: Option<Arc<dyn KvStore>>,
    write_through: bool,
    seeded: OnceCell<()>,
}

impl DeckCache {
    pub fn new(fs: DeckFs, store: Option<Arc<dyn KvStore>>, write_through: bool) -> Self {
        if store.is_none() {
            log::warn!("No key-value store configured, decks are served from files only");
        }

        Self {
            fs,
            store,
            write_through,
            seeded: OnceCell::new(),
        }
    }

    /// Build the file service and connect the configured store
    pub fn from_config(config: &Config) -> KvResult<Self> {
        let fs = DeckFs::new(&config.data_dir);
        let store = kv::connect(&config.kv)?;
        Ok(Self::new(fs, store, config.write_through))
    }

    pub fn fs(&self) -> &DeckFs {
        &self.fs
    }

    /// Backend name, or `filesystem` when no store is configured
    pub fn backend_name(&self) -> &'static str {
        self.store.as_ref().map_or("filesystem", |store| store.name())
    }

    /// Whether writes land in the deck files
    fn writes_files(&self) -> bool {
        self.store.is_none() || self.write_through
    }

    /// Seed the hash from the files once per process
    ///
    /// On failure the error is returned and the next call tries again. No
    /// read or write touches the hash until a seed has succeeded.
    pub async fn ensure_seeded(&self) -> Result<()> {
        if self.store.is_none() {
            return Ok(());
        }

        self.seeded
            .get_or_try_init(|| async {
                let count = self.sync_from_file_system().await.map_err(|e| {
                    log::warn!("Failed to seed deck cache: {}", e);
                    e
                })?;
                log::info!("Deck cache ready ({} decks seeded)", count);
                Ok::<(), StoreError>(())
            })
            .await?;
        Ok(())
    }

    /// Copy every deck file into the hash, but only if the hash is empty
    ///
    /// Returns the number of decks copied.
    pub async fn sync_from_file_system(&self) -> Result<usize> {
        let Some(store) = &self.store else {
            return Ok(0);
        };

        let existing = store.hlen(DECKS_KEY).await?;
        if existing > 0 {
            log::debug!("Deck cache already holds {} decks, skipping sync", existing);
            return Ok(0);
        }

        let decks = self.fs.get_all_decks_info();
        for info in &decks {
            let json = serde_json::to_string(&info.deck)?;
            store.hset(DECKS_KEY, &info.file_name, &json).await?;
        }

        log::info!("Synced {} decks from {:?} into cache", decks.len(), self.fs.data_dir());
        Ok(decks.len())
    }

    /// Get one deck by file name
    pub async fn get_one(&self, name: &str) -> Result<Option<Deck>> {
        let Some(store) = &self.store else {
            return Ok(self.fs.load_deck(name));
        };

        self.ensure_seeded().await?;
        match store.hget(DECKS_KEY, name).await? {
            Some(raw) => {
                log::debug!("Cache hit for deck: {}", name);
                Ok(decode(name, &raw))
            }
            None => {
                log::debug!("Cache miss for deck: {}", name);
                Ok(None)
            }
        }
    }

    /// Get every deck, sorted by file name
    pub async fn get_all(&self) -> Result<Vec<DeckInfo>> {
        let Some(store) = &self.store else {
            return Ok(self.fs.get_all_decks_info());
        };

        self.ensure_seeded().await?;
        let decks = store
            .hgetall(DECKS_KEY)
            .await?
            .into_iter()
            .filter_map(|(file_name, raw)| {
                let deck = decode(&file_name, &raw)?;
                Some(DeckInfo { file_name, deck })
            })
            .collect();
        Ok(decks)
    }

    /// Whether a deck is stored under this file name
    ///
    /// With a store configured only the hash counts. Entries that fail to
    /// decode still occupy their name.
    pub async fn contains(&self, name: &str) -> Result<bool> {
        let Some(store) = &self.store else {
            return Ok(self.fs.exists(name));
        };

        self.ensure_seeded().await?;
        Ok(store.hget(DECKS_KEY, name).await?.is_some())
    }

    /// Validate and store a deck, replacing any previous version
    pub async fn add_one(&self, name: &str, deck: &Deck) -> Result<()> {
        deck.validate()?;

        if let Some(store) = &self.store {
            self.ensure_seeded().await?;
            let json = serde_json::to_string(deck)?;
            store.hset(DECKS_KEY, name, &json).await?;
        }

        if self.writes_files() {
            if let Err(e) = self.fs.save_deck(name, deck) {
                if self.store.is_some() {
                    log::error!("Deck {} cached but not written to disk: {}", name, e);
                }
                return Err(e);
            }
        }

        log::info!("Stored deck: {}", name);
        Ok(())
    }

    /// Remove a deck from the hash and the files. Returns whether it existed.
    pub async fn delete_one(&self, name: &str) -> Result<bool> {
        let mut existed = false;

        if let Some(store) = &self.store {
            self.ensure_seeded().await?;
            existed |= store.hdel(DECKS_KEY, name).await?;
        }

        if self.writes_files() {
            existed |= self.fs.delete_deck(name)?;
        }

        if existed {
            log::info!("Deleted deck: {}", name);
        }
        Ok(existed)
    }

    /// Drop the whole hash. Files are untouched.
    pub async fn invalidate(&self) -> Result<()> {
        match &self.store {
            Some(store) => {
                store.del(DECKS_KEY).await?;
                log::info!("Deck cache invalidated");
            }
            None => log::warn!("Deck cache invalidate requested but no store is configured"),
        }
        Ok(())
    }
}

/// Parse a cached value, skipping entries that no longer validate
fn decode(name: &str, raw: &str) -> Option<Deck> {
    let deck: Deck = match serde_json::from_str(raw) {
        Ok(deck) => deck,
        Err(e) => {
            log::warn!("Failed to parse cached deck {}: {}", name, e);
            return None;
        }
    };

    if let Err(e) = deck.validate() {
        log::warn!("Cached deck {} is invalid: {}", name, e);
        return None;
    }
    Some(deck)
}
