//! Filesystem deck service
//!
//! One pretty-printed JSON file per deck under the data directory, named
//! `<fileName>.json`. The file name is the deck's storage key.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use deck_common::{Deck, DeckInfo};
use uuid::Uuid;

use crate::error::{Result, StoreError};

const DECK_EXTENSION: &str = "json";

/// Reads and writes deck files in a single directory
#[derive(Debug, Clone)]
pub struct DeckFs {
    data_dir: PathBuf,
}

impl DeckFs {
    /// Create the service, creating the data directory if needed
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();

        if let Err(e) = std::fs::create_dir_all(&data_dir) {
            log::warn!("Failed to create deck directory {:?}: {}", data_dir, e);
        } else {
            log::info!("Deck directory: {:?}", data_dir);
        }

        Self { data_dir }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Full path of a deck file
    fn deck_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{}.{}", name, DECK_EXTENSION))
    }

    /// Unique per write, so concurrent saves of one deck never share it
    fn temp_path(&self, name: &str) -> PathBuf {
        self.data_dir
            .join(format!(".{}.{}.{}.tmp", name, Uuid::new_v4().simple(), DECK_EXTENSION))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.deck_path(name).is_file()
    }

    /// Load and validate a deck, keeping the reason on failure
    pub fn try_load_deck(&self, name: &str) -> Result<Deck> {
        let content = match std::fs::read_to_string(self.deck_path(name)) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let deck: Deck = serde_json::from_str(&content)?;
        deck.validate()?;
        Ok(deck)
    }

    /// Load a deck, or `None` if it is missing, malformed, or fails validation
    pub fn load_deck(&self, name: &str) -> Option<Deck> {
        match self.try_load_deck(name) {
            Ok(deck) => Some(deck),
            Err(StoreError::NotFound(_)) => {
                log::debug!("Deck file not found: {}", name);
                None
            }
            Err(e) => {
                log::warn!("Failed to load deck {}: {}", name, e);
                None
            }
        }
    }

    /// File names (without extension) of every deck file, sorted
    pub fn list_available_decks(&self) -> Vec<String> {
        let entries = match std::fs::read_dir(&self.data_dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Failed to read deck directory {:?}: {}", self.data_dir, e);
                return Vec::new();
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some(DECK_EXTENSION))
            .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
            .filter(|stem| !stem.starts_with('.'))
            .collect();

        names.sort();
        names
    }

    /// Load every listed deck one after another, skipping the ones that fail
    pub fn get_all_decks_info(&self) -> Vec<DeckInfo> {
        self.list_available_decks()
            .into_iter()
            .filter_map(|file_name| {
                let deck = self.load_deck(&file_name)?;
                Some(DeckInfo { file_name, deck })
            })
            .collect()
    }

    /// Validate and write a deck, replacing any existing file
    ///
    /// Writes to a temp file first and renames it over the target.
    pub fn save_deck(&self, name: &str, deck: &Deck) -> Result<()> {
        deck.validate()?;
        std::fs::create_dir_all(&self.data_dir)?;

        let content = serde_json::to_string_pretty(deck)?;
        let temp = self.temp_path(name);
        let written = std::fs::write(&temp, content)
            .and_then(|()| std::fs::rename(&temp, self.deck_path(name)));
        if let Err(e) = written {
            let _ = std::fs::remove_file(&temp);
            return Err(e.into());
        }

        log::debug!("Wrote deck file: {}", name);
        Ok(())
    }

    /// Remove a deck file. Returns `false` if there was none.
    pub fn delete_deck(&self, name: &str) -> Result<bool> {
        match std::fs::remove_file(self.deck_path(name)) {
            Ok(()) => {
                log::debug!("Removed deck file: {}", name);
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
