//! Deck Server - flashcard deck storage & API
//!
//! Stores flashcard decks as JSON files, mirrors them into a key-value cache,
//! and serves them over a JSON HTTP API.

pub mod auth;
pub mod cache;
pub mod config;
pub mod deck_fs;
pub mod error;
pub mod kv;
pub mod posts;
pub mod web;

pub use cache::{DeckCache, DECKS_KEY};
pub use config::{Config, KvBackend, KvKind};
pub use deck_fs::DeckFs;
pub use error::{ApiError, KvError, Result, StoreError};
pub use kv::{KvStore, MemoryKvStore, RestKvStore, SqliteKvStore};
pub use posts::{Post, PostFeed};
pub use web::{create_router, serve, ApiResponse, AppState};
