//! Deck Common - shared flashcard deck types
//!
//! Schema layer used by the deck server: the `Deck` / `Concept` / `Variation`
//! shapes, write-time validation, and file name derivation from deck titles.

pub mod models;
pub mod slug;
pub mod validation;

pub use models::{Concept, ConceptType, Deck, DeckInfo, DeckInput, Variation};
pub use slug::{file_name_for, is_valid_file_name, slugify};
pub use validation::{Issue, ValidationError};
