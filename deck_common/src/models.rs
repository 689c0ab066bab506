//! Deck data model
//!
//! JSON field names are camelCase to match the files on disk and the HTTP API.

use serde::{Deserialize, Serialize};

use crate::validation::{self, ValidationError};

/// A named collection of concepts to study
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub concepts: Vec<Concept>,
}

impl Deck {
    /// Check the deck against the schema, collecting every issue found
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_deck(self)
    }
}

/// Kind of concept. Only plain terms exist today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConceptType {
    #[default]
    Term,
}

/// A term/definition pair, optionally annotated with variations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    pub concept_type: ConceptType,
    pub term: String,
    pub definition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variations: Option<Vec<Variation>>,
}

impl Concept {
    pub fn term(term: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            concept_type: ConceptType::Term,
            term: term.into(),
            definition: definition.into(),
            variations: None,
        }
    }
}

/// A typed supplementary note attached to a concept (example, fun fact, ...)
///
/// `type` is free-form: the schema does not restrict it to a fixed set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variation {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

/// Deck as submitted by create/import requests, before an id is assigned
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckInput {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub concepts: Vec<Concept>,
}

impl DeckInput {
    /// Turn the input into a deck, calling `new_id` when no usable id was supplied
    pub fn into_deck(self, new_id: impl FnOnce() -> String) -> Deck {
        let id = match self.id {
            Some(id) if !id.trim().is_empty() => id,
            _ => new_id(),
        };
        Deck {
            id,
            title: self.title,
            description: self.description,
            concepts: self.concepts,
        }
    }
}

/// A deck together with the file name it is stored under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckInfo {
    pub file_name: String,
    pub deck: Deck,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "id": "b1f0",
        "title": "Spanish Basics",
        "description": "Greetings",
        "concepts": [
            {
                "conceptType": "term",
                "term": "Hola",
                "definition": "Hello",
                "variations": [{ "type": "example", "text": "Hola, amigo" }]
            },
            { "conceptType": "term", "term": "Adiós", "definition": "Goodbye" }
        ]
    }"#;

    #[test]
    fn deck_round_trips_through_json() {
        let deck: Deck = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(deck.title, "Spanish Basics");
        assert_eq!(deck.concepts.len(), 2);
        assert_eq!(
            deck.concepts[0].variations.as_ref().unwrap()[0].kind,
            "example"
        );

        let json = serde_json::to_string(&deck).unwrap();
        let reparsed: Deck = serde_json::from_str(&json).unwrap();
        assert_eq!(deck, reparsed);
    }

    #[test]
    fn optional_fields_are_omitted_when_absent() {
        let deck: Deck = serde_json::from_str(SAMPLE).unwrap();
        let json = serde_json::to_string(&deck.concepts[1]).unwrap();
        assert!(json.contains("\"conceptType\":\"term\""));
        assert!(!json.contains("variations"));
    }

    #[test]
    fn deck_missing_concepts_fails_to_parse() {
        let result: Result<Deck, _> = serde_json::from_str(r#"{"id": "x", "title": "No concepts"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn deck_missing_title_fails_to_parse() {
        let result: Result<Deck, _> = serde_json::from_str(
            r#"{"id": "x", "concepts": [{"conceptType": "term", "term": "a", "definition": "b"}]}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn unknown_concept_type_is_rejected() {
        let result: Result<Concept, _> = serde_json::from_str(
            r#"{"conceptType": "image", "term": "a", "definition": "b"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn deck_input_keeps_supplied_id() {
        let input: DeckInput = serde_json::from_str(SAMPLE).unwrap();
        let deck = input.into_deck(|| "generated".to_string());
        assert_eq!(deck.id, "b1f0");
    }

    #[test]
    fn deck_input_generates_id_when_missing_or_blank() {
        let input: DeckInput = serde_json::from_str(
            r#"{"title": "T", "concepts": [{"conceptType": "term", "term": "a", "definition": "b"}]}"#,
        )
        .unwrap();
        assert_eq!(input.into_deck(|| "generated".to_string()).id, "generated");

        let blank: DeckInput = serde_json::from_str(
            r#"{"id": "  ", "title": "T", "concepts": []}"#,
        )
        .unwrap();
        assert_eq!(blank.into_deck(|| "fresh".to_string()).id, "fresh");
    }
}
