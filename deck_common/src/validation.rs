//! Write-time deck validation
//!
//! Serde enforces the structural shape; this module enforces the value rules
//! (non-empty title, at least one concept, ...) and reports all of them at once.

use std::fmt;

use thiserror::Error;

use crate::models::{Concept, Deck};

/// A single schema violation, addressed by a JSON-style path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub path: String,
    pub message: String,
}

impl Issue {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Deck failed validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid deck: {}", join_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<Issue>,
}

fn join_issues(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub(crate) fn validate_deck(deck: &Deck) -> Result<(), ValidationError> {
    let mut issues = Vec::new();

    if deck.id.trim().is_empty() {
        issues.push(Issue::new("id", "must not be empty"));
    }
    if deck.title.trim().is_empty() {
        issues.push(Issue::new("title", "must not be empty"));
    }
    if deck.concepts.is_empty() {
        issues.push(Issue::new("concepts", "must contain at least one concept"));
    }
    for (index, concept) in deck.concepts.iter().enumerate() {
        validate_concept(index, concept, &mut issues);
    }

    if issues.is_empty() {
        Ok(())
    } else {
        log::debug!("Deck '{}' failed validation: {} issue(s)", deck.id, issues.len());
        Err(ValidationError { issues })
    }
}

fn validate_concept(index: usize, concept: &Concept, issues: &mut Vec<Issue>) {
    let base = format!("concepts[{}]", index);

    if concept.term.trim().is_empty() {
        issues.push(Issue::new(format!("{}.term", base), "must not be empty"));
    }
    if concept.definition.trim().is_empty() {
        issues.push(Issue::new(format!("{}.definition", base), "must not be empty"));
    }

    let Some(variations) = &concept.variations else {
        return;
    };
    for (v_index, variation) in variations.iter().enumerate() {
        let v_base = format!("{}.variations[{}]", base, v_index);
        if variation.kind.trim().is_empty() {
            issues.push(Issue::new(format!("{}.type", v_base), "must not be empty"));
        }
        if variation.text.trim().is_empty() {
            issues.push(Issue::new(format!("{}.text", v_base), "must not be empty"));
        }
    }
}
