//! File name derivation
//!
//! A deck is stored under a slug of its title. Slugs only contain `[a-z0-9-]`,
//! so a valid file name can never escape the data directory.

use crate::models::Deck;

/// Lowercase the title and collapse every run of non `[a-z0-9]` characters into one `-`
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// File name a deck is stored under
///
/// Titles without any ASCII alphanumerics fall back to `deck-<id prefix>`.
pub fn file_name_for(deck: &Deck) -> String {
    let slug = slugify(&deck.title);
    if !slug.is_empty() {
        return slug;
    }

    let id_part: String = slugify(&deck.id).chars().filter(|c| *c != '-').take(8).collect();
    if id_part.is_empty() {
        "deck".to_string()
    } else {
        format!("deck-{}", id_part)
    }
}

/// Check that a client-supplied file name is a slug (`[a-z0-9]+(-[a-z0-9]+)*`)
pub fn is_valid_file_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .split('-')
            .all(|part| {
                !part.is_empty()
                    && part.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
            })
}
