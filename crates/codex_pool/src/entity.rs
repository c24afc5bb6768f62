//! Entity records.
//!
//! An [`Entity`] is one resolvable catalog record. It is created once when
//! its section loads and never changes afterwards.

use codex_foundation::normalize;
use serde::{Deserialize, Serialize};

use crate::catalog::Lexicon;

/// A raw record as supplied by a catalog provider.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Stable key
    pub id: String,
    /// Canonical name
    pub name: String,
    /// Presentation string (defaults to the name)
    #[serde(default)]
    pub display: Option<String>,
    /// Soft aliases, matched by substring
    #[serde(default)]
    pub alt: Vec<String>,
    /// Hard aliases, matched only by equality
    #[serde(default)]
    pub hard: Vec<String>,
}

impl EntityRecord {
    /// Creates a record with only an id and a name.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a soft alias.
    #[must_use]
    pub fn with_alt(mut self, alias: impl Into<String>) -> Self {
        self.alt.push(alias.into());
        self
    }

    /// Adds a hard alias.
    #[must_use]
    pub fn with_hard(mut self, alias: impl Into<String>) -> Self {
        self.hard.push(alias.into());
        self
    }

    /// Sets the display string.
    #[must_use]
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }
}

/// A resolvable catalog entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Entity {
    /// Stable key
    pub id: String,
    /// Canonical name
    pub name: String,
    /// Presentation string
    pub display: String,
    /// Normalized soft aliases, de-duplicated in order
    pub alt: Vec<String>,
    /// Normalized hard aliases, de-duplicated in order
    pub hard: Vec<String>,
    /// Catalog section the entity was loaded from
    pub section: String,
}

impl Entity {
    /// Builds an entity from a provider record.
    ///
    /// Lexicon entries keyed by the normalized name extend the soft aliases.
    #[must_use]
    pub fn from_record(section: &str, record: EntityRecord, lexicon: Option<&Lexicon>) -> Self {
        let mut alt = normalized_set(&record.alt);
        let hard = normalized_set(&record.hard);

        if let Some(extra) = lexicon.and_then(|lex| lex.get(&normalize(&record.name))) {
            for alias in extra {
                let alias = normalize(alias);
                if !alias.is_empty() && !alt.contains(&alias) {
                    alt.push(alias);
                }
            }
        }

        let display = record.display.unwrap_or_else(|| record.name.clone());

        Self {
            id: record.id,
            name: record.name,
            display,
            alt,
            hard,
            section: section.to_string(),
        }
    }

    /// Display string without any `prefix>` grouping marker.
    #[must_use]
    pub fn short_display(&self) -> &str {
        self.display
            .split_once('>')
            .map_or(self.display.as_str(), |(_, rest)| rest.trim())
    }
}

fn normalized_set(values: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let value = normalize(value);
        if !value.is_empty() && !out.contains(&value) {
            out.push(value);
        }
    }
    out
}
