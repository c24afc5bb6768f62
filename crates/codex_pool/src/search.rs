//! Search result types.

use std::sync::Arc;

use serde::Serialize;

use crate::entity::Entity;

/// Outcome of one pool search.
///
/// Zero finds is the "not found" state, more than one is the ambiguous
/// state. Neither is an error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    /// Matched entities in pool order
    pub finds: Vec<Arc<Entity>>,
    /// Section of the pool that was searched
    pub section: String,
    /// Raw query text
    pub text: String,
}

impl SearchResult {
    /// Creates a search result.
    #[must_use]
    pub fn new(finds: Vec<Arc<Entity>>, section: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            finds,
            section: section.into(),
            text: text.into(),
        }
    }

    /// Creates an empty result for `text`.
    #[must_use]
    pub fn empty(section: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(Vec::new(), section, text)
    }

    /// If one entity or more has been found.
    #[must_use]
    pub fn has_results(&self) -> bool {
        !self.finds.is_empty()
    }

    /// If the user has to pick between several entities.
    #[must_use]
    pub fn is_multiple(&self) -> bool {
        self.finds.len() > 1
    }

    /// Number of matched entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.finds.len()
    }

    /// Returns true if nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.finds.is_empty()
    }

    /// The first match, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Arc<Entity>> {
        self.finds.first()
    }

    /// Id of the first match, if any.
    #[must_use]
    pub fn result_id(&self) -> Option<&str> {
        self.first().map(|entity| entity.id.as_str())
    }

    /// The first `cap` candidates and how many were left out.
    #[must_use]
    pub fn candidates(&self, cap: usize) -> (&[Arc<Entity>], usize) {
        let shown = self.finds.len().min(cap);
        (&self.finds[..shown], self.finds.len() - shown)
    }

    /// Narrows the result to the candidate at `index`.
    #[must_use]
    pub fn choose(&self, index: usize) -> Option<Self> {
        let entity = self.finds.get(index)?;
        Some(Self::new(
            vec![Arc::clone(entity)],
            self.section.clone(),
            self.text.clone(),
        ))
    }

    /// Narrows the result to the candidate with `id`.
    #[must_use]
    pub fn choose_id(&self, id: &str) -> Option<Self> {
        let index = self.finds.iter().position(|entity| entity.id == id)?;
        self.choose(index)
    }
}

/// Outcome of an incremental multi-word search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListSearchResult {
    /// Best accepted search, if any
    pub search: Option<SearchResult>,
    /// Phrase that produced the accepted search
    pub text: String,
    /// Words consumed into the phrase
    pub words: Vec<String>,
    /// Trailing words not consumed into the phrase
    pub invalid_word: Vec<String>,
}

impl ListSearchResult {
    /// If an entity phrase was found.
    #[must_use]
    pub fn is_found(&self) -> bool {
        self.search.is_some()
    }
}
