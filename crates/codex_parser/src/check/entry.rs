//! Nested entity references.

use std::sync::Arc;

use codex_pool::{Pool, SearchContext, SearchResult};
use rand::Rng;

/// A reference into a secondary pool.
///
/// Searches are stored as they are; picking between several matches
/// happens after parsing.
#[derive(Clone, Debug)]
pub struct EntryCheck {
    pool: Arc<Pool>,
}

impl EntryCheck {
    /// Creates a check searching `pool`.
    #[must_use]
    pub fn new(pool: Arc<Pool>) -> Self {
        Self { pool }
    }

    /// The searched pool.
    #[must_use]
    pub fn pool(&self) -> &Arc<Pool> {
        &self.pool
    }

    /// Searches the pool for `text`.
    #[must_use]
    pub fn search(&self, text: &str, ctx: &SearchContext) -> SearchResult {
        self.pool.search(text, Some(ctx))
    }

    /// Display name of a random entity.
    pub fn example<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<String> {
        self.pool
            .random_pick(rng)
            .map(|entity| entity.short_display().to_string())
    }
}

impl PartialEq for EntryCheck {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pool, &other.pool)
    }
}

impl Eq for EntryCheck {}
