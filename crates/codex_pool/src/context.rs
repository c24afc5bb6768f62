//! Per-request search context.

use codex_foundation::Result;

use crate::alias::{AliasResolver, AliasScope, AliasSource};

/// Everything a search needs to know about who is asking.
///
/// Built once per request from read-only alias lists; the engine never
/// writes back to the alias source.
#[derive(Clone, Debug)]
pub struct SearchContext {
    aliases: AliasResolver,
    allow_random: bool,
}

impl Default for SearchContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchContext {
    /// A context with no aliases where random picks are allowed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            aliases: AliasResolver::default(),
            allow_random: true,
        }
    }

    /// Loads user aliases, then group aliases, from `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if an alias pattern cannot be compiled.
    pub fn from_source(
        source: &dyn AliasSource,
        user: Option<&AliasScope>,
        group: Option<&AliasScope>,
    ) -> Result<Self> {
        let user = user.map(|scope| source.aliases(scope)).unwrap_or_default();
        let group = group.map(|scope| source.aliases(scope)).unwrap_or_default();
        Ok(Self {
            aliases: AliasResolver::new(&user, &group)?,
            allow_random: true,
        })
    }

    /// Replaces the alias resolver.
    #[must_use]
    pub fn with_aliases(mut self, aliases: AliasResolver) -> Self {
        self.aliases = aliases;
        self
    }

    /// Sets whether the `random` keyword may pick an entity.
    #[must_use]
    pub fn with_random(mut self, allow: bool) -> Self {
        self.allow_random = allow;
        self
    }

    /// Whether the `random` keyword may pick an entity.
    #[must_use]
    pub fn allow_random(&self) -> bool {
        self.allow_random
    }

    /// Applies aliases to raw text and returns the normalized query.
    #[must_use]
    pub fn resolve(&self, text: &str) -> String {
        self.aliases.resolve(text)
    }
}
