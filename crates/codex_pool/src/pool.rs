//! Indexed entity collections.
//!
//! A [`Pool`] holds the entities of one catalog section (or the union of
//! several) plus two derived indices:
//!
//! - `hard`: normalized string -> entity, exact match only
//! - `alt`: per-entity normalized soft aliases, substring match
//!
//! Pools are built at startup and read-only afterwards, so any number of
//! requests may search the same pool concurrently.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use codex_foundation::{is_level_run, normalize};
use rand::Rng;
use tracing::{debug, trace};

use crate::catalog::Lexicon;
use crate::context::SearchContext;
use crate::entity::{Entity, EntityRecord};
use crate::search::{ListSearchResult, SearchResult};

/// Words starting with these never extend an unambiguous entity phrase.
pub const FLAG_PREFIXES: &[char] = &['-', '~', '+', '?', '$'];

/// Keyword that requests a random entity.
pub const RANDOM_KEYWORD: &str = "random";

/// Short form of [`RANDOM_KEYWORD`], accepted only as the whole query.
pub const RANDOM_SHORT: &str = "rand";

/// An indexed, searchable collection of entities.
#[derive(Clone, Debug, Default)]
pub struct Pool {
    section: String,
    entities: im::Vector<Arc<Entity>>,
    hard: HashMap<String, usize>,
    alt: Vec<Vec<String>>,
}

impl Pool {
    /// Creates an empty pool for `section`.
    #[must_use]
    pub fn new(section: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            ..Self::default()
        }
    }

    /// Builds a pool from provider records.
    ///
    /// Records with an id seen earlier in the same batch are skipped.
    #[must_use]
    pub fn build(
        section: impl Into<String>,
        records: impl IntoIterator<Item = EntityRecord>,
        lexicon: Option<&Lexicon>,
    ) -> Self {
        let mut pool = Self::new(section);
        let entities: Vec<Arc<Entity>> = records
            .into_iter()
            .map(|record| Arc::new(Entity::from_record(&pool.section, record, lexicon)))
            .collect();
        pool.extend(entities);
        pool.organize();
        debug!(section = %pool.section, entities = pool.len(), "pool built");
        pool
    }

    /// Builds the union of `pools`; the first pool holding an id wins.
    #[must_use]
    pub fn mix<'a>(section: impl Into<String>, pools: impl IntoIterator<Item = &'a Pool>) -> Self {
        let mut mixed = Self::new(section);
        for pool in pools {
            mixed.extend(pool.entities.iter().cloned());
        }
        mixed.organize();
        mixed
    }

    /// Appends entities whose id is not present yet. Call [`Pool::organize`] after.
    fn extend(&mut self, entities: impl IntoIterator<Item = Arc<Entity>>) {
        let mut seen: HashSet<String> = self.entities.iter().map(|e| e.id.clone()).collect();
        for entity in entities {
            if seen.insert(entity.id.clone()) {
                self.entities.push_back(entity);
            }
        }
    }

    /// Rebuilds the `hard` and `alt` indices. Idempotent.
    ///
    /// Claim order for `hard`: ids, names, hard aliases, then every soft
    /// alias (id and name included). The first claimant of a key keeps it.
    pub fn organize(&mut self) {
        let mut hard: HashMap<String, usize> = HashMap::new();
        let mut claim = |key: &str, index: usize| {
            let key = normalize(key);
            if !key.is_empty() {
                hard.entry(key).or_insert(index);
            }
        };

        for (index, entity) in self.entities.iter().enumerate() {
            claim(&entity.id, index);
        }
        for (index, entity) in self.entities.iter().enumerate() {
            claim(&entity.name, index);
        }
        for (index, entity) in self.entities.iter().enumerate() {
            for alias in &entity.hard {
                claim(alias, index);
            }
        }

        let mut alt = Vec::with_capacity(self.entities.len());
        for (index, entity) in self.entities.iter().enumerate() {
            let mut names: Vec<String> = Vec::new();
            let sources = [entity.id.as_str(), entity.name.as_str()]
                .into_iter()
                .chain(entity.alt.iter().map(String::as_str));
            for source in sources {
                let key = normalize(source);
                if key.is_empty() {
                    continue;
                }
                if !names.contains(&key) {
                    names.push(key.clone());
                }
                claim(&key, index);
            }
            alt.push(names);
        }

        self.hard = hard;
        self.alt = alt;
    }

    /// Section label of this pool.
    #[must_use]
    pub fn section(&self) -> &str {
        &self.section
    }

    /// Number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if the pool holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterates entities in pool order.
    pub fn entities(&self) -> impl Iterator<Item = &Arc<Entity>> {
        self.entities.iter()
    }

    /// Looks up an entity by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Arc<Entity>> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    /// Picks one entity uniformly at random.
    pub fn random_pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Arc<Entity>> {
        if self.entities.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.entities.len());
        self.entities.get(index).cloned()
    }

    /// Searches with the thread-local random source.
    #[must_use]
    pub fn search(&self, text: &str, ctx: Option<&SearchContext>) -> SearchResult {
        self.search_with_rng(text, ctx, &mut rand::thread_rng())
    }

    /// Searches for `text`.
    ///
    /// 1. `random...` (or exactly `rand`) picks one entity, unless the
    ///    context forbids it, in which case nothing matches
    /// 2. an exact `hard` key returns that entity
    /// 3. otherwise every entity with a soft alias containing the query
    ///
    /// A query whose last word ends in one or two glued digits (`lucy2`)
    /// and matches nothing is retried once without them. A separate number
    /// word (`marth 40`) is never dropped this way.
    pub fn search_with_rng<R: Rng + ?Sized>(
        &self,
        text: &str,
        ctx: Option<&SearchContext>,
        rng: &mut R,
    ) -> SearchResult {
        let query = match ctx {
            Some(ctx) => ctx.resolve(text),
            None => normalize(text),
        };

        if is_random_request(&query) {
            if ctx.is_some_and(|ctx| !ctx.allow_random()) {
                trace!(query = %query, "random pick refused");
                return SearchResult::empty(self.section.clone(), text);
            }
            let finds = self.random_pick(rng).into_iter().collect();
            return SearchResult::new(finds, self.section.clone(), text);
        }

        let mut finds = self.find(&query);
        let glued = text.split_whitespace().last().is_some_and(|word| !is_level_run(word));
        if finds.is_empty() && glued {
            if let Some(stem) = digit_stem(&query) {
                finds = self.find(stem);
            }
        }

        trace!(section = %self.section, query = %query, finds = finds.len(), "pool search");
        SearchResult::new(finds, self.section.clone(), text)
    }

    fn find(&self, query: &str) -> Vec<Arc<Entity>> {
        if query.is_empty() {
            return Vec::new();
        }
        if let Some(&index) = self.hard.get(query) {
            return vec![Arc::clone(&self.entities[index])];
        }
        self.alt
            .iter()
            .enumerate()
            .filter(|(_, names)| names.iter().any(|name| name.contains(query)))
            .map(|(index, _)| Arc::clone(&self.entities[index]))
            .collect()
    }

    /// Incremental longest-phrase search with the thread-local random source.
    #[must_use]
    pub fn search_list(&self, words: &[String], ctx: Option<&SearchContext>) -> ListSearchResult {
        self.search_list_with_rng(words, ctx, &mut rand::thread_rng())
    }

    /// Grows a phrase word by word, keeping the longest phrase whose match
    /// count does not exceed the best accepted so far.
    ///
    /// A bare level word (`40`, `5/5`) joins the phrase only if it changes
    /// the accepted match; otherwise it ends the phrase. Once the accepted
    /// match is unambiguous, a word starting with a flag prefix ends it too. Words after the accepted phrase are returned
    /// in `invalid_word`.
    pub fn search_list_with_rng<R: Rng + ?Sized>(
        &self,
        words: &[String],
        ctx: Option<&SearchContext>,
        rng: &mut R,
    ) -> ListSearchResult {
        let mut best: Option<SearchResult> = None;
        let mut phrase = String::new();
        let mut found = String::new();
        let mut consumed = 0;

        for (index, word) in words.iter().enumerate() {
            let unambiguous = best.as_ref().is_some_and(|b| b.len() == 1);
            if unambiguous && word.starts_with(FLAG_PREFIXES) {
                break;
            }

            if !phrase.is_empty() {
                phrase.push(' ');
            }
            phrase.push_str(word);

            let search = self.search_with_rng(&phrase, ctx, rng);
            if is_level_run(word) {
                let changes = |b: &SearchResult| search.has_results() && search.len() <= b.len() && search.finds != b.finds;
                if best.as_ref().is_some_and(|b| !changes(b)) {
                    break;
                }
            }
            if !search.has_results() {
                continue;
            }
            if best.as_ref().is_none_or(|b| search.len() <= b.len()) {
                best = Some(search);
                found.clone_from(&phrase);
                consumed = index + 1;
            }
        }

        ListSearchResult {
            search: best,
            text: found,
            words: words[..consumed].to_vec(),
            invalid_word: words[consumed..].to_vec(),
        }
    }
}

fn is_random_request(query: &str) -> bool {
    query.starts_with(RANDOM_KEYWORD) || query == RANDOM_SHORT
}

/// `query` without a one- or two-digit suffix, if it has one.
fn digit_stem(query: &str) -> Option<&str> {
    let stem = query.trim_end_matches(|ch: char| ch.is_ascii_digit());
    let digits = query.len() - stem.len();
    ((1..=2).contains(&digits) && !stem.is_empty()).then_some(stem)
}
