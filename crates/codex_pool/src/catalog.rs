//! Catalog providers and startup pool construction.
//!
//! Pools are built once, explicitly, before any request is served. Commands
//! receive `Arc<Pool>` handles from the [`PoolRegistry`]; there is no lazily
//! populated global cache.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use codex_foundation::{Error, ErrorKind, Result};
use serde::Deserialize;
use tracing::debug;

use crate::entity::EntityRecord;
use crate::pool::Pool;

/// Extra soft aliases keyed by normalized canonical name.
pub type Lexicon = HashMap<String, Vec<String>>;

/// A read-only source of entity records.
pub trait CatalogProvider {
    /// All section keys this provider can load.
    fn sections(&self) -> Vec<String>;

    /// Records of one section, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns an error if the section does not exist or cannot be read.
    fn records(&self, section: &str) -> Result<Vec<EntityRecord>>;

    /// Optional lexicon merged into every section.
    fn lexicon(&self) -> Option<&Lexicon> {
        None
    }
}

/// A catalog held in memory, usually parsed from JSON.
///
/// ```json
/// {
///   "sections": { "fe3/units": [ { "id": "marth", "name": "Marth" } ] },
///   "lexicon": { "marth": ["mars"] }
/// }
/// ```
#[derive(Clone, Debug, Default, Deserialize)]
pub struct JsonCatalog {
    #[serde(default)]
    sections: BTreeMap<String, Vec<EntityRecord>>,
    #[serde(default)]
    lexicon: Option<Lexicon>,
}

impl JsonCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a section.
    #[must_use]
    pub fn with_section(mut self, section: impl Into<String>, records: Vec<EntityRecord>) -> Self {
        self.sections.insert(section.into(), records);
        self
    }

    /// Sets the lexicon.
    #[must_use]
    pub fn with_lexicon(mut self, lexicon: Lexicon) -> Self {
        let lexicon = lexicon
            .into_iter()
            .map(|(key, value)| (codex_foundation::normalize(&key), value))
            .collect();
        self.lexicon = Some(lexicon);
        self
    }

    /// Parses a catalog from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a catalog.
    pub fn from_json(text: &str) -> Result<Self> {
        let catalog: Self = serde_json::from_str(text)
            .map_err(|e| Error::new(ErrorKind::Serialization(e.to_string())))?;
        Ok(match catalog.lexicon.clone() {
            Some(lexicon) => catalog.with_lexicon(lexicon),
            None => catalog,
        })
    }

    /// Reads a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::new(ErrorKind::Io(format!(
                "failed to read catalog '{}': {e}",
                path.as_ref().display()
            )))
        })?;
        Self::from_json(&text)
    }
}

impl CatalogProvider for JsonCatalog {
    fn sections(&self) -> Vec<String> {
        self.sections.keys().cloned().collect()
    }

    fn records(&self, section: &str) -> Result<Vec<EntityRecord>> {
        self.sections
            .get(section)
            .cloned()
            .ok_or_else(|| Error::catalog(format!("unknown section '{section}'")))
    }

    fn lexicon(&self) -> Option<&Lexicon> {
        self.lexicon.as_ref()
    }
}

/// Every pool built at startup, keyed by section.
#[derive(Clone, Debug, Default)]
pub struct PoolRegistry {
    pools: BTreeMap<String, Arc<Pool>>,
}

impl PoolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds one pool per section offered by `provider`.
    ///
    /// # Errors
    ///
    /// Returns an error if any section fails to load.
    pub fn load(provider: &dyn CatalogProvider) -> Result<Self> {
        let mut registry = Self::new();
        for section in provider.sections() {
            let records = provider.records(&section)?;
            registry.insert(Pool::build(section, records, provider.lexicon()));
        }
        debug!(pools = registry.pools.len(), "catalog loaded");
        Ok(registry)
    }

    /// Adds a pool under its own section.
    pub fn insert(&mut self, pool: Pool) -> Arc<Pool> {
        let pool = Arc::new(pool);
        self.pools
            .insert(pool.section().to_string(), Arc::clone(&pool));
        pool
    }

    /// The pool for `section`, if loaded.
    #[must_use]
    pub fn get(&self, section: &str) -> Option<Arc<Pool>> {
        self.pools.get(section).cloned()
    }

    /// The pool for `section`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the section was never loaded.
    pub fn require(&self, section: &str) -> Result<Arc<Pool>> {
        self.get(section)
            .ok_or_else(|| Error::configuration(format!("no pool for section '{section}'")))
    }

    /// All loaded section keys.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.pools.keys().map(String::as_str)
    }
}
