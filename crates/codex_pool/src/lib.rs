//! Entity pools and alias-aware search for Codex.
//!
//! # Architecture
//!
//! ```text
//! "lucy2 +str5"
//!       │
//!       ▼
//! ┌─────────────────┐
//! │ ALIAS RESOLVER  │  → "lucina2 +str5"   (user, then scope aliases)
//! └─────────────────┘
//!       │
//!       ▼
//! ┌─────────────────┐
//! │ NORMALIZER      │  → "lucina2"         (per accumulated phrase)
//! └─────────────────┘
//!       │
//!       ▼
//! ┌─────────────────┐
//! │ POOL SEARCH     │  → random │ hard alias │ soft alias substring
//! └─────────────────┘
//!       │
//!       ▼
//!   SearchResult (0, 1 or many entities)
//! ```
//!
//! # Modules
//!
//! - [`entity`] - Entity records and their normalized alias sets
//! - [`pool`] - Indexed entity collections and search
//! - [`search`] - Search result types
//! - [`alias`] - Custom alias substitution and alias list editing
//! - [`context`] - Per-request search context
//! - [`catalog`] - Catalog providers and startup pool construction

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod alias;
pub mod catalog;
pub mod context;
pub mod entity;
pub mod pool;
pub mod search;

pub use alias::{AliasBook, AliasRecord, AliasResolver, AliasScope, AliasSource, AliasText};
pub use catalog::{CatalogProvider, JsonCatalog, Lexicon, PoolRegistry};
pub use context::SearchContext;
pub use entity::{Entity, EntityRecord};
pub use pool::Pool;
pub use search::{ListSearchResult, SearchResult};
