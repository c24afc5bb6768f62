//! Codex - entity resolution and parameter extraction for catalog queries
//!
//! This crate re-exports all layers of the Codex system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: codex_runtime     - Config, alias store, REPL, CLI
//! Layer 2: codex_parser      - Checks, command orchestration, pick protocol
//! Layer 1: codex_pool        - Entities, pools, search, alias resolution
//! Layer 0: codex_foundation  - Errors, text normalization, tokenization
//! ```

pub use codex_foundation as foundation;
pub use codex_parser as parser;
pub use codex_pool as pool;
pub use codex_runtime as runtime;
