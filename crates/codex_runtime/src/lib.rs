//! Configuration, alias persistence, REPL, and CLI for Codex.
//!
//! This crate provides:
//! - [`EngineConfig`] / [`RuntimeConfig`] - Engine knobs and process arguments
//! - [`AliasStore`] - Per-scope alias books persisted as `MessagePack`
//! - [`Session`] - Loaded modules plus meta commands
//! - [`Repl`] - Interactive loop with a numbered disambiguation prompt

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod editor;
pub mod repl;
pub mod session;
pub mod store;

pub use config::{EngineConfig, RuntimeConfig, parse_args};
pub use editor::{LineEditor, ReadResult, RustylineEditor};
pub use repl::{PromptPicker, Repl};
pub use session::{META_COMMANDS, Outcome, Session};
pub use store::AliasStore;
