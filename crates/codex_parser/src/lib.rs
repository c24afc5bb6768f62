//! Parameter checks and command orchestration for Codex.
//!
//! This crate turns a line of free text (or an already-keyed option set)
//! into the canonical option map a command runs against.
//!
//! # Architecture
//!
//! ```text
//! "marth +str5 -weapon falchion lvl 1/5/10"
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ MODULE ROUTING  │  → command `unit` (first word, or section of the match)
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ PHRASE SEARCH   │  → name: marth     rest: [+str5, -weapon, falchion, lvl, 1/5/10]
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ TOKENIZER       │  → +str5   -weapon "falchion"   unmatched: [lvl, 1/5/10]
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ CHECKS          │  → OptionUpdates, merged in order
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ FINALIZE        │  → entity ids, or PendingPicks for ambiguous searches
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ RESOLUTION      │  → picks applied, or the request abandoned
//! └─────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`value`] - Option values and the updates checks produce
//! - [`params`] - Free-text parameter tokenizer
//! - [`check`] - The `Check` sum type and its seven variants
//! - [`command`] - Command definitions and registration checks
//! - [`parser`] - Free-text and structured entry paths
//! - [`resolution`] - Two-phase picking and the resolution state machine
//! - [`module`] - Routing free text to a command
//! - [`help`] - Option declarations and help pages
//! - [`stdlib`] - Standard key aliases

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod check;
pub mod command;
pub mod help;
pub mod module;
pub mod params;
pub mod parser;
pub mod resolution;
pub mod stdlib;
pub mod value;

pub use check::{Check, CheckKind};
pub use command::{
    ChoiceSource, ChoiceTables, Command, CommandBuilder, CommandSpec, Comparison, KeyList, LEVEL_KEY,
    LevelSpec, NAME_KEY,
};
pub use help::{ChoiceDescriptor, HelpField, HelpPage, HelpProvider, HelpText, OptionDescriptor, OptionKind};
pub use module::{Module, ModuleSpec, Route, RoutePick, load_modules};
pub use params::{ParameterTokenizer, ParameterValue, Tokenized};
pub use parser::Parsed;
pub use resolution::{
    DEFAULT_PICK_CAP, Disambiguator, PendingPick, PickRequest, PickResponse, PickSlot, Resolution, apply_picks,
    resolve,
};
pub use stdlib::{KeyAliases, STANDARD_KEY_ALIASES};
pub use value::{InputValue, OptionMap, OptionUpdate, OptionValue, StatDeltas, StatOp, apply_updates};
