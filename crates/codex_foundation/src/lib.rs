//! Core errors and text normalization for Codex.
//!
//! This crate provides:
//! - [`Error`] - Rich error types with context
//! - [`normalize`] / [`Normalize`] - Canonical comparison keys for catalog text
//! - [`tokenize`] - Word splitting for free-text queries

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod text;

pub use error::{Error, ErrorContext, ErrorKind, Result};
pub use text::{Normalize, is_level_run, normalize, split_list, tokenize};
