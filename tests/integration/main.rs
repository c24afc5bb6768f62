//! Cross-layer integration tests for Codex
//!
//! Tests that verify correct interaction between multiple crates.

mod runtime;
mod scenarios;
