//! Integration tests for Layer 1: Pool
//!
//! Tests for entity search, alias substitution, and catalog loading.

mod aliases;
mod catalog;
mod search;
