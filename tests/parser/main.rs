//! Integration tests for Layer 2: Parser
//!
//! Tests for checks, command registration, and the structured entry path.

mod checks;
mod commands;
mod structured;
