//! Integration tests for Layer 0: Foundation
//!
//! Tests for errors and text normalization.

mod errors;
mod text;
