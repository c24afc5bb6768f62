//! Integration tests for Error types
//!
//! Tests error construction, display, context, and fatality.

use codex_foundation::{Error, ErrorContext, ErrorKind};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_not_found_names_key_and_query() {
    let err = Error::not_found("weapon", "ragnel");
    assert!(matches!(err.kind, ErrorKind::NotFound { .. }));
    let msg = format!("{err}");
    assert!(msg.contains("weapon"));
    assert!(msg.contains("ragnel"));
}

#[test]
fn error_malformed_names_key() {
    let err = Error::malformed("merges", "expected an integer");
    assert!(matches!(err.kind, ErrorKind::MalformedParameter { ref key, .. } if key == "merges"));
    assert!(format!("{err}").contains("expected an integer"));
}

#[test]
fn error_alias_limits() {
    let err = Error::new(ErrorKind::AliasLimit { limit: 30 });
    assert!(format!("{err}").contains("30"));

    let err = Error::new(ErrorKind::InvalidAlias { min: 3, max: 30 });
    let msg = format!("{err}");
    assert!(msg.contains('3'));
    assert!(msg.contains("30"));
}

// =============================================================================
// Fatality
// =============================================================================

#[test]
fn only_configuration_is_fatal() {
    assert!(Error::configuration("shared primary section").is_fatal());
    assert!(!Error::not_found("name", "x").is_fatal());
    assert!(!Error::malformed("level", "x").is_fatal());
    assert!(!Error::abandoned().is_fatal());
    assert!(!Error::internal("x").is_fatal());
}

// =============================================================================
// Context
// =============================================================================

#[test]
fn context_is_attached() {
    let err = Error::malformed("level", "not a number").with_context(
        ErrorContext::new()
            .with_command("unit")
            .with_scope("fe13")
            .with_option("name", "lucina"),
    );
    let context = err.context.as_ref().unwrap();
    assert_eq!(context.command.as_deref(), Some("unit"));
    let shown = context.to_string();
    assert!(shown.contains("in fe13 unit"));
    assert!(shown.contains("name: lucina"));
}

#[test]
fn empty_context_displays_nothing() {
    assert_eq!(ErrorContext::new().to_string(), "");
}
