//! Integration tests for text normalization and tokenization

use codex_foundation::{Normalize, normalize, split_list, tokenize};
use proptest::prelude::*;

// =============================================================================
// Normalization
// =============================================================================

#[test]
fn normalize_folds_case_punctuation_and_accents() {
    assert_eq!(normalize("Líf (Hero)"), "lifhero");
    assert_eq!(normalize("Lon'qu"), "lonqu");
    assert_eq!(normalize("Naga's Tear"), "nagastear");
    assert_eq!(normalize("Æther"), "aether");
}

#[test]
fn normalize_keeps_trailing_plus() {
    assert_eq!(normalize("Silver Sword+"), "silversword+");
    assert_eq!(normalize("+"), "");
}

#[test]
fn normalize_decodes_percent_escapes() {
    assert_eq!(normalize("Lon%27qu"), "lonqu");
    assert_eq!(normalize("L%C3%ADf"), "lif");
}

#[test]
fn keep_space_preserves_word_breaks() {
    assert_eq!(Normalize::new().keep_space().apply("Killing  Edge"), "killing  edge");
}

// =============================================================================
// Tokenization
// =============================================================================

#[test]
fn tokenize_drops_empty_words() {
    assert_eq!(tokenize(" anna  -hard lvl 1/5 "), vec!["anna", "-hard", "lvl", "1/5"]);
    assert!(tokenize("   ").is_empty());
}

#[test]
fn split_list_trims_pieces() {
    assert_eq!(split_list("a, b,,c ", ','), vec!["a", "b", "c"]);
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn normalize_is_idempotent(text in "\\PC{0,40}") {
        let once = normalize(&text);
        prop_assert_eq!(normalize(&once), once);
    }

    #[test]
    fn normalize_output_has_no_blanks(text in "[A-Za-z '().-]{0,30}") {
        let out = normalize(&text);
        prop_assert!(!out.contains(' '));
        prop_assert!(!out.chars().any(|ch| ch.is_uppercase()));
    }
}
