//! Integration tests for the check variants

use codex_parser::check::{LevelCheck, ListCheck, StatsCheck};
use codex_parser::{Check, ChoiceSource, InputValue, OptionUpdate, OptionValue, StatOp};
use codex_pool::SearchContext;
use proptest::prelude::*;

fn stats() -> StatsCheck {
    StatsCheck::new(["hp", "str", "mag", "skl", "spd", "lck", "def", "res"])
}

// =============================================================================
// Numeric-Delta Sets
// =============================================================================

#[test]
fn stat_amounts_clamp_symmetrically() {
    let up = stats().parse("str+150", None).unwrap();
    let down = stats().parse("str-150", None).unwrap();
    assert_eq!(up.amount, 99);
    assert_eq!(down.amount, -99);
    assert_eq!(up.op, StatOp::Add);
}

#[test]
fn marker_is_the_operator() {
    let token = stats().parse("def3", Some('-')).unwrap();
    assert_eq!((token.attribute.as_str(), token.amount), ("def", -3));
    assert!(stats().parse("def3", None).is_none());
    assert!(stats().parse("luck3", Some('+')).is_none());
}

#[test]
fn equal_goes_to_its_own_bucket() {
    let token = stats().parse("hp=40", None).unwrap();
    assert_eq!(token.op, StatOp::Equal);
    assert_eq!(token.amount, 40);
}

#[test]
fn spectrum_expands_to_every_known_stat() {
    let token = stats().parse("spec+2", None).unwrap();
    let updates = stats().updates("stats", &token);
    let attributes: Vec<_> = updates
        .iter()
        .map(|update| match update {
            OptionUpdate::Stat { attribute, .. } => attribute.as_str(),
            _ => "",
        })
        .collect();
    assert_eq!(attributes, vec!["str", "mag", "skl", "lck", "spd", "def", "res"]);
}

// =============================================================================
// Sequences and Lists
// =============================================================================

#[test]
fn level_sequence_truncates() {
    let level = LevelCheck::new(vec![20, 20, 20]);
    assert_eq!(level.parse("5/5/5/5"), vec![5, 5, 5]);
    assert_eq!(level.parse("1/5/10"), vec![1, 5, 10]);
    assert_eq!(level.parse("0/99"), vec![1, 20]);
}

#[test]
fn list_deduplicates_in_first_seen_order() {
    let list = ListCheck::new(["a", "b", "c"]);
    assert_eq!(list.parse("a,b,a,c"), vec!["a", "b", "c"]);
    assert_eq!(list.parse("z, B"), vec!["b"]);
}

// =============================================================================
// Structured Extraction
// =============================================================================

#[test]
fn int_rejects_text_in_structured_input() {
    let check = Check::int("merges", 0, 10);
    let err = check
        .extract_from_structured(InputValue::Text("many".into()), &SearchContext::new())
        .unwrap_err();
    assert!(err.to_string().contains("merges"));

    let updates = check
        .extract_from_structured(InputValue::Int(-4), &SearchContext::new())
        .unwrap();
    assert_eq!(updates, vec![OptionUpdate::Set("merges".into(), OptionValue::Int(0))]);
}

#[test]
fn choice_accepts_labels_and_values() {
    let check = Check::choice("difficulty", [("Lunatic", "lunatic"), ("Hard", "hard")]);
    let ctx = SearchContext::new();
    for input in ["Lunatic", "lunatic", "LUNATIC"] {
        let updates = check.extract_from_structured(input.into(), &ctx).unwrap();
        assert_eq!(updates.len(), 1);
    }
    assert!(check.extract_from_structured("normal".into(), &ctx).is_err());
}

#[test]
fn choice_source_accepts_names_and_tables() {
    let named: ChoiceSource = serde_json::from_str("\"modes\"").unwrap();
    assert_eq!(named, ChoiceSource::Table("modes".into()));
    let inline: ChoiceSource = serde_json::from_str("{\"Hard\": \"hard\"}").unwrap();
    assert!(matches!(inline, ChoiceSource::Inline(table) if table["Hard"] == "hard"));
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn stat_magnitude_never_exceeds_limit(amount in 0i64..100_000) {
        let up = stats().parse(&format!("spd+{amount}"), None).unwrap();
        let down = stats().parse(&format!("spd-{amount}"), None).unwrap();
        prop_assert_eq!(up.amount, amount.min(99));
        prop_assert_eq!(down.amount, -amount.min(99));
    }

    #[test]
    fn level_never_exceeds_positions(values in prop::collection::vec(-50i64..200, 0..8)) {
        let level = LevelCheck::new(vec![20, 40, 60]);
        let text = values.iter().map(ToString::to_string).collect::<Vec<_>>().join("/");
        let parsed = level.parse(&text);
        prop_assert!(parsed.len() <= 3);
        prop_assert_eq!(parsed.len(), values.len().min(3));
        for (value, max) in parsed.iter().zip([20, 40, 60]) {
            prop_assert!((1..=max).contains(value));
        }
    }

    #[test]
    fn list_output_is_unique_and_allowed(picks in prop::collection::vec(prop::sample::select(vec!["a", "b", "c", "x"]), 0..10)) {
        let list = ListCheck::new(["a", "b", "c"]);
        let parsed = list.parse(&picks.join(","));

        let mut expected: Vec<String> = Vec::new();
        for pick in &picks {
            if *pick != "x" && !expected.iter().any(|seen| seen == pick) {
                expected.push((*pick).to_string());
            }
        }
        prop_assert_eq!(parsed, expected);
    }
}
