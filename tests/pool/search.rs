//! Integration tests for pool search

use codex_foundation::tokenize;
use codex_pool::{EntityRecord, Pool, SearchContext};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn units() -> Pool {
    Pool::build(
        "units",
        [
            EntityRecord::new("selena", "Selena").with_alt("Severa"),
            EntityRecord::new("anna", "Anna"),
            EntityRecord::new("marth", "Marth"),
            EntityRecord::new("marth_legendary", "Marth (Legendary)").with_alt("Legendary Marth"),
            EntityRecord::new("lucina", "Lucina").with_hard("Marth (Masked)"),
        ],
        None,
    )
}

fn ids(pool: &Pool, query: &str) -> Vec<String> {
    pool.search(query, None)
        .finds
        .iter()
        .map(|entity| entity.id.clone())
        .collect()
}

// =============================================================================
// Single Search
// =============================================================================

#[test]
fn canonical_name_is_exact() {
    assert_eq!(ids(&units(), "Marth"), vec!["marth"]);
    assert_eq!(ids(&units(), "marth (legendary)"), vec!["marth_legendary"]);
}

#[test]
fn hard_alias_is_exact() {
    assert_eq!(ids(&units(), "Masked Marth"), Vec::<String>::new());
    assert_eq!(ids(&units(), "Marth (Masked)"), vec!["lucina"]);
    assert_eq!(ids(&units(), "marth masked"), vec!["lucina"]);
}

#[test]
fn soft_alias_matches_substrings() {
    assert_eq!(ids(&units(), "severa"), vec!["selena"]);
    assert_eq!(ids(&units(), "legend"), vec!["marth_legendary"]);
    assert_eq!(ids(&units(), "mart").len(), 2);
}

#[test]
fn empty_query_matches_nothing() {
    assert!(ids(&units(), "").is_empty());
    assert!(ids(&units(), "()").is_empty());
}

#[test]
fn digit_suffix_is_retried_without_digits() {
    assert_eq!(ids(&units(), "anna2"), vec!["anna"]);
    assert!(ids(&units(), "anna123").is_empty());
}

// =============================================================================
// Random Picks
// =============================================================================

#[test]
fn rand_picks_exactly_one() {
    let pool = units();
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let result = pool.search_with_rng("rand", None, &mut rng);
    assert_eq!(result.len(), 1);
    assert!(pool.get(&result.finds[0].id).is_some());
}

#[test]
fn random_is_refused_when_disabled() {
    let pool = units();
    let ctx = SearchContext::new().with_random(false);
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    assert!(!pool.search_with_rng("random", Some(&ctx), &mut rng).has_results());
    assert!(!pool.search_with_rng("rand", Some(&ctx), &mut rng).has_results());
}

#[test]
fn random_picks_are_reproducible_with_a_seed() {
    let pool = units();
    let first = pool.search_with_rng("random", None, &mut ChaCha8Rng::seed_from_u64(3));
    let second = pool.search_with_rng("random", None, &mut ChaCha8Rng::seed_from_u64(3));
    assert_eq!(first, second);
}

// =============================================================================
// Phrase Search
// =============================================================================

#[test]
fn phrase_stops_at_flag_once_unambiguous() {
    let result = units().search_list(&tokenize("legendary marth +str5 falchion"), None);
    let search = result.search.unwrap();
    assert_eq!(search.result_id(), Some("marth_legendary"));
    assert_eq!(result.words, vec!["legendary", "marth"]);
    assert_eq!(result.invalid_word, vec!["+str5", "falchion"]);
}

#[test]
fn phrase_keeps_longest_narrowing_prefix() {
    let result = units().search_list(&tokenize("marth legendary"), None);
    assert_eq!(result.search.unwrap().result_id(), Some("marth_legendary"));
    assert!(result.invalid_word.is_empty());
}

#[test]
fn phrase_without_match() {
    let result = units().search_list(&tokenize("ragnell sword"), None);
    assert!(!result.is_found());
    assert_eq!(result.invalid_word.len(), 2);
}

// =============================================================================
// Properties
// =============================================================================

fn pool_of(names: &[String]) -> Pool {
    Pool::build(
        "generated",
        names
            .iter()
            .enumerate()
            .map(|(index, name)| EntityRecord::new(format!("e{index}"), name.clone())),
        None,
    )
}

fn unique_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[a-z]{3,10}", 1..12).prop_map(|names| {
        names
            .into_iter()
            .filter(|name| !name.starts_with("rand"))
            .collect()
    })
}

proptest! {
    #[test]
    fn canonical_name_search_is_exact(names in unique_names()) {
        let pool = pool_of(&names);
        for (index, name) in names.iter().enumerate() {
            let result = pool.search(name, None);
            prop_assert_eq!(result.len(), 1);
            let expected_id = format!("e{index}");
            prop_assert_eq!(result.result_id(), Some(expected_id.as_str()));
        }
    }

    #[test]
    fn extending_a_unique_phrase_never_widens_it(
        names in unique_names(),
        words in prop::collection::vec("[a-z]{1,4}", 1..5),
        extra in "[a-z+-]{1,5}",
    ) {
        prop_assume!(!extra.starts_with("rand"));
        prop_assume!(words.iter().all(|word| !word.starts_with("rand")));

        let pool = pool_of(&names);
        let before = pool.search_list(&words, None);
        if let Some(before) = before.search.filter(|search| search.len() == 1) {
            let mut longer = words.clone();
            longer.push(extra);
            let after = pool.search_list(&longer, None);
            let after = after.search.map_or(0, |search| search.len());
            prop_assert!(after <= before.len());
        }
    }
}
