//! Integration tests for alias substitution and alias books

use codex_foundation::ErrorKind;
use codex_pool::{AliasBook, AliasRecord, AliasResolver, AliasScope, AliasSource, EntityRecord, Pool, SearchContext};

fn resolver(user: &[(&str, &str)], group: &[(&str, &str)]) -> AliasResolver {
    let records = |pairs: &[(&str, &str)]| {
        pairs
            .iter()
            .map(|(original, alias)| AliasRecord::new(*original, *alias))
            .collect::<Vec<_>>()
    };
    AliasResolver::new(&records(user), &records(group)).unwrap()
}

// =============================================================================
// Substitution
// =============================================================================

#[test]
fn alias_replaces_whole_words_only() {
    let aliases = resolver(&[("lucina", "cat")], &[]);
    assert_eq!(aliases.resolve("category"), "category");
    assert_eq!(aliases.resolve("cat1"), "lucina1");
    assert_eq!(aliases.resolve("cat99"), "lucina99");
    assert_eq!(aliases.resolve("cat123"), "cat123");
    assert_eq!(aliases.resolve("my cat"), "mylucina");
}

#[test]
fn user_aliases_apply_before_group_aliases() {
    let aliases = resolver(&[("lucina", "lucy")], &[("lucia", "lucy")]);
    assert_eq!(aliases.resolve("lucy"), "lucina");
}

#[test]
fn each_alias_replaces_once() {
    let aliases = resolver(&[("anna", "merchant")], &[]);
    assert_eq!(aliases.resolve("merchant merchant"), "annamerchant");
}

#[test]
fn aliased_digit_suffix_resolves_to_entity() {
    let pool = Pool::build("units", [EntityRecord::new("lucina", "Lucina")], None);
    let ctx = SearchContext::new().with_aliases(resolver(&[("lucina", "lucy")], &[]));
    let result = pool.search("lucy2", Some(&ctx));
    assert_eq!(result.result_id(), Some("lucina"));
}

#[test]
fn context_reads_aliases_from_a_source() {
    struct Fixed;

    impl AliasSource for Fixed {
        fn aliases(&self, scope: &AliasScope) -> Vec<AliasRecord> {
            match scope {
                AliasScope::User(_) => vec![AliasRecord::new("Lucina", "lucy")],
                AliasScope::Group(_) => Vec::new(),
            }
        }
    }

    let user = AliasScope::User("ike".into());
    let ctx = SearchContext::from_source(&Fixed, Some(&user), None).unwrap();
    assert_eq!(ctx.resolve("Lucy!"), "lucina");
}

// =============================================================================
// Alias Books
// =============================================================================

#[test]
fn book_strips_banned_characters() {
    let mut book = AliasBook::new();
    let record = book.add("Lon'qu", "\"Lonny\"").unwrap();
    assert_eq!(record.original.display, "Lonqu");
    assert_eq!(record.alias.display, "Lonny");
}

#[test]
fn book_enforces_length_bounds() {
    let mut book = AliasBook::new();
    let err = book.add("Lucina", "lu").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidAlias { min: 3, max: 30 }));
    let err = book.add(&"x".repeat(31), "lucy").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidAlias { .. }));
    assert!(book.is_empty());
}

#[test]
fn book_enforces_record_limit() {
    let mut book = AliasBook::new();
    for n in 0..30 {
        book.add(&format!("original {n}"), &format!("alias {n}")).unwrap();
    }
    let err = book.add("Lucina", "lucy").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::AliasLimit { limit: 30 }));
}

#[test]
fn book_removes_by_position() {
    let mut book = AliasBook::new();
    book.add("Lucina", "lucy").unwrap();
    book.add("Marth", "prince").unwrap();

    let removed = book.remove(0).unwrap();
    assert_eq!(removed.alias.clean, "lucy");
    assert_eq!(book.len(), 1);

    let err = book.remove(5).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidIndex(5)));
}
