//! Integration tests for already keyed input

use std::collections::BTreeMap;

use codex_foundation::ErrorKind;
use codex_parser::{Command, InputValue, OptionValue, PickSlot, load_modules};
use codex_pool::{EntityRecord, JsonCatalog, PoolRegistry, SearchContext};

const ARENA: &str = r#"[{
    "name": "feh",
    "commands": {
        "hero": {
            "main": "heroes",
            "entry": { "weapon": "weapons", "skill": "skills" },
            "int": { "merges": [0, 10] },
            "list": { "tags": ["armor", "flier", "cavalry"] },
            "multiple": ["weapon"],
            "comma": { "name": "compare", "size": 3 },
            "par": { "merges": ["merge", "m"] }
        },
        "banner": {
            "main": "banners",
            "bool": { "rerun": [] },
            "required": ["rerun"]
        }
    }
}]"#;

fn commands() -> Vec<Command> {
    let catalog = JsonCatalog::new()
        .with_section(
            "heroes",
            vec![
                EntityRecord::new("anna", "Anna"),
                EntityRecord::new("selena", "Selena"),
                EntityRecord::new("marth", "Marth"),
                EntityRecord::new("marth_legendary", "Legendary Marth"),
            ],
        )
        .with_section(
            "weapons",
            vec![
                EntityRecord::new("falchion", "Falchion"),
                EntityRecord::new("killing_edge", "Killing Edge"),
            ],
        )
        .with_section("skills", vec![EntityRecord::new("galeforce", "Galeforce")])
        .with_section("banners", vec![EntityRecord::new("heroic_grails", "Heroic Grails")]);
    let registry = PoolRegistry::load(&catalog).unwrap();
    let module = load_modules(ARENA, &registry).unwrap().remove(0);
    module.commands().cloned().collect()
}

fn hero() -> Command {
    commands().into_iter().find(|command| command.name() == "hero").unwrap()
}

fn banner() -> Command {
    commands().into_iter().find(|command| command.name() == "banner").unwrap()
}

fn input(pairs: &[(&str, InputValue)]) -> BTreeMap<String, InputValue> {
    pairs.iter().map(|(key, value)| ((*key).to_string(), value.clone())).collect()
}

// =============================================================================
// Coercion
// =============================================================================

#[test]
fn values_reach_their_checks() {
    let parsed = hero()
        .parse_structured(
            input(&[
                ("name", "anna".into()),
                ("Skill", "galeforce".into()),
                ("m", InputValue::Int(40)),
                ("tags", "Flier, armor, wyvern".into()),
            ]),
            &SearchContext::new(),
            true,
        )
        .unwrap();

    assert_eq!(parsed.options["name"], OptionValue::Entity("anna".into()));
    assert_eq!(parsed.options["skill"], OptionValue::Entity("galeforce".into()));
    assert_eq!(parsed.options["merges"], OptionValue::Int(10));
    assert_eq!(
        parsed.options["tags"],
        OptionValue::List(vec![OptionValue::Text("flier".into()), OptionValue::Text("armor".into())])
    );
    assert!(!parsed.needs_picks());
}

#[test]
fn unknown_keys_pass_through() {
    let parsed = hero()
        .parse_structured(
            input(&[("name", "anna".into()), ("note", "bring snacks".into())]),
            &SearchContext::new(),
            false,
        )
        .unwrap();
    assert_eq!(parsed.options["note"], OptionValue::Text("bring snacks".into()));
}

#[test]
fn multiple_key_splits_on_commas() {
    let parsed = hero()
        .parse_structured(
            input(&[("name", "anna".into()), ("weapon", "falchion, killing edge".into())]),
            &SearchContext::new(),
            false,
        )
        .unwrap();
    assert_eq!(
        parsed.options["weapon"],
        OptionValue::List(vec![
            OptionValue::Entity("falchion".into()),
            OptionValue::Entity("killing_edge".into()),
        ])
    );
}

// =============================================================================
// Malformed Values
// =============================================================================

#[test]
fn strict_mode_rejects_malformed_value() {
    let err = hero()
        .parse_structured(
            input(&[("name", "anna".into()), ("merges", "many".into())]),
            &SearchContext::new(),
            true,
        )
        .unwrap_err();

    assert!(matches!(&err.kind, ErrorKind::MalformedParameter { key, .. } if key == "merges"));
    let context = err.context.as_ref().unwrap();
    assert_eq!(context.command.as_deref(), Some("hero"));
    assert!(context.options.iter().any(|(key, value)| key == "merges" && value == "many"));
}

#[test]
fn lenient_mode_drops_malformed_value() {
    let parsed = hero()
        .parse_structured(
            input(&[("name", "anna".into()), ("merges", "many".into())]),
            &SearchContext::new(),
            false,
        )
        .unwrap();
    assert!(!parsed.options.contains_key("merges"));
    assert_eq!(parsed.options["name"], OptionValue::Entity("anna".into()));
}

#[test]
fn missing_name_is_malformed() {
    let err = hero()
        .parse_structured(input(&[("merges", InputValue::Int(3))]), &SearchContext::new(), false)
        .unwrap_err();
    assert!(matches!(&err.kind, ErrorKind::MalformedParameter { key, .. } if key == "name"));
}

#[test]
fn missing_required_key_is_malformed() {
    let err = banner()
        .parse_structured(input(&[("name", "heroic grails".into())]), &SearchContext::new(), false)
        .unwrap_err();
    assert!(matches!(&err.kind, ErrorKind::MalformedParameter { key, .. } if key == "rerun"));

    let parsed = banner()
        .parse_structured(
            input(&[("name", "heroic grails".into()), ("rerun", InputValue::Bool(true))]),
            &SearchContext::new(),
            false,
        )
        .unwrap();
    assert_eq!(parsed.options["rerun"], OptionValue::Bool(true));
}

#[test]
fn unknown_entity_is_not_found() {
    let err = hero()
        .parse_structured(input(&[("name", "ragnell".into())]), &SearchContext::new(), false)
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NotFound { .. }));
}

// =============================================================================
// Comparison and Picks
// =============================================================================

#[test]
fn comparison_entries_are_searched() {
    let parsed = hero()
        .parse_structured(
            input(&[("name", "anna".into()), ("compare", "selena, legendary marth, anna".into())]),
            &SearchContext::new(),
            false,
        )
        .unwrap();

    let OptionValue::List(entries) = &parsed.options["compare"] else {
        panic!("expected a list");
    };
    assert_eq!(entries.len(), 2);
    let OptionValue::Options(first) = &entries[0] else {
        panic!("expected an option map");
    };
    assert_eq!(first["name"], OptionValue::Entity("selena".into()));
}

#[test]
fn ambiguous_name_becomes_a_pick() {
    let parsed = hero()
        .parse_structured(input(&[("name", "mar".into())]), &SearchContext::new(), false)
        .unwrap();

    assert!(parsed.needs_picks());
    assert_eq!(parsed.picks.len(), 1);
    assert_eq!(parsed.picks[0].slot, PickSlot::top("name"));
    assert_eq!(parsed.picks[0].search.len(), 2);
}

#[test]
fn ambiguous_comparison_entry_records_its_parent() {
    let parsed = hero()
        .parse_structured(
            input(&[("name", "anna".into()), ("compare", InputValue::List(vec!["mar".into()]))]),
            &SearchContext::new(),
            false,
        )
        .unwrap();

    assert_eq!(parsed.picks.len(), 1);
    assert_eq!(parsed.picks[0].slot.parent, Some(("compare".to_string(), 0)));
}
