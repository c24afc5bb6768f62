//! End-to-end requests from free text to final option maps

use codex_foundation::ErrorKind;
use codex_parser::{Module, OptionMap, OptionValue, Route, load_modules};
use codex_pool::{AliasScope, EntityRecord, JsonCatalog, PoolRegistry, SearchContext};
use codex_runtime::AliasStore;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const FE3: &str = r#"[{
    "name": "fe3",
    "commands": {
        "unit": {
            "main": "units",
            "stats": { "stats": ["str", "def", "spd"] },
            "level": [20, 20, 20],
            "comma": { "name": "compare", "size": 2 }
        }
    }
}]"#;

fn registry() -> PoolRegistry {
    let catalog = JsonCatalog::new().with_section(
        "units",
        vec![
            EntityRecord::new("marth", "Marth"),
            EntityRecord::new("anna", "Anna"),
            EntityRecord::new("selena", "Selena"),
            EntityRecord::new("lucina", "Lucina"),
        ],
    );
    PoolRegistry::load(&catalog).unwrap()
}

fn module() -> Module {
    load_modules(FE3, &registry()).unwrap().remove(0)
}

fn options(module: &Module, text: &str, ctx: &SearchContext) -> OptionMap {
    match module.route(text, ctx).unwrap() {
        Route::Parsed { parsed, .. } => {
            assert!(!parsed.needs_picks(), "unexpected pick for {text:?}");
            parsed.options
        }
        Route::Pick(pick) => panic!("unexpected routing pick for {:?}", pick.text),
    }
}

#[test]
fn stat_deltas_follow_the_name() {
    let options = options(&module(), "marth +str5 -def3", &SearchContext::new());

    assert_eq!(options["name"], OptionValue::Entity("marth".into()));
    let OptionValue::Stats(stats) = &options["stats"] else {
        panic!("expected stat deltas");
    };
    assert_eq!(stats.add.len(), 2);
    assert_eq!(stats.add["str"], 5);
    assert_eq!(stats.add["def"], -3);
    assert!(stats.equal.is_empty());
}

#[test]
fn comma_list_compares_entities_in_order() {
    let options = options(&module(), "selena, anna", &SearchContext::new());

    assert_eq!(options["name"], OptionValue::Entity("selena".into()));
    let OptionValue::List(entries) = &options["compare"] else {
        panic!("expected a comparison list");
    };
    assert_eq!(entries.len(), 1);
    let OptionValue::Options(entry) = &entries[0] else {
        panic!("expected an option map");
    };
    assert_eq!(entry["name"], OptionValue::Entity("anna".into()));
}

#[test]
fn rand_picks_exactly_one_entity() {
    let registry = registry();
    let units = registry.require("units").unwrap();
    let ctx = SearchContext::new();

    for seed in 0..16 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let search = units.search_with_rng("rand", Some(&ctx), &mut rng);
        assert_eq!(search.len(), 1);
        let id = search.result_id().unwrap();
        assert!(units.get(id).is_some());
    }
}

#[test]
fn rand_is_repeatable_for_a_seed() {
    let registry = registry();
    let units = registry.require("units").unwrap();
    let pick = |seed| {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        units
            .search_with_rng("random", None, &mut rng)
            .result_id()
            .map(str::to_string)
    };
    assert_eq!(pick(42), pick(42));
}

#[test]
fn refused_random_finds_nothing() {
    let ctx = SearchContext::new().with_random(false);
    let err = module().route("rand", &ctx).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NotFound { .. }));
}

#[test]
fn level_run_fills_every_position() {
    let options = options(&module(), "anna lvl 1/5/10", &SearchContext::new());

    assert_eq!(options["name"], OptionValue::Entity("anna".into()));
    assert_eq!(
        options["level"],
        OptionValue::List(vec![OptionValue::Int(1), OptionValue::Int(5), OptionValue::Int(10)])
    );
}

#[test]
fn user_alias_tolerates_digit_suffix() {
    let store = AliasStore::in_memory();
    let user = AliasScope::User("ike".into());
    store.add(&user, "lucina", "lucy").unwrap();

    let ctx = SearchContext::from_source(&store, Some(&user), None).unwrap();
    let options = options(&module(), "lucy2", &ctx);
    assert_eq!(options["name"], OptionValue::Entity("lucina".into()));
}

#[test]
fn alias_of_another_user_does_not_apply() {
    let store = AliasStore::in_memory();
    store.add(&AliasScope::User("ike".into()), "lucina", "lucy").unwrap();

    let ctx = SearchContext::from_source(&store, Some(&AliasScope::User("soren".into())), None).unwrap();
    assert!(module().route("lucy", &ctx).is_err());
}
