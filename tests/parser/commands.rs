//! Integration tests for command registration and free-text parsing

use codex_parser::{HelpText, OptionKind, OptionValue, Route, load_modules};
use codex_pool::{EntityRecord, JsonCatalog, PoolRegistry, SearchContext};

fn registry() -> PoolRegistry {
    let catalog = JsonCatalog::new()
        .with_section(
            "units",
            vec![
                EntityRecord::new("anna", "Anna"),
                EntityRecord::new("selena", "Selena"),
                EntityRecord::new("marth", "Marth"),
            ],
        )
        .with_section(
            "weapons",
            vec![
                EntityRecord::new("falchion", "Falchion"),
                EntityRecord::new("killing_edge", "Killing Edge"),
            ],
        )
        .with_section("skills", vec![EntityRecord::new("galeforce", "Galeforce")]);
    PoolRegistry::load(&catalog).unwrap()
}

fn modules(json: &str) -> codex_foundation::Result<Vec<codex_parser::Module>> {
    load_modules(json, &registry())
}

const UNIT: &str = r#"[{
    "name": "fe3",
    "tables": { "modes": { "Normal": "normal", "Hard": "hard" } },
    "commands": {
        "unit": {
            "main": "units",
            "entry": { "weapon": "weapons", "skill": "skills" },
            "bool": { "personal": ["base"] },
            "int": { "merges": [0, 10] },
            "choice": { "difficulty": "modes" },
            "stats": { "stats": ["str", "def", "spd"] },
            "level": { "size": 3, "lvl": 20 },
            "add": "weapon",
            "comma": { "name": "compare", "size": 2 },
            "exclamation": "skill",
            "required": ["difficulty"],
            "par": { "merges": ["merge", "m"] }
        }
    }
}]"#;

// =============================================================================
// Registration
// =============================================================================

#[test]
fn missing_table_is_fatal() {
    let json = r#"[{"name": "fe3", "commands": {"unit": {"main": "units", "choice": {"mode": "modes"}}}}]"#;
    let err = modules(json).unwrap_err();
    assert!(err.is_fatal());
    assert!(err.to_string().contains("modes"));
}

#[test]
fn missing_section_is_fatal() {
    let json = r#"[{"name": "fe3", "commands": {"unit": {"main": "heroes"}}}]"#;
    assert!(modules(json).unwrap_err().is_fatal());
}

#[test]
fn shared_primary_section_is_fatal() {
    let json = r#"[{"name": "fe3", "commands": {
        "unit": {"main": "units"},
        "hero": {"main": "units"}
    }}]"#;
    assert!(modules(json).unwrap_err().is_fatal());
}

#[test]
fn attach_must_name_an_entry() {
    let json = r#"[{"name": "fe3", "commands": {"unit": {"main": "units", "int": {"merges": [0, 10]}, "add": "merges"}}}]"#;
    assert!(modules(json).unwrap_err().is_fatal());
}

#[test]
fn comparison_needs_two_entries() {
    let json = r#"[{"name": "fe3", "commands": {"unit": {"main": "units", "comma": {"name": "compare", "size": 1}}}}]"#;
    assert!(modules(json).unwrap_err().is_fatal());
}

// =============================================================================
// Free Text
// =============================================================================

#[test]
fn full_line_fills_every_check() {
    let module = modules(UNIT).unwrap().remove(0);
    let Route::Parsed { parsed, .. } = module
        .route("galeforce!anna -hard +str5 -m 12 -base killing edge 1/5/10", &SearchContext::new())
        .unwrap()
    else {
        panic!("expected a parse");
    };
    let options = parsed.options;

    assert_eq!(options["name"], OptionValue::Entity("anna".into()));
    assert_eq!(options["skill"], OptionValue::Entity("galeforce".into()));
    assert_eq!(options["difficulty"], OptionValue::Text("hard".into()));
    assert_eq!(options["merges"], OptionValue::Int(10));
    assert_eq!(options["personal"], OptionValue::Bool(true));
    assert_eq!(options["weapon"], OptionValue::Entity("killing_edge".into()));
    assert_eq!(
        options["level"],
        OptionValue::List(vec![OptionValue::Int(1), OptionValue::Int(5), OptionValue::Int(10)])
    );
    let OptionValue::Stats(stats) = &options["stats"] else {
        panic!("expected stat deltas");
    };
    assert_eq!(stats.add["str"], 5);
    assert!(parsed.unmatched.is_empty());
}

#[test]
fn unknown_words_are_unmatched() {
    let module = modules(UNIT).unwrap().remove(0);
    let Route::Parsed { parsed, .. } = module.route("unit marth -frobnicate", &SearchContext::new()).unwrap() else {
        panic!("expected a parse");
    };
    assert_eq!(parsed.options["name"], OptionValue::Entity("marth".into()));
    assert_eq!(parsed.unmatched, vec!["-frobnicate"]);
}

// =============================================================================
// Declarations
// =============================================================================

#[test]
fn declarations_follow_check_order() {
    let module = modules(UNIT).unwrap().remove(0);
    let help = HelpText::new().with_argument("difficulty", "Game difficulty");
    let declared = module.command("unit").unwrap().declare_options(&help);

    let names: Vec<&str> = declared.iter().map(|option| option.name.as_str()).collect();
    assert_eq!(names[0], "name");
    assert_eq!(names[1], "difficulty");
    assert_eq!(names.last(), Some(&"compare"));

    let difficulty = &declared[1];
    assert!(difficulty.required);
    assert_eq!(difficulty.description, "Game difficulty");
    assert_eq!(difficulty.choices.len(), 2);

    let merges = declared.iter().find(|option| option.name == "merges").unwrap();
    assert_eq!(merges.kind, OptionKind::Integer);
}
