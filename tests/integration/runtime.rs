//! Sessions loaded from files, the way the `codex` binary starts

use std::fs;
use std::path::PathBuf;

use codex_parser::{Disambiguator, OptionValue, PickRequest, PickResponse};
use codex_runtime::{Outcome, Session, parse_args};

const CATALOG: &str = r#"{
    "sections": {
        "fe13/units": [
            { "id": "lucina", "name": "Lucina", "alt": ["Masked Marth"] },
            { "id": "chrom", "name": "Chrom" },
            { "id": "cordelia", "name": "Cordelia" }
        ],
        "fe13/classes": [
            { "id": "lord", "name": "Lord" },
            { "id": "dark_flier", "name": "Dark Flier" }
        ]
    }
}"#;

const MODULES: &str = r#"[{
    "name": "fe13",
    "commands": {
        "unit": {
            "main": "fe13/units",
            "int": { "merges": [0, 10] },
            "level": { "size": 2, "lvl": 20 }
        },
        "class": { "main": "fe13/classes" }
    }
}]"#;

struct Fixture {
    dir: PathBuf,
}

impl Fixture {
    fn new(name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("codex_runtime_{name}_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("catalog.json"), CATALOG).unwrap();
        fs::write(dir.join("modules.json"), MODULES).unwrap();
        let _ = fs::remove_file(dir.join("aliases.msgpack"));
        Self { dir }
    }

    fn path(&self, file: &str) -> String {
        self.dir.join(file).display().to_string()
    }

    fn session(&self, extra: &[&str]) -> Session {
        let mut args = vec![
            "codex".to_string(),
            "--catalog".to_string(),
            self.path("catalog.json"),
            "--modules".to_string(),
            self.path("modules.json"),
            "--aliases".to_string(),
            self.path("aliases.msgpack"),
        ];
        args.extend(extra.iter().map(|arg| (*arg).to_string()));
        Session::load(&parse_args(&args).unwrap()).unwrap()
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}

struct Refuse;

impl Disambiguator for Refuse {
    fn pick(&mut self, _request: &PickRequest) -> PickResponse {
        PickResponse::Cancelled
    }
}

struct First;

impl Disambiguator for First {
    fn pick(&mut self, request: &PickRequest) -> PickResponse {
        PickResponse::Chosen(request.candidates[0].id.clone())
    }
}

fn resolved(outcome: Outcome) -> codex_parser::OptionMap {
    match outcome {
        Outcome::Resolved { options, .. } => options,
        other => panic!("expected resolved options, got {other:?}"),
    }
}

#[test]
fn loaded_session_resolves_free_text() {
    let fixture = Fixture::new("free_text");
    let mut session = fixture.session(&[]);

    let options = resolved(session.eval("masked lvl 10/20 -merges 4", &mut Refuse).unwrap());
    assert_eq!(options["name"], OptionValue::Entity("lucina".into()));
    assert_eq!(options["merges"], OptionValue::Int(4));
    assert_eq!(
        options["level"],
        OptionValue::List(vec![OptionValue::Int(10), OptionValue::Int(20)])
    );
}

#[test]
fn aliases_survive_a_restart() {
    let fixture = Fixture::new("restart");

    let mut first = fixture.session(&["--user", "robin"]);
    first.eval(":alias user add Cordelia = cordy", &mut Refuse).unwrap();
    drop(first);

    let mut second = fixture.session(&["--user", "robin"]);
    let options = resolved(second.eval("cordy", &mut Refuse).unwrap());
    assert_eq!(options["name"], OptionValue::Entity("cordelia".into()));

    let mut stranger = fixture.session(&["--user", "frederick"]);
    assert!(stranger.eval("cordy", &mut Refuse).is_err());
}

#[test]
fn group_aliases_apply_to_every_user() {
    let fixture = Fixture::new("group");

    let mut admin = fixture.session(&["--scope", "shepherds"]);
    admin.eval(":alias scope add Dark Flier = flyer", &mut Refuse).unwrap();

    let mut member = fixture.session(&["--scope", "shepherds", "--user", "robin"]);
    let outcome = member.eval("flyer", &mut Refuse).unwrap();
    let Outcome::Resolved { command, options, .. } = outcome else {
        panic!("expected resolved options");
    };
    assert_eq!(command, "class");
    assert_eq!(options["name"], OptionValue::Entity("dark_flier".into()));
}

#[test]
fn ambiguous_line_waits_for_a_pick() {
    let fixture = Fixture::new("pick");
    let mut session = fixture.session(&[]);

    assert_eq!(session.eval("c", &mut Refuse).unwrap(), Outcome::Abandoned);
    let options = resolved(session.eval("c", &mut First).unwrap());
    assert_eq!(options["name"], OptionValue::Entity("lucina".into()));
}

#[test]
fn strict_flag_rejects_malformed_structured_values() {
    let fixture = Fixture::new("strict");
    let line = r#":json unit {"name": "chrom", "merges": "many"}"#;

    let mut lenient = fixture.session(&[]);
    let options = resolved(lenient.eval(line, &mut Refuse).unwrap());
    assert!(!options.contains_key("merges"));

    let mut strict = fixture.session(&["--strict"]);
    let err = strict.eval(line, &mut Refuse).unwrap_err();
    assert!(err.to_string().contains("merges"));
    assert!(!err.is_fatal());
}

#[test]
fn missing_catalog_is_fatal() {
    let args: Vec<String> = ["codex", "--modules", "modules.json"].map(String::from).to_vec();
    let Err(err) = Session::load(&parse_args(&args).unwrap()) else {
        panic!("expected a configuration error");
    };
    assert!(err.is_fatal());
}
