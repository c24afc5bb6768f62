//! Integration tests for catalog loading

use codex_foundation::ErrorKind;
use codex_pool::{CatalogProvider, JsonCatalog, PoolRegistry};

const CATALOG: &str = r#"{
    "sections": {
        "fe13/units": [
            { "id": "lucina", "name": "Lucina", "alt": ["Masked Marth"] },
            { "id": "lon_qu", "name": "Lon'qu", "display": "Lon'qu (Myrmidon)" }
        ],
        "fe13/weapons": [
            { "id": "falchion", "name": "Falchion", "hard": ["Exalted Falchion"] }
        ]
    },
    "lexicon": { "lonqu": ["Lonky"] }
}"#;

#[test]
fn json_catalog_lists_sections() {
    let catalog = JsonCatalog::from_json(CATALOG).unwrap();
    assert_eq!(catalog.sections(), vec!["fe13/units", "fe13/weapons"]);
    assert_eq!(catalog.records("fe13/units").unwrap().len(), 2);
    let err = catalog.records("fe13/classes").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Catalog(_)));
}

#[test]
fn registry_builds_every_section() {
    let registry = PoolRegistry::load(&JsonCatalog::from_json(CATALOG).unwrap()).unwrap();
    assert_eq!(registry.sections().count(), 2);

    let units = registry.require("fe13/units").unwrap();
    assert_eq!(units.len(), 2);
    assert_eq!(units.get("lon_qu").unwrap().display, "Lon'qu (Myrmidon)");
    assert_eq!(units.get("lucina").unwrap().section, "fe13/units");
}

#[test]
fn lexicon_extends_soft_aliases() {
    let registry = PoolRegistry::load(&JsonCatalog::from_json(CATALOG).unwrap()).unwrap();
    let units = registry.require("fe13/units").unwrap();
    assert_eq!(units.search("lonky", None).result_id(), Some("lon_qu"));
    assert_eq!(units.search("masked", None).result_id(), Some("lucina"));
}

#[test]
fn missing_section_is_a_configuration_error() {
    let registry = PoolRegistry::load(&JsonCatalog::from_json(CATALOG).unwrap()).unwrap();
    let err = registry.require("fe13/classes").unwrap_err();
    assert!(err.is_fatal());
}

#[test]
fn malformed_catalog_is_rejected() {
    let err = JsonCatalog::from_json("{\"sections\": []}").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Serialization(_)));
}
