//! Exercises the compiled validator through its public API against a small,
//! hand-written schema fixture shaped like the real Lottie document family:
//! a discriminated `layers` union, an animated `ks` property with a
//! keyframe sequence, and an `assets` catalog referenced by `refId`.

use lottie_schema::{DiagnosticType, LottieSchema, WarningKind};
use serde_json::{json, Value};

const ROOT_ID: &str = "https://example.test/lottie.schema.json#";

fn fixture_schema() -> Value {
    json!({
        "$id": ROOT_ID,
        "type": "object",
        "properties": {
            "v": { "type": "string" },
            "ip": { "type": "number" },
            "op": { "type": "number" },
            "fr": { "type": "number" },
            "w": { "type": "integer" },
            "h": { "type": "integer" },
            "layers": { "type": "array", "items": { "$ref": "#/$defs/layers/all-layers" } },
            "assets": { "type": "array", "items": { "$ref": "#/$defs/all-assets/all-assets" } }
        },
        "additionalProperties": false,
        "$defs": {
            "layers": {
                "shape-layer": {
                    "properties": {
                        "ty": { "const": 4 },
                        "nm": { "type": "string" },
                        "ks": { "$ref": "#/$defs/properties/position-property" }
                    },
                    "additionalProperties": false
                },
                "image-layer": {
                    "properties": {
                        "ty": { "const": 2 },
                        "nm": { "type": "string" },
                        "refId": { "type": "string" }
                    },
                    "additionalProperties": false
                },
                "all-layers": {}
            },
            "assets": {
                "image-asset": {
                    "properties": {
                        "id": { "type": "string" },
                        "w": { "type": "integer" },
                        "h": { "type": "integer" }
                    },
                    "additionalProperties": false
                }
            },
            "properties": {
                "keyframe": {
                    "type": "object",
                    "properties": {
                        "t": { "type": "number" },
                        "s": { "type": "array" },
                        "i": { "type": "object" },
                        "o": { "type": "object" },
                        "h": { "type": "boolean" }
                    }
                },
                "keyframed-value": {
                    "type": ["number", "array"],
                    "items": { "$ref": "#/$defs/properties/keyframe" }
                },
                "position-property": {
                    "properties": {
                        "a": { "type": "integer" },
                        "k": { "$ref": "#/$defs/properties/keyframed-value" }
                    },
                    "additionalProperties": false
                }
            }
        }
    })
}

fn engine() -> LottieSchema {
    LottieSchema::new(fixture_schema()).expect("fixture schema compiles")
}

#[test]
fn unknown_layer_type_is_a_type_warning() {
    let document = json!({
        "v": "5.0", "ip": 0, "op": 1, "fr": 60, "w": 1, "h": 1,
        "layers": [{ "ty": 999, "ks": {} }]
    });
    let diagnostics = engine().validate_object(&document, true);
    assert!(
        diagnostics
            .iter()
            .any(|d| d.warning_kind == Some(WarningKind::Type) && d.message.contains("unknown 'ty' value 999")),
        "{diagnostics:?}"
    );
}

#[test]
fn keyframe_ordering_violation_is_reported_at_the_offending_index() {
    let document = json!({
        "layers": [{
            "ty": 4,
            "ks": {
                "a": 1,
                "k": [
                    { "t": 10, "i": {}, "o": {}, "s": [0] },
                    { "t": 5, "s": [1] }
                ]
            }
        }]
    });
    let diagnostics = engine().validate_object(&document, true);
    let found = diagnostics
        .iter()
        .find(|d| d.message.contains("keyframe 't' must be in ascending order"))
        .unwrap_or_else(|| panic!("{diagnostics:?}"));
    assert_eq!(found.path, "/layers/0/ks/k/1");
}

#[test]
fn triple_coincident_keyframes_are_rejected_on_the_third() {
    let document = json!({
        "layers": [{
            "ty": 4,
            "ks": {
                "a": 1,
                "k": [
                    { "t": 0, "i": {}, "o": {} },
                    { "t": 0, "i": {}, "o": {} },
                    { "t": 0 }
                ]
            }
        }]
    });
    let diagnostics = engine().validate_object(&document, true);
    let found = diagnostics
        .iter()
        .find(|d| d.message.contains("there can be at most 2 keyframes with the same 't' value"))
        .unwrap_or_else(|| panic!("{diagnostics:?}"));
    assert_eq!(found.path, "/layers/0/ks/k/2");
}

#[test]
fn unknown_property_on_a_closed_object_is_a_property_warning() {
    let document = json!({
        "layers": [{ "ty": 4, "ks": {}, "bogus": 1 }]
    });
    let diagnostics = engine().validate_object(&document, true);
    assert!(
        diagnostics
            .iter()
            .any(|d| d.warning_kind == Some(WarningKind::Property) && d.message.ends_with("has unknown property 'bogus'")),
        "{diagnostics:?}"
    );
}

#[test]
fn a_refid_naming_a_missing_asset_is_an_error() {
    let document = json!({
        "layers": [{ "ty": 2, "refId": "missing" }],
        "assets": [{ "id": "other", "w": 1, "h": 1 }]
    });
    let diagnostics = engine().validate_object(&document, false);
    assert!(
        diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticType::Error && d.message.contains("\"missing\" is not a valid asset id")),
        "{diagnostics:?}"
    );
}

#[test]
fn a_valid_refid_produces_no_diagnostics() {
    let document = json!({
        "layers": [{ "ty": 2, "refId": "other" }],
        "assets": [{ "id": "other", "w": 1, "h": 1 }]
    });
    let diagnostics = engine().validate_object(&document, true);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
}

#[test]
fn unparsable_input_produces_the_fixed_two_error_sequence() {
    let diagnostics = engine().validate_string("not json", true);
    assert_eq!(diagnostics.len(), 2);
    assert_eq!(diagnostics[0].message, "Document is not a valid JSON file");
    assert!(diagnostics.iter().all(|d| d.kind == DiagnosticType::Error));
}

#[test]
fn name_paths_mode_collects_ancestor_layer_names() {
    let engine = LottieSchema::options().with_name_paths(true).build(fixture_schema()).expect("fixture compiles");
    let document = json!({
        "layers": [{ "ty": 4, "nm": "Bg", "ks": { "a": 1, "k": "not an array or number" } }]
    });
    let diagnostics = engine.validate_object(&document, true);
    let found = diagnostics
        .iter()
        .find(|d| d.path.starts_with("/layers/0/ks"))
        .unwrap_or_else(|| panic!("{diagnostics:?}"));
    assert_eq!(found.path_names, Some(vec![Some("Bg".to_string())]));
}

#[test]
fn every_diagnostic_carries_a_non_empty_name() {
    let document = json!({ "layers": [{ "ty": 999, "bogus": 1 }] });
    let diagnostics = engine().validate_object(&document, true);
    assert!(!diagnostics.is_empty());
    assert!(diagnostics.iter().all(|d| !d.name.is_empty()), "{diagnostics:?}");
}

#[test]
fn validate_is_idempotent() {
    let engine = engine();
    let document = json!({ "layers": [{ "ty": 999 }] });
    let first = engine.validate_object(&document, true);
    let second = engine.validate_object(&document, true);
    assert_eq!(first, second);
}

#[test]
fn diagnostics_are_sorted_by_path() {
    let document = json!({
        "layers": [
            { "ty": 999 },
            { "ty": 4, "bogus": 1 }
        ]
    });
    let diagnostics = engine().validate_object(&document, true);
    let mut sorted = diagnostics.clone();
    sorted.sort_by(|a, b| a.path.cmp(&b.path));
    assert_eq!(diagnostics, sorted);
}

#[test]
fn validate_string_and_validate_object_agree() {
    let document = json!({ "layers": [{ "ty": 999 }] });
    let text = document.to_string();
    let engine = engine();
    assert_eq!(engine.validate_string(&text, true), engine.validate_object(&document, true));
}
