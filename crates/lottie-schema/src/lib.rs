//! A schema-driven validation engine for the Lottie animation interchange
//! format.
//!
//! - 🔀 Discriminated unions (`ty`, `s`, asset `ty`) resolved to the exact
//!   variant instead of `jsonschema`'s own `oneOf`, which reports every
//!   failing branch at once
//! - 📐 Closed-object "unknown property" warnings computed from the
//!   schema's own `allOf` composition, not hand-maintained
//! - 🧭 Keyframe ordering and interpolation-field checks
//! - 🔗 Cross-reference checks between layers and the asset catalog
//! - 📎 Every diagnostic carries a human name and, where available, a
//!   documentation link
//!
//! # Usage
//!
//! ```rust
//! use serde_json::json;
//!
//! let schema = json!({
//!     "$id": "https://example.test/lottie.schema.json#",
//!     "type": "object"
//! });
//! let engine = lottie_schema::LottieSchema::new(schema).expect("valid schema");
//! let diagnostics = engine.validate_object(&json!({}), true);
//! assert!(diagnostics.is_empty());
//! ```
//!
//! Building a validator walks the schema document once (see
//! [`LottieSchema::new`]); the resulting value is cheap to clone-share
//! (`Send + Sync`, no interior mutability) and meant to be built once and
//! reused across many [`LottieSchema::validate`] calls.

mod compiled_table;
mod diagnostic;
mod doc_metadata;
mod error;
mod keywords;
mod property_index;
mod rewriter;
mod schema_id;
mod validator;

pub use diagnostic::{Diagnostic, DiagnosticType, Input, WarningKind};
pub use error::SchemaError;
pub use validator::{LottieSchema, LottieSchemaOptions, DEFAULT_DOCS_URL};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal_schema() -> serde_json::Value {
        json!({
            "$id": "https://lottie.github.io/lottie-spec/lottie.schema.json#",
            "type": "object",
            "properties": {
                "v": { "type": "string" }
            },
            "additionalProperties": false
        })
    }

    #[test]
    fn builds_and_validates_a_minimal_schema() {
        let engine = LottieSchema::new(minimal_schema()).expect("schema compiles");
        let diagnostics = engine.validate_object(&json!({ "v": "5.5.0" }), true);
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
    }

    #[test]
    fn rejects_a_document_with_no_id() {
        let schema = json!({ "type": "object" });
        let error = LottieSchema::new(schema).unwrap_err();
        assert!(matches!(error, SchemaError::InvalidRootId));
    }

    #[test]
    fn rejects_a_non_object_schema() {
        let error = LottieSchema::new(json!("not a schema")).unwrap_err();
        assert!(matches!(error, SchemaError::NotAnObject));
    }

    #[test]
    fn unparsable_input_produces_the_fixed_two_diagnostic_sequence() {
        let engine = LottieSchema::new(minimal_schema()).expect("schema compiles");
        let diagnostics = engine.validate_string("{not json", true);
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].name, "document");
    }

    #[test]
    fn str_and_object_input_converge_on_the_same_result() {
        let engine = LottieSchema::new(minimal_schema()).expect("schema compiles");
        let value = json!({ "v": 5 });
        let text = value.to_string();
        assert_eq!(engine.validate_string(&text, true), engine.validate_object(&value, true));
    }
}
