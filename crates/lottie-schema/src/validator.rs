//! Ties [`crate::doc_metadata`], [`crate::property_index`], [`crate::rewriter`]
//! and [`crate::keywords`] together into a compiled, reusable validator.
//!
//! Construction order matters: the rewriter must run before the document is
//! annotated (its dispatch keywords carry marker keys `doc_metadata`
//! deliberately skips), and the property index must be built from the
//! rewritten document (the `allOf`/`properties` shape the index walks is
//! untouched by rewriting, so either order would agree, but building it
//! after keeps the pipeline linear and easy to follow).

use std::collections::HashMap;
use std::sync::Arc;

use jsonschema::paths::{JsonPointer, PathChunk};
use jsonschema::{Resource, ValidationError, Validator};
use serde_json::Value;
use tracing::debug;

use crate::compiled_table::CompiledTable;
use crate::diagnostic::{Diagnostic, Input, WarningKind};
use crate::doc_metadata;
use crate::error::SchemaError;
use crate::keywords::{self, WARNING_PROPERTY_PREFIX, WARNING_TYPE_PREFIX};
use crate::property_index::{PropertyIndex, PropertyIndexBuilder};
use crate::rewriter;
use crate::schema_id::SchemaId;

/// The canonical documentation site named in the schema's public contract;
/// used as the default `docs_url` unless overridden.
pub const DEFAULT_DOCS_URL: &str = "https://lottie.github.io/lottie-spec/specs/schema/";

/// Builder for [`LottieSchema`], mirroring `jsonschema`'s own
/// `ValidationOptions` `with_*` style.
#[derive(Debug, Clone)]
pub struct LottieSchemaOptions {
    name_paths: bool,
    docs_url: String,
    schema_url: Option<String>,
}

impl Default for LottieSchemaOptions {
    fn default() -> Self {
        Self {
            name_paths: false,
            docs_url: DEFAULT_DOCS_URL.to_string(),
            schema_url: None,
        }
    }
}

impl LottieSchemaOptions {
    /// Enables name-paths mode: every diagnostic's `path_names` is populated
    /// by walking the failing instance path and collecting the `nm` of every
    /// ancestor that carries a `ty`.
    pub fn with_name_paths(mut self, enabled: bool) -> Self {
        self.name_paths = enabled;
        self
    }

    /// Overrides the documentation link base embedded in diagnostics.
    pub fn with_docs_url(mut self, docs_url: impl Into<String>) -> Self {
        self.docs_url = docs_url.into();
        self
    }

    /// A CDN prefix override for locating `lottie.schema.json`. Not
    /// consumed by [`LottieSchemaOptions::build`]; read back by callers
    /// that load the schema document themselves (see the CLI).
    pub fn with_schema_url(mut self, schema_url: impl Into<String>) -> Self {
        self.schema_url = Some(schema_url.into());
        self
    }

    pub fn schema_url(&self) -> Option<&str> {
        self.schema_url.as_deref()
    }

    /// Runs the full construction pipeline: rewrite, annotate, build the
    /// property index, compile one validator per `$defs` node, then compile
    /// the root validator.
    pub fn build(self, schema: Value) -> Result<LottieSchema, SchemaError> {
        let mut schema = schema;
        if !schema.is_object() {
            return Err(SchemaError::NotAnObject);
        }
        let root_id = schema
            .get("$id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or(SchemaError::InvalidRootId)?
            .to_string();

        debug!(stage = "schema_rewriter", %root_id, "rewriting discriminated unions");
        rewriter::rewrite(&mut schema, &root_id);

        validate_refs_exist(&schema)?;

        debug!(stage = "doc_metadata", "annotating schema with names and docs links");
        doc_metadata::annotate(&mut schema, Some(&self.docs_url));

        debug!(stage = "property_index", "resolving closed property sets");
        let property_index = Arc::new(PropertyIndexBuilder::new(&schema).build(&root_id));

        // Registering the document as an external resource under its own
        // `$id` is what lets a throwaway `{"$ref": "<rootId>#/$defs/..."}"`
        // subschema resolve back into it; the root validator below needs no
        // such registration since its own `$defs` refs are local fragments
        // of the document it is built from.
        let resource = Resource::from_contents(schema.clone()).map_err(|error| SchemaError::InvalidResource(error.to_string()))?;

        let schema = Arc::new(schema);
        let table = Arc::new(CompiledTable::new());
        let weak_table = Arc::downgrade(&table);

        let ids = collect_defs_ids(&schema, &root_id);
        let mut entries = HashMap::with_capacity(ids.len());
        for id in &ids {
            let subschema = serde_json::json!({ "$ref": id.as_str() });
            let validator = compile(&subschema, &root_id, &resource, &weak_table, &property_index)?;
            entries.insert(id.clone(), validator);
        }
        table.finish(entries);

        let root = compile(schema.as_ref(), &root_id, &resource, &weak_table, &property_index)?;

        Ok(LottieSchema {
            schema,
            root,
            table,
            docs_url: self.docs_url,
            name_paths: self.name_paths,
        })
    }
}

fn compile(
    subschema: &Value,
    root_id: &str,
    resource: &Resource,
    table: &std::sync::Weak<CompiledTable>,
    properties: &Arc<PropertyIndex>,
) -> Result<Validator, SchemaError> {
    let mut options = jsonschema::options();
    options.with_resource(root_id, resource.clone());
    keywords::register_all(&mut options, table, Arc::clone(properties));
    options.build(subschema).map_err(SchemaError::Compile)
}

/// Walks every local `$ref` in the (rewritten) document and confirms its
/// `#/$defs/...` target actually exists, before any of it is handed to the
/// compiler. The rewriter itself never installs a dangling reference, but a
/// hand-authored or generated schema document can, and that is a malformed
/// document fault rather than a validation result against some instance.
fn validate_refs_exist(schema: &Value) -> Result<(), SchemaError> {
    walk_refs(schema, schema)
}

fn walk_refs(root: &Value, node: &Value) -> Result<(), SchemaError> {
    match node {
        Value::Object(map) => {
            if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
                if let Some(pointer) = reference.strip_prefix('#') {
                    if root.pointer(pointer).is_none() {
                        return Err(SchemaError::MissingDefs { pointer: pointer.to_string() });
                    }
                }
            }
            for value in map.values() {
                walk_refs(root, value)?;
            }
            Ok(())
        }
        Value::Array(items) => items.iter().try_for_each(|item| walk_refs(root, item)),
        _ => Ok(()),
    }
}

fn collect_defs_ids(schema: &Value, root_id: &str) -> Vec<SchemaId> {
    let Some(defs) = schema.get("$defs").and_then(Value::as_object) else {
        return Vec::new();
    };
    defs.iter()
        .flat_map(|(category, objects)| {
            objects
                .as_object()
                .into_iter()
                .flat_map(|objects| objects.keys())
                .map(move |object| SchemaId::for_object(root_id, category, object))
        })
        .collect()
}

/// A schema-driven validation engine for the Lottie animation interchange
/// format: compiles a (possibly rewritten) JSON Schema document once, then
/// runs it against any number of instance documents.
pub struct LottieSchema {
    schema: Arc<Value>,
    root: Validator,
    /// Kept alive only so the `Weak<CompiledTable>` references captured by
    /// dispatch keywords (`ty_oneof`, `asset_oneof`) stay upgradeable for
    /// the lifetime of this validator.
    #[allow(dead_code)]
    table: Arc<CompiledTable>,
    docs_url: String,
    name_paths: bool,
}

impl LottieSchema {
    /// Builds a validator from `schema` using default options.
    pub fn new(schema: Value) -> Result<Self, SchemaError> {
        LottieSchemaOptions::default().build(schema)
    }

    pub fn options() -> LottieSchemaOptions {
        LottieSchemaOptions::default()
    }

    pub fn validate(&self, input: Input<'_>, show_warnings: bool) -> Vec<Diagnostic> {
        match input {
            Input::Str(text) => self.validate_string(text, show_warnings),
            Input::Object(value) => self.validate_object(value, show_warnings),
        }
    }

    /// Parses `input` as JSON, then validates it. A parse failure produces
    /// the fixed two-diagnostic sequence rather than a `Result` error: it is
    /// a problem with the *document*, not with how the validator was built.
    pub fn validate_string(&self, input: &str, show_warnings: bool) -> Vec<Diagnostic> {
        match serde_json::from_str(input) {
            Ok(value) => self.validate_object(&value, show_warnings),
            Err(error) => Diagnostic::unparsable(error),
        }
    }

    pub fn validate_object(&self, input: &Value, show_warnings: bool) -> Vec<Diagnostic> {
        let mut diagnostics: Vec<Diagnostic> = match self.root.validate(input) {
            Ok(()) => Vec::new(),
            Err(errors) => errors.filter_map(|error| self.to_diagnostic(error, show_warnings)).collect(),
        };

        if self.name_paths {
            diagnostics = diagnostics
                .into_iter()
                .map(|diagnostic| {
                    let path_names = name_path(input, &diagnostic.path);
                    diagnostic.with_path_names(path_names)
                })
                .collect();
        }

        diagnostics.sort_by(|a, b| a.path.cmp(&b.path));
        diagnostics
    }

    /// Turns one raw engine error into a [`Diagnostic`], or drops it:
    /// `if`-keyword errors are always suppressed (they duplicate the
    /// guarded branch's own errors), and warnings are suppressed when the
    /// caller asked to hide them.
    fn to_diagnostic(&self, error: ValidationError<'_>, show_warnings: bool) -> Option<Diagnostic> {
        if matches!(error.schema_path.last(), Some(PathChunk::Keyword("if"))) {
            return None;
        }
        let is_pattern = matches!(error.schema_path.last(), Some(PathChunk::Keyword("pattern")));
        let raw = error.to_string();
        let (warning_kind, body) = if let Some(rest) = raw.strip_prefix(WARNING_TYPE_PREFIX) {
            (Some(WarningKind::Type), rest.to_string())
        } else if let Some(rest) = raw.strip_prefix(WARNING_PROPERTY_PREFIX) {
            (Some(WarningKind::Property), rest.to_string())
        } else if is_pattern {
            (None, "doesn't match the pattern".to_string())
        } else {
            (None, raw)
        };
        if warning_kind.is_some() && !show_warnings {
            return None;
        }

        let (name, docs) = self.resolve_name_and_docs(&error.schema_path);
        let message = format!("{name} {body}");
        let path = error.instance_path.to_string();
        let diagnostic = match warning_kind {
            Some(kind) => Diagnostic::warning(kind, message, path, name),
            None => Diagnostic::error(message, path, name),
        };
        Some(diagnostic.with_docs(docs))
    }

    /// Walks `schema_path` from its full length down to empty, looking up
    /// each prefix as a JSON Pointer into the annotated schema document and
    /// returning the first `_name`/`_docs` pair found, per §6's "`_name`, or
    /// the literal `Value` if unknown" contract.
    fn resolve_name_and_docs(&self, schema_path: &JsonPointer) -> (String, Option<String>) {
        let chunks: Vec<PathChunk> = schema_path.iter().cloned().collect();
        for len in (0..=chunks.len()).rev() {
            let pointer = JsonPointer::from(&chunks[..len]).to_string();
            if let Some(node) = self.schema.pointer(&pointer) {
                if let Some(name) = doc_metadata::name(node) {
                    return (name.to_string(), doc_metadata::docs_link(node));
                }
            }
        }
        ("Value".to_string(), None)
    }
}

/// Walks `document` along the JSON Pointer `path`, collecting the `nm` of
/// every ancestor node that carries a `ty` key (possibly `null`), outermost
/// first.
fn name_path(document: &Value, path: &str) -> Vec<Option<String>> {
    let mut node = document;
    let mut names = Vec::new();
    for segment in path.split('/').filter(|segment| !segment.is_empty()) {
        let key = unescape_pointer_segment(segment);
        let next = match node {
            Value::Object(map) => map.get(&key),
            Value::Array(items) => key.parse::<usize>().ok().and_then(|index| items.get(index)),
            _ => None,
        };
        let Some(next) = next else {
            break;
        };
        node = next;
        if node.get("ty").is_some() {
            names.push(node.get("nm").and_then(Value::as_str).map(str::to_string));
        }
    }
    names
}

fn unescape_pointer_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}
