//! Annotates `$defs` nodes with documentation metadata before compilation,
//! so that diagnostics can carry a human name and a documentation link
//! without the keywords that raise them needing to know the naming rules.
//!
//! Diagnostic messages read "Shape layer.ks has ..." rather than
//! "instancePath /layers/3/ks has ...", so the name has to come from
//! *where in the schema* a violation happened, not from the document. This
//! module computes that name once, up front, by walking the schema
//! depth-first and writing it onto every node it visits.

use heck::ToTitleCase;
use serde_json::{Map, Value};

/// Derives a human-readable title from a `$defs` object key.
///
/// Keys use kebab-case (`splittable-position-property`); dotted segments
/// (`shape.rectangle`) name a nested variant and keep the dot as a
/// separator between Title Case segments (`Shape.Rectangle`) rather than
/// being flattened, since the dot is meaningful grouping, not a word break.
fn title_for(key: &str) -> String {
    key.split('.')
        .map(|segment| segment.to_title_case())
        .collect::<Vec<_>>()
        .join(".")
}

/// The category's human title: kebab-case category with a trailing `s`
/// stripped, then Title-Cased (`layers` -> `Layer`, `all-assets` -> `All
/// Asset`).
fn category_title(category: &str) -> String {
    let singular = category.strip_suffix('s').unwrap_or(category);
    title_for(singular)
}

/// Keys that do not themselves describe nested schemas and should not be
/// walked looking for more schema nodes to annotate.
fn is_annotation_or_data_key(key: &str) -> bool {
    matches!(key, "_docs" | "_docs_name" | "_name" | "title" | "$id" | "$ref" | "const" | "enum" | "default" | "examples")
        || key.starts_with("ty_oneof")
        || key.starts_with("prop_oneof")
        || key.starts_with("splitpos_oneof")
        || key.starts_with("asset_oneof")
        || key.starts_with("enum_oneof")
        || key == "warn_extra_props"
        || key == "keyframe_sequence"
        || key == "reference_asset"
}

/// Walks the full schema depth-first, assigning `_docs`, `_docs_name`, and
/// `_name` to every mapping node reachable from `$defs`.
///
/// Idempotent: every value written is a pure function of the node's key
/// path, so running this twice overwrites with identical values.
pub(crate) fn annotate(schema: &mut Value, docs_url: Option<&str>) {
    let Some(defs) = schema.get_mut("$defs").and_then(Value::as_object_mut) else {
        return;
    };
    for (category, objects) in defs.iter_mut() {
        let Some(objects) = objects.as_object_mut() else {
            continue;
        };
        let docs_name = category_title(category);
        for (object, node) in objects.iter_mut() {
            let name = node
                .get("title")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| title_for(object));
            let is_top_level_object = node.get("type").is_some();
            let docs = docs_url.map(|base| {
                if is_top_level_object {
                    format!("{base}#{category}-{object}")
                } else {
                    format!("{base}#{category}")
                }
            });
            annotate_node(node, &name, &docs_name, docs.as_deref());
        }
    }
}

/// Writes `_name`/`_docs_name`/`_docs` onto `node` and recurses into its
/// structural children, computing each child's name per §4.1:
///
/// - a `properties` map's values get `<parent-name>.<prop-key>`, or
///   `<parent-name> <child.title.lower()>` when the child declares a
///   `title`;
/// - array elements (`oneOf`/`anyOf`/`allOf`/`items` lists) inherit the
///   ambient name unchanged;
/// - every other key recurses with the same name, since it is a structural
///   wrapper (a condition, a negation, a per-index tuple slot) rather than
///   a new named sub-entity.
fn annotate_node(node: &mut Value, name: &str, docs_name: &str, docs: Option<&str>) {
    match node {
        Value::Object(map) => {
            map.insert("_name".to_string(), Value::String(name.to_string()));
            map.insert("_docs_name".to_string(), Value::String(docs_name.to_string()));
            if let Some(docs) = docs {
                map.insert("_docs".to_string(), Value::String(docs.to_string()));
            }
            annotate_children(map, name, docs_name, docs);
        }
        Value::Array(items) => {
            for item in items {
                annotate_node(item, name, docs_name, docs);
            }
        }
        _ => {}
    }
}

fn annotate_children(map: &mut Map<String, Value>, name: &str, docs_name: &str, docs: Option<&str>) {
    if let Some(Value::Object(properties)) = map.get_mut("properties") {
        for (prop_key, child) in properties.iter_mut() {
            let child_name = match child.get("title").and_then(Value::as_str) {
                Some(title) => format!("{name} {}", title.to_lowercase()),
                None => format!("{name}.{prop_key}"),
            };
            annotate_node(child, &child_name, docs_name, docs);
        }
    }

    let keys: Vec<String> = map
        .keys()
        .filter(|k| k.as_str() != "properties" && !is_annotation_or_data_key(k))
        .cloned()
        .collect();
    for key in keys {
        if let Some(child) = map.get_mut(&key) {
            annotate_node(child, name, docs_name, docs);
        }
    }
}

/// Reads back the `_name` written by [`annotate`].
pub(crate) fn name(node: &Value) -> Option<&str> {
    node.get("_name").and_then(Value::as_str)
}

pub(crate) fn docs_link(node: &Value) -> Option<String> {
    node.get("_docs").and_then(Value::as_str).map(str::to_string)
}
