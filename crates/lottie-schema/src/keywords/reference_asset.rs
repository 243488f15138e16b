//! Checks that every layer's `refId` names an asset actually present in the
//! document's top-level `assets` array.
//!
//! This is the one keyword in this module that operates on the whole
//! document rather than a single field: it is attached to the root schema
//! object by [`crate::rewriter::rewrite`], so its `instance` is the entire
//! animation, not a single layer.

use jsonschema::paths::{JsonPointer, JsonPointerNode, PathChunk};
use jsonschema::{ValidationOptions, ErrorIterator, Keyword, ValidationError};
use serde_json::{Map, Value};
use std::collections::HashSet;

use super::custom_error_at;

struct ReferenceAsset;

fn known_asset_ids(document: &Value) -> HashSet<&str> {
    document
        .get("assets")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|asset| asset.get("id").and_then(Value::as_str))
        .collect()
}

/// Walks `layers` arrays (top-level and nested inside precomposition
/// assets) collecting `(refId, path)` pairs.
fn layer_lists<'a>(document: &'a Value) -> Vec<(&'a Value, Vec<PathChunk>)> {
    let mut lists = Vec::new();
    if let Some(layers) = document.get("layers") {
        lists.push((layers, vec![PathChunk::from("layers".to_string())]));
    }
    if let Some(assets) = document.get("assets").and_then(Value::as_array) {
        for (index, asset) in assets.iter().enumerate() {
            if let Some(layers) = asset.get("layers") {
                lists.push((
                    layers,
                    vec![
                        PathChunk::from("assets".to_string()),
                        PathChunk::Index(index),
                        PathChunk::from("layers".to_string()),
                    ],
                ));
            }
        }
    }
    lists
}

impl Keyword for ReferenceAsset {
    fn validate<'instance>(
        &self,
        instance: &'instance Value,
        instance_path: &JsonPointerNode,
    ) -> ErrorIterator<'instance> {
        let known = known_asset_ids(instance);
        let base = JsonPointer::from(instance_path);
        let schema_path = JsonPointer::from(&[PathChunk::Keyword("reference_asset")][..]);

        let mut errors = Vec::new();
        for (layers, prefix) in layer_lists(instance) {
            let Some(layers) = layers.as_array() else { continue };
            for (index, layer) in layers.iter().enumerate() {
                let Some(ref_id) = layer.get("refId").and_then(Value::as_str) else {
                    continue;
                };
                if !known.contains(ref_id) {
                    let mut chunks: Vec<PathChunk> = base.iter().cloned().collect();
                    chunks.extend(prefix.iter().cloned());
                    chunks.push(PathChunk::Index(index));
                    chunks.push(PathChunk::from("refId".to_string()));
                    errors.push(custom_error_at(
                        layer,
                        JsonPointer::from(&chunks[..]),
                        schema_path.clone(),
                        format!("\"{ref_id}\" is not a valid asset id"),
                    ));
                }
            }
        }
        Box::new(errors.into_iter())
    }

    fn is_valid(&self, instance: &Value) -> bool {
        let known = known_asset_ids(instance);
        layer_lists(instance).into_iter().all(|(layers, _)| {
            layers
                .as_array()
                .into_iter()
                .flatten()
                .filter_map(|layer| layer.get("refId").and_then(Value::as_str))
                .all(|ref_id| known.contains(ref_id))
        })
    }
}

pub(crate) fn register(options: &mut ValidationOptions) {
    options.with_keyword("reference_asset", |_parent: &Map<String, Value>, _value: &Value, _schema_path| {
        build()
    });
}

fn build<'a>() -> Result<Box<dyn Keyword>, ValidationError<'a>> {
    Ok(Box::new(ReferenceAsset))
}
