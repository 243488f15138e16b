//! Flags properties on a closed object that no known variant declares.
//!
//! The keyword value is the [`crate::schema_id::SchemaId`] of the node
//! [`crate::rewriter`] attached it to; the actual set of recognized names
//! lives in the [`PropertyIndex`] built after rewriting, not in the schema
//! document itself, so this keyword looks the set up by id rather than
//! carrying its own copy.

use std::sync::Arc;

use jsonschema::paths::{JsonPointer, JsonPointerNode, PathChunk};
use jsonschema::{ValidationOptions, ErrorIterator, Keyword, ValidationError};
use serde_json::{Map, Value};

use crate::property_index::PropertyIndex;
use crate::schema_id::SchemaId;

use super::{custom_error_at, no_errors, WARNING_PROPERTY_PREFIX};

struct WarnExtraProps {
    id: SchemaId,
    properties: Arc<PropertyIndex>,
    schema_path: JsonPointer,
}

impl Keyword for WarnExtraProps {
    fn validate<'instance>(
        &self,
        instance: &'instance Value,
        instance_path: &JsonPointerNode,
    ) -> ErrorIterator<'instance> {
        let Some(object) = instance.as_object() else {
            return no_errors();
        };
        let Some(list) = self.properties.get(&self.id) else {
            return no_errors();
        };
        if list.open || self.properties.referenced_as_base.contains(&self.id) {
            return no_errors();
        }
        let base = JsonPointer::from(instance_path);
        let mut errors = Vec::new();
        for key in object.keys() {
            if list.names.contains(key) {
                continue;
            }
            let mut chunks: Vec<PathChunk> = base.iter().cloned().collect();
            chunks.push(PathChunk::from(key.clone()));
            errors.push(custom_error_at(
                instance,
                JsonPointer::from(&chunks[..]),
                self.schema_path.clone(),
                format!("{WARNING_PROPERTY_PREFIX}has unknown property '{key}'"),
            ));
        }
        Box::new(errors.into_iter())
    }

    fn is_valid(&self, instance: &Value) -> bool {
        let Some(object) = instance.as_object() else {
            return true;
        };
        let Some(list) = self.properties.get(&self.id) else {
            return true;
        };
        if list.open || self.properties.referenced_as_base.contains(&self.id) {
            return true;
        }
        object.keys().all(|key| list.names.contains(key))
    }
}

pub(crate) fn register(options: &mut ValidationOptions, properties: Arc<PropertyIndex>) {
    options.with_keyword("warn_extra_props", move |_parent: &Map<String, Value>, value: &Value, schema_path| {
        build(value, schema_path, Arc::clone(&properties))
    });
}

fn build<'a>(
    value: &'a Value,
    schema_path: JsonPointer,
    properties: Arc<PropertyIndex>,
) -> Result<Box<dyn Keyword>, ValidationError<'a>> {
    let id = SchemaId::new(value.as_str().unwrap_or_default());
    Ok(Box::new(WarnExtraProps { id, properties, schema_path }))
}
