//! Dispatches a discriminated-union node (layers, shapes, effects, ...) to
//! the single variant its `ty` value names, instead of the engine trying
//! every branch and reporting all of their failures at once.

use std::sync::Weak;

use jsonschema::paths::{JsonPointer, JsonPointerNode};
use jsonschema::{ValidationOptions, ErrorIterator, Keyword, ValidationError};
use serde_json::{Map, Value};

use crate::compiled_table::CompiledTable;
use crate::schema_id::SchemaId;

use super::{custom_error, no_errors, rebase_errors, WARNING_TYPE_PREFIX};

struct Variant {
    tag: Value,
    category: String,
    object: String,
}

struct TyOneOf {
    table: Weak<CompiledTable>,
    root_id: String,
    field: String,
    variants: Vec<Variant>,
    schema_path: JsonPointer,
}

impl TyOneOf {
    fn variant_schema_id(&self, variant: &Variant) -> SchemaId {
        SchemaId::for_object(&self.root_id, &variant.category, &variant.object)
    }

    fn matching_variant(&self, tag: &Value) -> Option<&Variant> {
        self.variants.iter().find(|v| &v.tag == tag)
    }
}

impl Keyword for TyOneOf {
    fn validate<'instance>(
        &self,
        instance: &'instance Value,
        instance_path: &JsonPointerNode,
    ) -> ErrorIterator<'instance> {
        let Some(tag) = instance.get(&self.field) else {
            return no_errors();
        };
        let Some(variant) = self.matching_variant(tag) else {
            let message = format!("{WARNING_TYPE_PREFIX}unknown '{}' value {}", self.field, tag);
            return Box::new(std::iter::once(custom_error(
                instance,
                instance_path,
                self.schema_path.clone(),
                message,
            )));
        };
        let id = self.variant_schema_id(variant);
        let Some(table) = self.table.upgrade() else {
            return no_errors();
        };
        match table.get(&id) {
            Some(compiled) => match compiled.validate(instance) {
                Ok(()) => no_errors(),
                Err(errors) => rebase_errors(errors, instance_path, &self.schema_path),
            },
            None => no_errors(),
        }
    }

    fn is_valid(&self, instance: &Value) -> bool {
        let Some(tag) = instance.get(&self.field) else {
            return true;
        };
        let Some(variant) = self.matching_variant(tag) else {
            return false;
        };
        let id = self.variant_schema_id(variant);
        let Some(table) = self.table.upgrade() else {
            return true;
        };
        table.get(&id).map(|compiled| compiled.is_valid(instance)).unwrap_or(true)
    }
}

pub(crate) fn register(options: &mut ValidationOptions, table: Weak<CompiledTable>) {
    options.with_keyword("ty_oneof", move |parent: &Map<String, Value>, value: &Value, schema_path| {
        build(parent, value, schema_path, Weak::clone(&table))
    });
}

fn build<'a>(
    parent: &'a Map<String, Value>,
    value: &'a Value,
    schema_path: JsonPointer,
    table: Weak<CompiledTable>,
) -> Result<Box<dyn Keyword>, ValidationError<'a>> {
    let root_id = value.as_str().unwrap_or_default().to_string();
    let field = parent
        .get("ty_oneof_field")
        .and_then(Value::as_str)
        .unwrap_or("ty")
        .to_string();
    let variants = parent
        .get("ty_oneof_variants")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(|entry| {
                    Some(Variant {
                        tag: entry.get("tag")?.clone(),
                        category: entry.get("category")?.as_str()?.to_string(),
                        object: entry.get("object")?.as_str()?.to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    Ok(Box::new(TyOneOf {
        table,
        root_id,
        field,
        variants,
        schema_path,
    }))
}
