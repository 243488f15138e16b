//! Assets have no shared discriminant field, but they do differ in document
//! shape: a precomposition asset carries its own `layers` array, an image
//! asset does not. Route directly on that shape rather than trying every
//! candidate asset definition in turn and keeping whichever came closest.

use std::sync::Weak;

use jsonschema::paths::{JsonPointer, JsonPointerNode};
use jsonschema::{ValidationOptions, ErrorIterator, Keyword, ValidationError};
use serde_json::{Map, Value};

use crate::compiled_table::CompiledTable;
use crate::schema_id::SchemaId;

use super::{custom_error, no_errors, WARNING_TYPE_PREFIX};

const PRECOMPOSITION_ASSET: &str = "precomposition-asset";
const IMAGE_ASSET: &str = "image-asset";

struct AssetOneOf {
    table: Weak<CompiledTable>,
    root_id: String,
    schema_path: JsonPointer,
}

impl AssetOneOf {
    /// `data.layers` present means this is a precomposition asset; absent
    /// means an image asset. Every asset routes to exactly one of the two.
    fn kind(instance: &Value) -> &'static str {
        if instance.get("layers").is_some() {
            PRECOMPOSITION_ASSET
        } else {
            IMAGE_ASSET
        }
    }
}

impl Keyword for AssetOneOf {
    fn validate<'instance>(
        &self,
        instance: &'instance Value,
        instance_path: &JsonPointerNode,
    ) -> ErrorIterator<'instance> {
        let Some(table) = self.table.upgrade() else {
            return no_errors();
        };
        let id = SchemaId::for_object(&self.root_id, "assets", Self::kind(instance));
        let Some(compiled) = table.get(&id) else {
            return no_errors();
        };
        if compiled.is_valid(instance) {
            return no_errors();
        }
        let message = format!("{WARNING_TYPE_PREFIX}asset does not match any known asset type");
        Box::new(std::iter::once(custom_error(instance, instance_path, self.schema_path.clone(), message)))
    }

    fn is_valid(&self, instance: &Value) -> bool {
        let Some(table) = self.table.upgrade() else {
            return true;
        };
        let id = SchemaId::for_object(&self.root_id, "assets", Self::kind(instance));
        table.get(&id).map(|compiled| compiled.is_valid(instance)).unwrap_or(true)
    }
}

pub(crate) fn register(options: &mut ValidationOptions, table: Weak<CompiledTable>) {
    options.with_keyword("asset_oneof", move |_parent: &Map<String, Value>, value: &Value, schema_path| {
        build(value, schema_path, Weak::clone(&table))
    });
}

fn build<'a>(
    value: &'a Value,
    schema_path: JsonPointer,
    table: Weak<CompiledTable>,
) -> Result<Box<dyn Keyword>, ValidationError<'a>> {
    let root_id = value.as_str().unwrap_or_default().to_string();
    Ok(Box::new(AssetOneOf { table, root_id, schema_path }))
}
