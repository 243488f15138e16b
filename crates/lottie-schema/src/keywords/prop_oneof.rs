//! Validates the `a`/`k` shape shared by every animated property: `a == 0`
//! (or absent) means `k` holds a bare value, `a == 1` means `k` holds a
//! non-empty array of keyframe objects.
//!
//! Unlike [`super::ty_oneof`], the two branches here are not separate named
//! `$defs` entries -- they are two shapes of the same `k` property -- so
//! this keyword checks the shape directly instead of delegating to a
//! compiled sibling schema.

use jsonschema::paths::{JsonPointer, JsonPointerNode};
use jsonschema::{ValidationOptions, ErrorIterator, Keyword, ValidationError};
use serde_json::{Map, Value};

use super::{custom_error, no_errors};

struct PropOneOf {
    field: String,
    schema_path: JsonPointer,
}

fn is_animated(instance: &Value, field: &str) -> bool {
    matches!(instance.get(field), Some(Value::Number(n)) if n.as_i64() == Some(1))
}

impl Keyword for PropOneOf {
    fn validate<'instance>(
        &self,
        instance: &'instance Value,
        instance_path: &JsonPointerNode,
    ) -> ErrorIterator<'instance> {
        let Some(k) = instance.get("k") else {
            return no_errors();
        };
        let animated = is_animated(instance, &self.field);
        if animated && !k.is_array() {
            return Box::new(std::iter::once(custom_error(
                k,
                instance_path,
                self.schema_path.clone(),
                "animated property must hold an array of keyframes when a == 1",
            )));
        }
        if !animated && k.is_array() {
            return Box::new(std::iter::once(custom_error(
                k,
                instance_path,
                self.schema_path.clone(),
                "static property must not hold an array of keyframes when a == 0",
            )));
        }
        no_errors()
    }

    fn is_valid(&self, instance: &Value) -> bool {
        let Some(k) = instance.get("k") else {
            return true;
        };
        is_animated(instance, &self.field) == k.is_array()
    }
}

pub(crate) fn register(options: &mut ValidationOptions) {
    options.with_keyword("prop_oneof", move |parent: &Map<String, Value>, _value: &Value, schema_path| {
        build(parent, schema_path)
    });
}

fn build<'a>(parent: &'a Map<String, Value>, schema_path: JsonPointer) -> Result<Box<dyn Keyword>, ValidationError<'a>> {
    let field = parent
        .get("prop_oneof_field")
        .and_then(Value::as_str)
        .unwrap_or("a")
        .to_string();
    Ok(Box::new(PropOneOf { field, schema_path }))
}
