//! Validates a closed set of `const` values, reporting the specific value
//! that was rejected rather than the engine's generic "does not match any
//! variant" message.

use jsonschema::paths::{JsonPointer, JsonPointerNode};
use jsonschema::{ValidationOptions, ErrorIterator, Keyword, ValidationError};
use serde_json::{Map, Value};

use super::{custom_error, no_errors};

struct EnumOneOf {
    values: Vec<Value>,
    schema_path: JsonPointer,
}

impl Keyword for EnumOneOf {
    fn validate<'instance>(
        &self,
        instance: &'instance Value,
        instance_path: &JsonPointerNode,
    ) -> ErrorIterator<'instance> {
        if self.values.iter().any(|v| v == instance) {
            return no_errors();
        }
        let message = format!("'{instance}' is not a valid enumeration value");
        Box::new(std::iter::once(custom_error(instance, instance_path, self.schema_path.clone(), message)))
    }

    fn is_valid(&self, instance: &Value) -> bool {
        self.values.iter().any(|v| v == instance)
    }
}

pub(crate) fn register(options: &mut ValidationOptions) {
    options.with_keyword("enum_oneof", move |parent: &Map<String, Value>, _value: &Value, schema_path| {
        build(parent, schema_path)
    });
}

fn build<'a>(parent: &'a Map<String, Value>, schema_path: JsonPointer) -> Result<Box<dyn Keyword>, ValidationError<'a>> {
    let values = parent
        .get("enum_oneof_values")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    Ok(Box::new(EnumOneOf { values, schema_path }))
}
