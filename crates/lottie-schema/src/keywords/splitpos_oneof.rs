//! Validates `splittable-position-property`'s `s` discriminator: when `s`
//! is `true` the position is split into independently animated `x`/`y`
//! (and optionally `z`) components instead of a single multi-dimensional
//! `k`. A missing `s` is treated as `false` without comment -- the
//! original schema leaves it optional and defaulted, not an omission worth
//! warning about. An `s` present but not a boolean is the one case worth
//! flagging, since it signals a malformed document rather than a simple
//! default.

use jsonschema::paths::{JsonPointer, JsonPointerNode};
use jsonschema::{ValidationOptions, ErrorIterator, Keyword, ValidationError};
use serde_json::{Map, Value};

use super::{custom_error, no_errors, WARNING_TYPE_PREFIX};

struct SplitPosOneOf {
    field: String,
    schema_path: JsonPointer,
}

impl Keyword for SplitPosOneOf {
    fn validate<'instance>(
        &self,
        instance: &'instance Value,
        instance_path: &JsonPointerNode,
    ) -> ErrorIterator<'instance> {
        let Some(s) = instance.get(&self.field) else {
            return no_errors();
        };
        let Some(split) = s.as_bool() else {
            let message = format!("{WARNING_TYPE_PREFIX}splittable position's {} must be a boolean", self.field);
            return Box::new(std::iter::once(custom_error(s, instance_path, self.schema_path.clone(), message)));
        };

        let has_split_shape = instance.get("x").is_some() || instance.get("y").is_some();
        let has_joint_shape = instance.get("k").is_some();
        if split && !has_split_shape {
            return Box::new(std::iter::once(custom_error(
                instance,
                instance_path,
                self.schema_path.clone(),
                "split position must provide x/y (and optionally z) components",
            )));
        }
        if !split && has_split_shape && !has_joint_shape {
            return Box::new(std::iter::once(custom_error(
                instance,
                instance_path,
                self.schema_path.clone(),
                "unsplit position must provide a single k value",
            )));
        }
        no_errors()
    }

    fn is_valid(&self, instance: &Value) -> bool {
        let split = instance.get(&self.field).and_then(Value::as_bool).unwrap_or(false);
        let has_split_shape = instance.get("x").is_some() || instance.get("y").is_some();
        split == has_split_shape
    }
}

pub(crate) fn register(options: &mut ValidationOptions) {
    options.with_keyword(
        "splitpos_oneof",
        move |parent: &Map<String, Value>, _value: &Value, schema_path| build(parent, schema_path),
    );
}

fn build<'a>(parent: &'a Map<String, Value>, schema_path: JsonPointer) -> Result<Box<dyn Keyword>, ValidationError<'a>> {
    let field = parent
        .get("splitpos_oneof_field")
        .and_then(Value::as_str)
        .unwrap_or("s")
        .to_string();
    Ok(Box::new(SplitPosOneOf { field, schema_path }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    fn keyword() -> SplitPosOneOf {
        SplitPosOneOf {
            field: "s".to_string(),
            schema_path: JsonPointer::default(),
        }
    }

    #[test_case(json!({"k": [0, 0]}) ; "unsplit with k is valid")]
    #[test_case(json!({"s": false, "k": [0, 0]}) ; "explicit false with k is valid")]
    #[test_case(json!({"s": true, "x": {"a": 0, "k": 0}, "y": {"a": 0, "k": 0}}) ; "split with x/y is valid")]
    fn accepts(instance: Value) {
        assert!(keyword().is_valid(&instance));
    }

    #[test_case(json!({"s": true}) ; "split with no x/y is invalid")]
    #[test_case(json!({"s": false, "x": {"a": 0, "k": 0}}) ; "unsplit claiming x is invalid")]
    fn rejects(instance: Value) {
        assert!(!keyword().is_valid(&instance));
    }

    #[test]
    fn missing_s_defaults_to_unsplit_without_a_warning() {
        let instance = json!({"k": [1, 2]});
        let mut errors = keyword().validate(&instance, &JsonPointerNode::new());
        assert!(errors.next().is_none());
    }

    #[test]
    fn non_boolean_s_is_a_type_warning() {
        let instance = json!({"s": "yes", "k": [1, 2]});
        let mut errors = keyword().validate(&instance, &JsonPointerNode::new());
        let message = errors.next().expect("one error").to_string();
        assert!(message.contains(WARNING_TYPE_PREFIX));
    }
}
