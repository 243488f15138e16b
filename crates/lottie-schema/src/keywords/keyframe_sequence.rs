//! Cross-element checks over an array of keyframes that no single
//! keyframe's own schema can express: ascending `t`, at most two keyframes
//! coincident at the same `t` (a deliberate hold), and matching easing
//! handles between neighbors.
//!
//! Earlier drafts of this check only looked for a combined `io` field and
//! treated its absence as one error for the pair; that missed the case
//! where exactly one of `i`/`o` is present. Both fields are checked
//! independently here, and a keyframe missing either one gets its own
//! diagnostic naming the specific missing field.

use jsonschema::paths::{JsonPointer, JsonPointerNode, PathChunk};
use jsonschema::{ValidationOptions, ErrorIterator, Keyword, ValidationError};
use serde_json::{Map, Value};

use super::{custom_error_at, no_errors};

struct KeyframeSequence {
    schema_path: JsonPointer,
}

fn extend(instance_path: &JsonPointerNode, index: usize) -> JsonPointer {
    let base = JsonPointer::from(instance_path);
    let mut chunks: Vec<PathChunk> = base.iter().cloned().collect();
    chunks.push(PathChunk::Index(index));
    JsonPointer::from(&chunks[..])
}

impl Keyword for KeyframeSequence {
    fn validate<'instance>(
        &self,
        instance: &'instance Value,
        instance_path: &JsonPointerNode,
    ) -> ErrorIterator<'instance> {
        let Some(items) = instance.as_array() else {
            return no_errors();
        };
        let mut errors = Vec::new();
        let mut prev_t: Option<f64> = None;
        let mut coincident_run: u32 = 1;

        for (index, keyframe) in items.iter().enumerate() {
            let is_last = index + 1 == items.len();
            let is_hold = keyframe.get("h").and_then(Value::as_bool).unwrap_or(false);
            if !is_last && !is_hold {
                for field in ["i", "o"] {
                    if keyframe.get(field).is_none() {
                        errors.push(custom_error_at(
                            keyframe,
                            extend(instance_path, index),
                            self.schema_path.clone(),
                            format!("keyframe is missing required field '{field}'"),
                        ));
                    }
                }
            }

            if let Some(t) = keyframe.get("t").and_then(Value::as_f64) {
                match prev_t {
                    Some(previous) if t < previous => {
                        errors.push(custom_error_at(
                            keyframe,
                            extend(instance_path, index),
                            self.schema_path.clone(),
                            "keyframe 't' must be in ascending order",
                        ));
                        coincident_run = 1;
                    }
                    Some(previous) if (t - previous).abs() < f64::EPSILON => {
                        coincident_run += 1;
                        if coincident_run > 2 {
                            errors.push(custom_error_at(
                                keyframe,
                                extend(instance_path, index),
                                self.schema_path.clone(),
                                "there can be at most 2 keyframes with the same 't' value",
                            ));
                        }
                    }
                    _ => coincident_run = 1,
                }
                prev_t = Some(t);
            }
        }

        Box::new(errors.into_iter())
    }

    fn is_valid(&self, instance: &Value) -> bool {
        let Some(items) = instance.as_array() else {
            return true;
        };
        let mut prev_t: Option<f64> = None;
        let mut coincident_run: u32 = 1;
        for (index, keyframe) in items.iter().enumerate() {
            let is_last = index + 1 == items.len();
            let is_hold = keyframe.get("h").and_then(Value::as_bool).unwrap_or(false);
            if !is_last && !is_hold && (keyframe.get("i").is_none() || keyframe.get("o").is_none()) {
                return false;
            }
            if let Some(t) = keyframe.get("t").and_then(Value::as_f64) {
                match prev_t {
                    Some(previous) if t < previous => return false,
                    Some(previous) if (t - previous).abs() < f64::EPSILON => {
                        coincident_run += 1;
                        if coincident_run > 2 {
                            return false;
                        }
                    }
                    _ => coincident_run = 1,
                }
                prev_t = Some(t);
            }
        }
        true
    }
}

pub(crate) fn register(options: &mut ValidationOptions) {
    options.with_keyword("keyframe_sequence", move |_parent: &Map<String, Value>, _value: &Value, schema_path| {
        build(schema_path)
    });
}

fn build<'a>(schema_path: JsonPointer) -> Result<Box<dyn Keyword>, ValidationError<'a>> {
    Ok(Box::new(KeyframeSequence { schema_path }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keyword() -> KeyframeSequence {
        KeyframeSequence { schema_path: JsonPointer::default() }
    }

    #[test]
    fn ascending_keyframes_with_handles_are_valid() {
        let instance = json!([
            {"t": 0, "i": {"x": [0]}, "o": {"x": [1]}},
            {"t": 10, "i": {"x": [0]}, "o": {"x": [1]}},
            {"t": 20}
        ]);
        assert!(keyword().is_valid(&instance));
    }

    #[test]
    fn out_of_order_t_is_invalid() {
        let instance = json!([{"t": 10}, {"t": 0}]);
        assert!(!keyword().is_valid(&instance));
    }

    #[test]
    fn three_coincident_keyframes_are_invalid() {
        let instance = json!([{"t": 0}, {"t": 0}, {"t": 0}]);
        assert!(!keyword().is_valid(&instance));
    }

    #[test]
    fn two_coincident_keyframes_are_a_valid_hold() {
        let instance = json!([
            {"t": 0, "i": {"x": [0]}, "o": {"x": [1]}},
            {"t": 0}
        ]);
        assert!(keyword().is_valid(&instance));
    }

    #[test]
    fn a_hold_keyframe_does_not_need_i_or_o() {
        let instance = json!([{"t": 0, "h": true}, {"t": 10}]);
        assert!(keyword().is_valid(&instance));
    }

    #[test]
    fn missing_just_one_of_i_or_o_is_its_own_diagnostic() {
        let instance = json!([{"t": 0, "i": {"x": [0]}}, {"t": 10}]);
        let errors: Vec<_> = keyword().validate(&instance, &JsonPointerNode::new()).collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains('o'));
    }

    #[test]
    fn last_keyframe_does_not_need_handles() {
        let instance = json!([{"t": 0, "i": {"x": [0]}, "o": {"x": [1]}}, {"t": 10}]);
        assert!(keyword().is_valid(&instance));
    }
}
