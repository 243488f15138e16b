//! Custom `jsonschema` keywords that give the dispatch and sequencing
//! behavior the rewriter wires into the document (see [`crate::rewriter`]).
//!
//! Every keyword here is attached via [`jsonschema::ValidationOptions::with_keyword`]
//! rather than expressed with the engine's own `oneOf`/`allOf`, because each
//! one needs something the stock keywords cannot do on their own: picking a
//! single variant by discriminant instead of trying all of them, reaching
//! into the compiled-validator table for a sibling definition, or inspecting
//! more than one array element at a time.

mod asset_oneof;
mod enum_oneof;
mod keyframe_sequence;
mod prop_oneof;
mod reference_asset;
mod splitpos_oneof;
mod ty_oneof;
mod warn_extra_props;

use std::borrow::Cow;
use std::sync::{Arc, Weak};

use jsonschema::paths::{JsonPointer, JsonPointerNode, PathChunk};
use jsonschema::{ValidationOptions, ErrorIterator, ValidationError};
use serde_json::Value;

use crate::compiled_table::CompiledTable;
use crate::property_index::PropertyIndex;

pub(crate) fn register_all(
    options: &mut ValidationOptions,
    table: &Weak<CompiledTable>,
    properties: Arc<PropertyIndex>,
) {
    ty_oneof::register(options, Weak::clone(table));
    prop_oneof::register(options);
    splitpos_oneof::register(options);
    asset_oneof::register(options, Weak::clone(table));
    enum_oneof::register(options);
    keyframe_sequence::register(options);
    reference_asset::register(options);
    warn_extra_props::register(options, properties);
}

/// Prefix recognized by [`crate::validator`] when turning a raw
/// `jsonschema` error into a [`crate::Diagnostic`]: everything these
/// dispatch keywords know to be advisory rather than fatal (an unrecognized
/// `ty`, an unrecognized `s`, an unexpected property) is still reported
/// through the engine's normal error channel, tagged so the post-processing
/// step can re-home it as a warning instead of an error.
pub(crate) const WARNING_TYPE_PREFIX: &str = "\u{1}warning:type\u{1}";
pub(crate) const WARNING_PROPERTY_PREFIX: &str = "\u{1}warning:property\u{1}";

pub(crate) fn no_errors<'instance>() -> ErrorIterator<'instance> {
    Box::new(std::iter::empty())
}

pub(crate) fn custom_error<'instance>(
    instance: &'instance Value,
    instance_path: &JsonPointerNode,
    schema_path: JsonPointer,
    message: impl Into<String>,
) -> ValidationError<'instance> {
    custom_error_at(instance, JsonPointer::from(instance_path), schema_path, message)
}

/// Like [`custom_error`] but for callers that already built an
/// [`JsonPointer`] covering more than the keyword's own instance path, such
/// as one extended with an array index.
pub(crate) fn custom_error_at<'instance>(
    instance: &'instance Value,
    instance_path: JsonPointer,
    schema_path: JsonPointer,
    message: impl Into<String>,
) -> ValidationError<'instance> {
    ValidationError::custom(schema_path, instance_path, instance, message)
}

/// Re-roots every error produced by a delegated sub-validator so its
/// `instance_path`/`schema_path` read as if the sub-validator's schema had
/// been inlined at `outer_instance_path`/`outer_schema_path`, and converts
/// it to an owned, `'static` error: the sub-validator is looked up through
/// an `Arc` that does not outlive this function call, so nothing borrowed
/// from it can be part of the returned iterator.
pub(crate) fn rebase_errors<'instance>(
    errors: impl Iterator<Item = ValidationError<'_>>,
    outer_instance_path: &JsonPointerNode,
    outer_schema_path: &JsonPointer,
) -> ErrorIterator<'instance> {
    let outer_instance_path = JsonPointer::from(outer_instance_path);
    let rebased: Vec<ValidationError<'static>> = errors
        .map(|error| {
            let mut instance_path: Vec<PathChunk> = outer_instance_path.iter().cloned().collect();
            instance_path.extend(error.instance_path.iter().cloned());
            let mut schema_path: Vec<PathChunk> = outer_schema_path.iter().cloned().collect();
            schema_path.extend(error.schema_path.iter().cloned());
            ValidationError {
                instance: Cow::Owned(error.instance.into_owned()),
                kind: error.kind,
                instance_path: JsonPointer::from(&instance_path[..]),
                schema_path: JsonPointer::from(&schema_path[..]),
            }
        })
        .collect();
    Box::new(rebased.into_iter())
}
