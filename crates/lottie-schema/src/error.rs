//! Errors returned while constructing a [`crate::LottieSchema`].
//!
//! Failures that occur while *validating* a document are not modeled as
//! `Result` errors at all: they become [`crate::Diagnostic`] values, per the
//! two-diagnostic convention for unparsable input.

use thiserror::Error;

/// Failure to build a usable [`crate::LottieSchema`] from a schema document.
///
/// This type is `#[non_exhaustive]`: new failure modes may be added as the
/// schema-preparation pipeline grows without it being a breaking change.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SchemaError {
    /// The `jsonschema` crate rejected the (possibly rewritten) schema
    /// document outright. `ValidationOptions::build` hands back a
    /// `'static` error, so the engine's own diagnostic can be kept as-is
    /// rather than flattened to a string.
    #[error("schema failed to compile: {0}")]
    Compile(#[from] jsonschema::ValidationError<'static>),

    /// A category/object pair referenced by the rewriter (e.g. from a
    /// discriminated union's member list) does not exist under `$defs`.
    #[error("schema is missing required definition at {pointer}")]
    MissingDefs { pointer: String },

    /// The root document has no usable `$id`, so compiled sub-schemas have
    /// no base URI to resolve internal `$ref`s against.
    #[error("schema document has no usable $id")]
    InvalidRootId,

    /// The root document is not a JSON object.
    #[error("schema document must be a JSON object")]
    NotAnObject,

    /// The rewritten document could not be registered as an external
    /// resource under its own `$id`, so sub-schema compiles have nothing to
    /// resolve `<rootId>#/$defs/...` references against.
    #[error("schema document could not be registered as a resource: {0}")]
    InvalidResource(String),
}
