//! The documentation-linked diagnostic model produced by validation.

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use serde_json::Value;

/// Whether a diagnostic is fatal to the document or merely advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticType {
    Error,
    Warning,
}

/// The two flavors of warning a closed-world schema walk can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// An object carries a property no known variant declares.
    Property,
    /// A discriminated union matched no known `ty`/`s` variant.
    Type,
}

/// A single finding against an input document.
///
/// Serializes to the flat JSON shape `{ type, warning?, message, path, name,
/// docs?, path_names? }` rather than mirroring this struct's field layout
/// one-to-one, since `type`/`warning` collapse two Rust enums into one JSON
/// string field plus an optional sibling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticType,
    pub warning_kind: Option<WarningKind>,
    pub message: String,
    /// JSON Pointer (RFC 6901) into the instance document.
    pub path: String,
    /// The schema-graph name associated with the failing location, e.g.
    /// `"image-layer"` or `"splittable-position-property"`.
    pub name: String,
    /// Link to human documentation for `name`, present when the schema was
    /// annotated with `_docs` and the engine was constructed with a
    /// `docs_url`.
    pub docs: Option<String>,
    /// When name-paths mode is enabled, the `nm` value of every ancestor
    /// carrying a `ty` on the way down to `path`, outermost first. An
    /// ancestor's `nm` may itself be `null`, hence the inner `Option`.
    pub path_names: Option<Vec<Option<String>>>,
}

impl Diagnostic {
    pub(crate) fn error(message: impl Into<String>, path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticType::Error,
            warning_kind: None,
            message: message.into(),
            path: path.into(),
            name: name.into(),
            docs: None,
            path_names: None,
        }
    }

    pub(crate) fn warning(
        warning_kind: WarningKind,
        message: impl Into<String>,
        path: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            kind: DiagnosticType::Warning,
            warning_kind: Some(warning_kind),
            message: message.into(),
            path: path.into(),
            name: name.into(),
            docs: None,
            path_names: None,
        }
    }

    /// The two fixed diagnostics returned when input cannot be parsed as
    /// JSON at all: a fixed first message, then the underlying parser's own
    /// message, so the user still sees line/column detail.
    pub(crate) fn unparsable(parse_error: impl std::fmt::Display) -> Vec<Self> {
        vec![
            Self::error("Document is not a valid JSON file", "", "document"),
            Self::error(parse_error.to_string(), "", "document"),
        ]
    }

    pub(crate) fn with_docs(mut self, docs: Option<String>) -> Self {
        self.docs = docs;
        self
    }

    pub(crate) fn with_path_names(mut self, path_names: Vec<Option<String>>) -> Self {
        self.path_names = Some(path_names);
        self
    }
}

impl Serialize for Diagnostic {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut len = 3;
        if self.warning_kind.is_some() {
            len += 1;
        }
        if self.docs.is_some() {
            len += 1;
        }
        if self.path_names.is_some() {
            len += 1;
        }
        let mut state = serializer.serialize_struct("Diagnostic", len)?;
        match self.kind {
            DiagnosticType::Error => state.serialize_field("type", "error")?,
            DiagnosticType::Warning => state.serialize_field("type", "warning")?,
        }
        if let Some(kind) = self.warning_kind {
            match kind {
                WarningKind::Property => state.serialize_field("warning", "property")?,
                WarningKind::Type => state.serialize_field("warning", "type")?,
            }
        }
        state.serialize_field("message", &self.message)?;
        state.serialize_field("path", &self.path)?;
        state.serialize_field("name", &self.name)?;
        if let Some(docs) = &self.docs {
            state.serialize_field("docs", docs)?;
        }
        if let Some(path_names) = &self.path_names {
            state.serialize_field("path_names", path_names)?;
        }
        state.end()
    }
}

/// The two ways a document can be handed to [`crate::LottieSchema::validate`].
pub enum Input<'a> {
    Str(&'a str),
    Object(&'a Value),
}

impl<'a> From<&'a str> for Input<'a> {
    fn from(value: &'a str) -> Self {
        Input::Str(value)
    }
}

impl<'a> From<&'a Value> for Input<'a> {
    fn from(value: &'a Value) -> Self {
        Input::Object(value)
    }
}
