//! Stable identifiers for named nodes in the schema graph.

use std::fmt;

/// A key of the form `<rootId>#/$defs/<category>/<object>`.
///
/// Identifiers are the stable keys into [`crate::property_index::PropertyIndex`]
/// and into the compiled-validator table built by [`crate::validator`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(String);

impl SchemaId {
    pub(crate) fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Build an identifier from a root id and a `$defs` category/object pair.
    ///
    /// `root_id` is trimmed of any trailing `#` first: schema `$id`s
    /// conventionally end in `#` (`".../lottie.schema.json#"`), and
    /// composing the fragment on top of that as-is would produce a
    /// double-`#` id whose `pointer()` tail doesn't start with `/`.
    pub(crate) fn for_object(root_id: &str, category: &str, object: &str) -> Self {
        let root_id = root_id.trim_end_matches('#');
        Self(format!("{root_id}#/$defs/{category}/{object}"))
    }

    /// The JSON Pointer tail (`/$defs/<category>/<object>`), usable with
    /// `serde_json::Value::pointer`.
    pub(crate) fn pointer(&self) -> &str {
        match self.0.split_once('#') {
            Some((_, tail)) => tail,
            None => &self.0,
        }
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SchemaId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
