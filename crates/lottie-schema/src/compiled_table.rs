//! Holds one compiled [`jsonschema::Validator`] per named `$defs` node,
//! so that dispatch keywords (`ty_oneof`, `prop_oneof`, ...) can validate an
//! instance against exactly the variant its discriminant selects instead of
//! relying on the engine's own `oneOf`, which would try every branch and
//! report failures for all of them at once.

use std::collections::HashMap;

use jsonschema::Validator;
use once_cell::sync::OnceCell;

use crate::schema_id::SchemaId;

/// Populated once, during [`crate::LottieSchema::new`], before any
/// validation happens; read-only for the lifetime of the owning
/// `LottieSchema`.
#[derive(Default)]
pub(crate) struct CompiledTable {
    inner: OnceCell<HashMap<SchemaId, Validator>>,
}

impl CompiledTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Must be called exactly once, after every entry has been compiled.
    pub(crate) fn finish(&self, entries: HashMap<SchemaId, Validator>) {
        // `set` only fails if already populated, which would be a
        // construction-order bug in this crate rather than a user-facing
        // condition, so silently keeping the first value is fine.
        let _ = self.inner.set(entries);
    }

    pub(crate) fn get(&self, id: &SchemaId) -> Option<&Validator> {
        self.inner.get().and_then(|map| map.get(id))
    }
}
