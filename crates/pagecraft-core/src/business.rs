//! Read-only view of the business-data document: the real-world entity a
//! page renders. Migration units may inspect it to pick context-sensitive
//! defaults for entity bindings; there is deliberately no mutation API.

use serde_json::Value as JsonValue;

///
/// BusinessDocument
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BusinessDocument(JsonValue);

impl BusinessDocument {
    #[must_use]
    pub const fn new(data: JsonValue) -> Self {
        Self(data)
    }

    /// Resolve a dotted field path (`"vendor.address.city"`) against the
    /// document. `None` when any step is absent or not an object.
    #[must_use]
    pub fn lookup(&self, field: &str) -> Option<&JsonValue> {
        let mut current = &self.0;

        for step in field.split('.') {
            current = current.as_object()?.get(step)?;
        }

        Some(current)
    }

    /// Whether a field path resolves to a non-null value.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.lookup(field).is_some_and(|value| !value.is_null())
    }
}

impl From<JsonValue> for BusinessDocument {
    fn from(data: JsonValue) -> Self {
        Self::new(data)
    }
}

///
/// TESTS
///
