//! Rich query selectors.
//!
//! Only top-level field equality is supported:
//! `{"selector": {"docType": "Evaluation"}}` matches every JSON object whose
//! `docType` field equals `"Evaluation"`.

use serde_json::{Map, Value};

use super::StoreError;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selector {
    fields: Map<String, Value>,
}

impl Selector {
    /// Parse a query string of the form `{"selector": {...}}`.
    pub fn parse(query: &str) -> Result<Self, StoreError> {
        let value: Value =
            serde_json::from_str(query).map_err(|e| StoreError::Query(e.to_string()))?;

        match value.get("selector") {
            Some(Value::Object(fields)) => Ok(Self {
                fields: fields.clone(),
            }),
            _ => Err(StoreError::Query(
                "query must contain a selector object".to_string(),
            )),
        }
    }

    /// Require `name` to equal `value`.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Whether a stored document satisfies every field of the selector.
    ///
    /// Values that are not JSON objects never match.
    pub fn matches(&self, document: &[u8]) -> bool {
        let Ok(Value::Object(doc)) = serde_json::from_slice::<Value>(document) else {
            return false;
        };
        self.fields
            .iter()
            .all(|(name, expected)| doc.get(name) == Some(expected))
    }
}
