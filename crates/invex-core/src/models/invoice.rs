//! The loosely-typed invoice object returned by the completion service.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ExtractionError;

/// An invoice as extracted by the completion service.
///
/// Structurally expected to mirror the extraction schema but not guaranteed
/// to; the service can return missing or oddly-shaped fields, which is
/// handled during traversal rather than validated up front. Key order is
/// preserved from the response text.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct ExtractedInvoice(Map<String, Value>);

impl ExtractedInvoice {
    /// Parse the raw completion response.
    ///
    /// Requires the response to be a single JSON object; anything else
    /// (arrays, bare strings, prose around the JSON) is a malformed result.
    pub fn from_completion(raw: &str) -> Result<Self, ExtractionError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| ExtractionError::MalformedResponse(e.to_string()))?;
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ExtractionError::MalformedResponse(format!(
                "expected a JSON object, got {}",
                type_name(&other)
            ))),
        }
    }

    /// Iterate fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Look up a single field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Number of top-level fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the invoice has no fields at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for ExtractedInvoice {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Short JSON type name for error messages.
fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
