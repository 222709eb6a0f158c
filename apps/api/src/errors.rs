use serde::Serialize;
use serde_json::Value;

/// Data-valued failure body returned by the `/parse` pipeline.
///
/// Failures are never surfaced as HTTP error statuses: the client always
/// receives a 200 with a JSON body and inspects it for an `error` key.
/// The optional fields carry diagnostics for the failure kind that
/// produced them (the sanitizer attaches `raw_response`, a malformed
/// success reply attaches `raw_result`, a non-200 from the inference
/// endpoint attaches `details`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResult {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResult {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            raw_response: None,
            raw_result: None,
            details: None,
        }
    }

    /// Attaches the candidate text the sanitizer failed to parse.
    pub fn with_raw_response(mut self, raw: impl Into<String>) -> Self {
        self.raw_response = Some(raw.into());
        self
    }

    /// Attaches the decoded endpoint reply that lacked the expected shape.
    pub fn with_raw_result(mut self, raw: Value) -> Self {
        self.raw_result = Some(raw);
        self
    }

    /// Attaches the response body of a non-200 endpoint reply.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn into_value(self) -> Value {
        serde_json::to_value(self).expect("ErrorResult serializes to JSON")
    }
}
