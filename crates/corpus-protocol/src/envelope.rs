//! The envelope every tool response shares (§6: "returns a JSON object
//! with at least `{status: "success"|"error", ...}`").

use corpus_core::ErrorPayload;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ToolStatus {
    Success,
    Error,
}

/// Generic success/error wrapper every tool response is shaped as.
///
/// `data` is present on success, `error` on failure; never both.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ToolEnvelope<T> {
    pub status: ToolStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,
}

impl<T> ToolEnvelope<T> {
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self { status: ToolStatus::Success, data: Some(data), error: None }
    }

    #[must_use]
    pub fn err(error: ErrorPayload) -> Self {
        Self { status: ToolStatus::Error, data: None, error: Some(error) }
    }
}
