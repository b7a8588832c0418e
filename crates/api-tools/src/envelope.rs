//! Uniform result envelopes returned for every tool call.

use crate::error::ValidationError;
use rmcp::model::{CallToolResult, Content};
use serde::Serialize;

/// `error` value for failed upstream requests ("API request failed").
pub const UPSTREAM_FAILURE: &str = "API请求失败";
/// `error` value for rejected arguments ("parameter validation failed").
pub const VALIDATION_FAILURE: &str = "参数校验失败";

/// Outcome of a single upstream request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiResult {
    /// Re-serialised JSON body of a 2xx response.
    Success { body_text: String },
    Failure(ApiFailure),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiFailure {
    pub error: &'static str,
    pub endpoint: String,
    pub message: String,
}

impl ApiResult {
    #[must_use]
    pub fn failure(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failure(ApiFailure {
            error: UPSTREAM_FAILURE,
            endpoint: endpoint.into(),
            message: message.into(),
        })
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl From<ApiResult> for CallToolResult {
    fn from(value: ApiResult) -> Self {
        match value {
            ApiResult::Success { body_text } => Self::success(vec![Content::text(body_text)]),
            ApiResult::Failure(failure) => error_envelope(&failure),
        }
    }
}

#[derive(Debug, Serialize)]
struct ValidationFailure<'a> {
    error: &'static str,
    field: &'a str,
    message: String,
}

/// Envelope for arguments rejected before any request was made.
#[must_use]
pub fn validation_envelope(err: &ValidationError) -> CallToolResult {
    error_envelope(&ValidationFailure {
        error: VALIDATION_FAILURE,
        field: err.field(),
        message: err.to_string(),
    })
}

fn error_envelope<T: Serialize>(payload: &T) -> CallToolResult {
    let text = serde_json::to_string(payload)
        .unwrap_or_else(|_| format!("{{\"error\":\"{UPSTREAM_FAILURE}\"}}"));
    CallToolResult::error(vec![Content::text(text)])
}
