//! Error types for `dao3-api-tools`.

use crate::catalog::ParamKind;
use thiserror::Error;

/// Static catalog errors. These are configuration bugs and abort startup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Duplicate operation name '{0}' in catalog")]
    DuplicateOperation(String),

    #[error("Duplicate param '{param}' in operation '{operation}'")]
    DuplicateParam { operation: String, param: String },

    #[error("Path template of operation '{operation}' references unknown param '{placeholder}'")]
    UnknownPlaceholder {
        operation: String,
        placeholder: String,
    },

    #[error("Param '{param}' of operation '{operation}' is not used by its path template")]
    UnusedParameter { operation: String, param: String },

    #[error("Path template of operation '{operation}' is malformed: {message}")]
    MalformedTemplate { operation: String, message: String },
}

/// Registration errors raised while binding operations to a transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Duplicate tool name '{0}'")]
    DuplicateTool(String),
}

/// Argument validation failures. Detected before any network call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required parameter: {field}")]
    Missing { field: String },

    #[error("Invalid parameter '{field}': expected {expected}, received {found}")]
    WrongType {
        field: String,
        expected: ParamKind,
        found: &'static str,
    },

    /// `.` or `..` as a whole path segment would be collapsed into a different endpoint.
    #[error("Invalid parameter '{field}': '.' and '..' are not allowed in the path")]
    DotSegment { field: String },
}

impl ValidationError {
    /// Name of the offending argument.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::Missing { field } | Self::WrongType { field, .. } | Self::DotSegment { field } => {
                field
            }
        }
    }
}

/// Failures surfaced by an [`Upstream`](crate::invoker::Upstream) transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// Connection, TLS, timeout or request-building failures.
    #[error("{0}")]
    Transport(String),

    /// Upstream answered with a non-2xx status.
    #[error("Request failed with status code {0}")]
    Status(u16),

    /// Upstream answered 2xx but the body is not JSON.
    #[error("{0}")]
    Decode(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(value: reqwest::Error) -> Self {
        // Drop the URL: it duplicates the envelope's `endpoint` field.
        let value = value.without_url();
        if value.is_decode() {
            Self::Decode(value.to_string())
        } else if let Some(status) = value.status() {
            Self::Status(status.as_u16())
        } else {
            Self::Transport(error_chain(&value))
        }
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
