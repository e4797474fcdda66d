//! Classify remote failures into failure kinds with fixed user-facing messages.

use super::error::RemoteFailure;

pub const MSG_RATE_LIMITED: &str =
    "You've made too many requests. Please wait a moment and try again.";
pub const MSG_CONNECTIVITY: &str =
    "Unable to connect to the AI service. Please check your internet connection and try again.";
pub const MSG_AUTH_FAILURE: &str =
    "API authentication failed. Please check your API key configuration.";
pub const MSG_ACCESS_DENIED: &str =
    "Access denied. Your API key may not have the required permissions.";
pub const MSG_SERVER_ERROR: &str =
    "The AI service encountered an internal error. Please try again later.";
pub const MSG_OVERLOADED: &str =
    "The AI service is temporarily overloaded. Please try again in a few minutes.";
pub const MSG_NOT_FOUND: &str = "The requested AI model is not available.";
pub const MSG_INVALID_RESPONSE: &str =
    "Received an invalid response from the AI service. Please try again.";
pub const MSG_UNKNOWN: &str =
    "An unexpected error occurred while generating the quiz. Please try again.";

/// Status the completion service uses when it is overloaded.
pub const STATUS_OVERLOADED: u16 = 529;

/// Failure category used for retry and fallback decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// No response received (connection, DNS, timeout).
    Connectivity,
    /// Service asked us to slow down (429 / `rate_limit_error`).
    RateLimited,
    /// Server-side failure, including overload.
    ServerError,
    /// Credentials missing, rejected, or lacking permission.
    AuthFailure,
    /// Requested model or resource is unavailable.
    NotFound,
    /// Response could not be parsed into the expected structure.
    InvalidResponseShape,
    /// Anything else, including statuses we do not recognize.
    Unknown,
}

impl FailureKind {
    /// Transient kinds worth another attempt.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            FailureKind::Connectivity | FailureKind::RateLimited | FailureKind::ServerError
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Connectivity => "connectivity",
            FailureKind::RateLimited => "rate_limited",
            FailureKind::ServerError => "server_error",
            FailureKind::AuthFailure => "auth_failure",
            FailureKind::NotFound => "not_found",
            FailureKind::InvalidResponseShape => "invalid_response_shape",
            FailureKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A remote failure mapped to its kind, with the message shown to users.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {detail}")]
pub struct ClassifiedFailure {
    kind: FailureKind,
    status: Option<u16>,
    detail: String,
    message: &'static str,
}

impl ClassifiedFailure {
    fn new(kind: FailureKind, status: Option<u16>, detail: String, message: &'static str) -> Self {
        Self {
            kind,
            status,
            detail,
            message,
        }
    }

    /// Payload arrived but failed local validation.
    pub fn invalid_response(detail: impl Into<String>) -> Self {
        Self::new(
            FailureKind::InvalidResponseShape,
            None,
            detail.into(),
            MSG_INVALID_RESPONSE,
        )
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// HTTP status of the failed response, if one was received.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Technical detail for logs; never shown to users.
    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn user_message(&self) -> &'static str {
        self.message
    }
}

/// Classify an HTTP status (plus optional service error type) into a kind and message.
///
/// Rules are checked in priority order: rate limit, server error, auth, not found.
/// Anything unmatched is `Unknown`.
pub fn classify_status(code: u16, error_type: Option<&str>) -> (FailureKind, &'static str) {
    let et = error_type.unwrap_or("");
    if code == 429 || et == "rate_limit_error" {
        return (FailureKind::RateLimited, MSG_RATE_LIMITED);
    }
    if code == STATUS_OVERLOADED || et == "overloaded_error" {
        return (FailureKind::ServerError, MSG_OVERLOADED);
    }
    if matches!(code, 500 | 502 | 503 | 504) || et == "api_error" {
        return (FailureKind::ServerError, MSG_SERVER_ERROR);
    }
    if code == 403 || et == "permission_error" {
        return (FailureKind::AuthFailure, MSG_ACCESS_DENIED);
    }
    if code == 401 || et == "authentication_error" {
        return (FailureKind::AuthFailure, MSG_AUTH_FAILURE);
    }
    if code == 404 || et == "not_found_error" {
        return (FailureKind::NotFound, MSG_NOT_FOUND);
    }
    (FailureKind::Unknown, MSG_UNKNOWN)
}

/// Classify a raw remote failure. Pure; no side effects.
pub fn classify(failure: &RemoteFailure) -> ClassifiedFailure {
    let detail = failure.to_string();
    match failure {
        RemoteFailure::Transport { .. } => {
            ClassifiedFailure::new(FailureKind::Connectivity, None, detail, MSG_CONNECTIVITY)
        }
        RemoteFailure::Status {
            code, error_type, ..
        } => {
            let (kind, message) = classify_status(*code, error_type.as_deref());
            ClassifiedFailure::new(kind, Some(*code), detail, message)
        }
        RemoteFailure::MissingCredentials => {
            ClassifiedFailure::new(FailureKind::AuthFailure, None, detail, MSG_AUTH_FAILURE)
        }
        RemoteFailure::MalformedBody(_) => ClassifiedFailure::new(
            FailureKind::InvalidResponseShape,
            None,
            detail,
            MSG_INVALID_RESPONSE,
        ),
    }
}
