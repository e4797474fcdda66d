//! Raw failure surfaced by a completion backend, before classification.

use std::fmt;

/// Error returned by a single completion attempt (transport failure, HTTP error,
/// or a body the backend could not decode).
/// Kept separate from the classified form so the classifier stays a pure function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteFailure {
    /// No response was received at all (connect, DNS, reset, or per-attempt timeout).
    Transport { detail: String, timed_out: bool },
    /// The service answered with a non-2xx status.
    Status {
        code: u16,
        /// Service-specific error category from the error body (e.g. `overloaded_error`).
        error_type: Option<String>,
        message: String,
    },
    /// The service answered 2xx but the envelope was not the expected shape.
    MalformedBody(String),
    /// No API key is configured, so the request was never sent.
    MissingCredentials,
}

impl RemoteFailure {
    pub fn transport(detail: impl Into<String>) -> Self {
        RemoteFailure::Transport {
            detail: detail.into(),
            timed_out: false,
        }
    }

    pub fn status(code: u16, error_type: Option<&str>, message: impl Into<String>) -> Self {
        RemoteFailure::Status {
            code,
            error_type: error_type.map(str::to_string),
            message: message.into(),
        }
    }
}

impl From<curl::Error> for RemoteFailure {
    fn from(e: curl::Error) -> Self {
        RemoteFailure::Transport {
            detail: e.to_string(),
            timed_out: e.is_operation_timedout(),
        }
    }
}

impl fmt::Display for RemoteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteFailure::Transport { detail, timed_out } => {
                if *timed_out {
                    write!(f, "timed out: {}", detail)
                } else {
                    write!(f, "transport: {}", detail)
                }
            }
            RemoteFailure::Status {
                code,
                error_type,
                message,
            } => match error_type {
                Some(t) => write!(f, "HTTP {} ({}): {}", code, t, message),
                None => write!(f, "HTTP {}: {}", code, message),
            },
            RemoteFailure::MalformedBody(detail) => write!(f, "malformed response: {}", detail),
            RemoteFailure::MissingCredentials => write!(f, "API key is not configured"),
        }
    }
}

impl std::error::Error for RemoteFailure {}
