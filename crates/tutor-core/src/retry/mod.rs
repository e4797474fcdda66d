//! Retry and backoff policy for completion calls.
//!
//! This module encapsulates failure classification (connectivity, throttling,
//! server errors, auth) and exponential backoff decisions so that the client
//! façade only sees a terminal, typed outcome.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{
    classify, classify_status, ClassifiedFailure, FailureKind, MSG_ACCESS_DENIED,
    MSG_AUTH_FAILURE, MSG_CONNECTIVITY, MSG_INVALID_RESPONSE, MSG_NOT_FOUND, MSG_OVERLOADED,
    MSG_RATE_LIMITED, MSG_SERVER_ERROR, MSG_UNKNOWN, STATUS_OVERLOADED,
};
pub use error::RemoteFailure;
pub use policy::{PolicyError, RetryDecision, RetryPolicy, DEFAULT_MAX_DELAY};
pub use run::{
    execute, run_with_retry, AttemptOutcome, CompletionAttempt, Executed, ExecutionError,
    ExecutionReport, Terminal,
};
