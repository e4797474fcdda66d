//! Retry loop: call the backend until success, a terminal failure, or cancellation.

use std::future::Future;
use std::time::{Duration, SystemTime};

use tokio_util::sync::CancellationToken;

use super::classify::{classify, ClassifiedFailure};
use super::error::RemoteFailure;
use super::policy::{RetryDecision, RetryPolicy};
use crate::remote::{CompletionBackend, CompletionPayload, CompletionRequest};

/// Outcome of a single attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Succeeded,
    Failed(ClassifiedFailure),
}

/// Record of one try. Lives only as long as the invocation's report.
#[derive(Debug, Clone)]
pub struct CompletionAttempt {
    /// 0-based attempt index.
    pub index: u32,
    pub started_at: SystemTime,
    pub outcome: AttemptOutcome,
    /// Backoff scheduled after this attempt, if another attempt followed.
    pub delay: Option<Duration>,
}

/// Attempts made during one invocation, in order.
#[derive(Debug, Clone, Default)]
pub struct ExecutionReport {
    attempts: Vec<CompletionAttempt>,
}

impl ExecutionReport {
    pub fn attempts(&self) -> &[CompletionAttempt] {
        &self.attempts
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.len()
    }

    /// Sum of scheduled backoff waits.
    pub fn total_delay(&self) -> Duration {
        self.attempts.iter().filter_map(|a| a.delay).sum()
    }
}

/// Successful run: the value plus the attempts it took.
#[derive(Debug)]
pub struct Executed<T> {
    pub value: T,
    pub report: ExecutionReport,
}

/// How a failed run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    /// Every allowed attempt failed with a retryable kind.
    ExhaustedRetries,
    /// An attempt failed with a kind that is never retried.
    NonRetryableFailure,
}

#[derive(Debug)]
pub enum ExecutionError {
    Failed {
        terminal: Terminal,
        failure: ClassifiedFailure,
        report: ExecutionReport,
    },
    /// The caller cancelled before the run reached a terminal state.
    Cancelled { report: ExecutionReport },
}

impl ExecutionError {
    pub fn report(&self) -> &ExecutionReport {
        match self {
            ExecutionError::Failed { report, .. } | ExecutionError::Cancelled { report } => report,
        }
    }
}

/// Runs `f` until it succeeds, the policy says stop, or `cancel` fires.
///
/// `f` receives the 0-based attempt index. Backoff waits use the tokio timer,
/// so other tasks keep running while this one is suspended. Cancellation is
/// checked before each attempt and raced against both the attempt and the wait.
pub async fn run_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut f: F,
) -> Result<Executed<T>, ExecutionError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, RemoteFailure>>,
{
    let mut report = ExecutionReport::default();
    let mut attempt = 0u32;
    loop {
        if cancel.is_cancelled() {
            tracing::debug!(attempt, "cancelled before attempt");
            return Err(ExecutionError::Cancelled { report });
        }

        let started_at = SystemTime::now();
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(attempt, "cancelled during attempt");
                return Err(ExecutionError::Cancelled { report });
            }
            r = f(attempt) => r,
        };

        let raw = match result {
            Ok(value) => {
                report.attempts.push(CompletionAttempt {
                    index: attempt,
                    started_at,
                    outcome: AttemptOutcome::Succeeded,
                    delay: None,
                });
                return Ok(Executed { value, report });
            }
            Err(raw) => raw,
        };

        let failure = classify(&raw);
        let decision = policy.decide(attempt, failure.kind());
        let delay = match decision {
            RetryDecision::RetryAfter(d) => Some(d),
            RetryDecision::NotRetryable | RetryDecision::Exhausted => None,
        };
        tracing::warn!(
            attempt,
            kind = %failure.kind(),
            delay_ms = delay.map(|d| d.as_millis() as u64).unwrap_or(0),
            detail = %failure.detail(),
            "completion attempt failed"
        );
        report.attempts.push(CompletionAttempt {
            index: attempt,
            started_at,
            outcome: AttemptOutcome::Failed(failure.clone()),
            delay,
        });

        match decision {
            RetryDecision::NotRetryable => {
                return Err(ExecutionError::Failed {
                    terminal: Terminal::NonRetryableFailure,
                    failure,
                    report,
                });
            }
            RetryDecision::Exhausted => {
                return Err(ExecutionError::Failed {
                    terminal: Terminal::ExhaustedRetries,
                    failure,
                    report,
                });
            }
            RetryDecision::RetryAfter(d) => {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        tracing::debug!(attempt, "cancelled during backoff");
                        return Err(ExecutionError::Cancelled { report });
                    }
                    _ = tokio::time::sleep(d) => {}
                }
                attempt += 1;
            }
        }
    }
}

/// Executes one completion request against `backend` under `policy`.
pub async fn execute(
    backend: &dyn CompletionBackend,
    request: &CompletionRequest,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> Result<Executed<CompletionPayload>, ExecutionError> {
    run_with_retry(policy, cancel, |attempt| {
        tracing::debug!(
            attempt,
            max_attempts = policy.max_retries() + 1,
            topic = request.topic(),
            "calling completion backend"
        );
        backend.complete(request)
    })
    .await
}
