use rand::Rng;
use std::time::Duration;

use super::classify::FailureKind;

/// Hard ceiling on any single backoff wait.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Decision returned by the retry policy after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// The failure kind is not worth retrying.
    NotRetryable,
    /// The attempt budget is spent.
    Exhausted,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Rejected policy parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PolicyError {
    #[error("initial retry delay must be positive")]
    NonPositiveInitialDelay,
    #[error("initial retry delay of {0} seconds is too large")]
    InitialDelayOutOfRange(f64),
    #[error("max retry delay ({max:?}) must be at least the initial delay ({initial:?})")]
    MaxBelowInitial { initial: Duration, max: Duration },
}

/// Exponential backoff policy with additive jitter and a ceiling.
///
/// Attempt indices are 0-based: attempt 0 is the first call, and at most
/// `max_retries` further attempts follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    initial_delay: Duration,
    max_delay: Duration,
    jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: DEFAULT_MAX_DELAY,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    pub fn new(
        max_retries: u32,
        initial_delay: Duration,
        max_delay: Duration,
    ) -> Result<Self, PolicyError> {
        if initial_delay.is_zero() {
            return Err(PolicyError::NonPositiveInitialDelay);
        }
        if max_delay < initial_delay {
            return Err(PolicyError::MaxBelowInitial {
                initial: initial_delay,
                max: max_delay,
            });
        }
        Ok(Self {
            max_retries,
            initial_delay,
            max_delay,
            jitter: true,
        })
    }

    /// Same policy with jitter fixed to zero (reproducible schedule).
    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    pub fn has_jitter(&self) -> bool {
        self.jitter
    }

    /// Delay before the attempt after `attempt`, with random jitter in `[0, initial_delay)`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let jitter = if self.jitter {
            let secs = rand::thread_rng().gen_range(0.0..self.initial_delay.as_secs_f64());
            Duration::from_secs_f64(secs)
        } else {
            Duration::ZERO
        };
        self.delay_with_jitter(attempt, jitter)
    }

    /// `min(initial * 2^attempt + jitter, max_delay)`.
    pub fn delay_with_jitter(&self, attempt: u32, jitter: Duration) -> Duration {
        let exp = 2f64.powi(attempt.min(1024) as i32);
        let raw = self.initial_delay.as_secs_f64() * exp + jitter.as_secs_f64();
        // `raw` may be infinite for huge attempt indices; compare before converting.
        if raw >= self.max_delay.as_secs_f64() {
            self.max_delay
        } else {
            Duration::from_secs_f64(raw)
        }
    }

    /// Decide what to do after `attempt` (0-based) failed with `kind`.
    pub fn decide(&self, attempt: u32, kind: FailureKind) -> RetryDecision {
        if !kind.is_retryable() {
            return RetryDecision::NotRetryable;
        }
        if attempt >= self.max_retries {
            return RetryDecision::Exhausted;
        }
        RetryDecision::RetryAfter(self.delay_for(attempt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_settings() {
        let p = RetryPolicy::default();
        assert_eq!(p.max_retries(), 3);
        assert_eq!(p.initial_delay(), Duration::from_secs(1));
        assert_eq!(p.max_delay(), Duration::from_secs(60));
        assert!(p.has_jitter());
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert_eq!(
            RetryPolicy::new(3, Duration::ZERO, Duration::from_secs(1)),
            Err(PolicyError::NonPositiveInitialDelay)
        );
        assert!(matches!(
            RetryPolicy::new(3, Duration::from_secs(5), Duration::from_secs(1)),
            Err(PolicyError::MaxBelowInitial { .. })
        ));
        assert!(RetryPolicy::new(0, Duration::from_millis(1), Duration::from_millis(1)).is_ok());
    }

    #[test]
    fn schedule_without_jitter_doubles() {
        let p = RetryPolicy::default().without_jitter();
        assert_eq!(p.delay_for(0), Duration::from_secs(1));
        assert_eq!(p.delay_for(1), Duration::from_secs(2));
        assert_eq!(p.delay_for(2), Duration::from_secs(4));
    }

    #[test]
    fn exponential_backoff_grows_and_is_capped() {
        let p = RetryPolicy::default().without_jitter();
        let mut prev = Duration::ZERO;
        for attempt in 0..40 {
            let d = p.delay_for(attempt);
            assert!(d >= prev, "attempt {} went down", attempt);
            assert!(d <= p.max_delay());
            prev = d;
        }
        assert_eq!(p.delay_for(6), Duration::from_secs(60));
        assert_eq!(p.delay_for(u32::MAX), Duration::from_secs(60));
    }

    #[test]
    fn jitter_is_bounded_by_initial_delay() {
        let p = RetryPolicy::default();
        for _ in 0..200 {
            let d = p.delay_for(1);
            assert!(d >= Duration::from_secs(2));
            assert!(d < Duration::from_secs(3));
        }
        for _ in 0..50 {
            assert!(p.delay_for(10) <= p.max_delay());
        }
    }

    #[test]
    fn explicit_jitter_is_added_then_clamped() {
        let p = RetryPolicy::default();
        assert_eq!(
            p.delay_with_jitter(2, Duration::from_millis(500)),
            Duration::from_millis(4500)
        );
        assert_eq!(
            p.delay_with_jitter(6, Duration::from_millis(999)),
            Duration::from_secs(60)
        );
    }

    #[test]
    fn decide_respects_kind_and_budget() {
        let p = RetryPolicy::default();
        assert_eq!(
            p.decide(0, FailureKind::AuthFailure),
            RetryDecision::NotRetryable
        );
        assert_eq!(
            p.decide(0, FailureKind::InvalidResponseShape),
            RetryDecision::NotRetryable
        );
        assert!(matches!(
            p.decide(2, FailureKind::RateLimited),
            RetryDecision::RetryAfter(_)
        ));
        assert_eq!(p.decide(3, FailureKind::Connectivity), RetryDecision::Exhausted);
    }

    #[test]
    fn zero_retries_never_waits() {
        let p = RetryPolicy::new(0, Duration::from_secs(1), DEFAULT_MAX_DELAY).unwrap();
        assert_eq!(p.decide(0, FailureKind::ServerError), RetryDecision::Exhausted);
    }
}
