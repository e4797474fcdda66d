//! The remote completion service boundary.
//!
//! [`CompletionBackend`] is the seam the retry loop calls through; the
//! Messages API implementation lives in [`messages`].

mod messages;
mod prompt;

use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::retry::RemoteFailure;

pub use messages::MessagesBackend;
pub use prompt::build_prompt;

/// Rejected request parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("topic must not be empty")]
    EmptyTopic,
    #[error("question count must be at least 1")]
    ZeroCount,
}

/// What to generate: topic, how many items, and opaque requester context.
///
/// The context is passed to the backend unchanged; local logic never reads it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    topic: String,
    count: usize,
    context: BTreeMap<String, serde_json::Value>,
}

impl CompletionRequest {
    pub fn new(topic: impl Into<String>, count: usize) -> Result<Self, RequestError> {
        let topic = topic.into();
        if topic.trim().is_empty() {
            return Err(RequestError::EmptyTopic);
        }
        if count == 0 {
            return Err(RequestError::ZeroCount);
        }
        Ok(Self {
            topic,
            count,
            context: BTreeMap::new(),
        })
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn context(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.context
    }
}

/// Raw completion text returned by a successful call; not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionPayload {
    pub text: String,
}

impl CompletionPayload {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// One call to the remote completion service.
///
/// Implementations own their per-attempt timeout and must report a timeout as
/// [`RemoteFailure::Transport`]. They must not retry on their own.
///
/// The retry loop drops the returned future when the caller cancels mid-attempt.
/// Work running outside the future (a blocking transfer, for instance) should
/// stop when that happens rather than run to its timeout.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionPayload, RemoteFailure>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_validation() {
        assert_eq!(CompletionRequest::new("", 3), Err(RequestError::EmptyTopic));
        assert_eq!(
            CompletionRequest::new("factoring", 0),
            Err(RequestError::ZeroCount)
        );
        let r = CompletionRequest::new("factoring", 2)
            .unwrap()
            .with_context("grade_average", 71.5)
            .with_context("struggling_topics", serde_json::json!(["radicals"]));
        assert_eq!(r.topic(), "factoring");
        assert_eq!(r.count(), 2);
        assert_eq!(r.context().len(), 2);
        assert_eq!(r.context()["grade_average"], serde_json::json!(71.5));
    }
}
