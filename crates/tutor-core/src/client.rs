//! Resilient completion client: remote generation with retry, then curated fallback.
//!
//! Every exit is either validated items (live or fallback) or a [`ClientError`]
//! carrying the remote failure's kind and user-facing message.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::config::{self, TutorConfig};
use crate::fallback::{self, FallbackCatalog};
use crate::quiz::{parse_items, QuizItem};
use crate::remote::{CompletionBackend, CompletionRequest, MessagesBackend};
use crate::retry::{self, ClassifiedFailure, ExecutionError, FailureKind, RetryPolicy};

/// Where the returned items came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSource {
    /// Generated by the completion service.
    Remote,
    /// Served from the curated catalog because the remote path failed.
    Fallback { reason: FailureKind },
}

/// Items returned to the caller plus how they were obtained.
#[derive(Debug, Clone)]
pub struct Generated {
    pub items: Vec<QuizItem>,
    pub source: ContentSource,
    /// Remote attempts made before the result was decided.
    pub attempts: usize,
}

/// Failure reported when neither the remote path nor the fallback produced items.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Remote generation failed and the topic has no fallback entry.
    /// The message is the remote failure's, since that is the root cause.
    #[error("{message}")]
    Unavailable {
        kind: FailureKind,
        message: &'static str,
        topic: String,
    },
    /// The caller cancelled the invocation.
    #[error("quiz generation was cancelled")]
    Cancelled,
}

impl ClientError {
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            ClientError::Unavailable { kind, .. } => Some(*kind),
            ClientError::Cancelled => None,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            ClientError::Unavailable { message, .. } => *message,
            ClientError::Cancelled => "Quiz generation was cancelled.",
        }
    }
}

/// Composes backend, retry policy, and fallback catalog.
///
/// Cheap to clone; clones share the backend and the read-only catalog.
#[derive(Clone)]
pub struct ResilientClient {
    backend: Arc<dyn CompletionBackend>,
    policy: RetryPolicy,
    catalog: Arc<FallbackCatalog>,
}

impl std::fmt::Debug for ResilientClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientClient")
            .field("policy", &self.policy)
            .field("topics", &self.catalog.topics().count())
            .finish_non_exhaustive()
    }
}

impl ResilientClient {
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        policy: RetryPolicy,
        catalog: Arc<FallbackCatalog>,
    ) -> Self {
        Self {
            backend,
            policy,
            catalog,
        }
    }

    /// Messages API backend, policy, and catalog as described by `cfg`.
    /// The API key comes from the environment.
    pub fn from_config(cfg: &TutorConfig) -> Result<Self> {
        let policy = cfg.retry.to_policy().context("invalid [retry] settings")?;
        let api_key = config::api_key_from_env();
        if api_key.is_none() {
            tracing::warn!(
                "{} is not set; quizzes will come from the fallback catalog",
                config::API_KEY_ENV
            );
        }
        let backend = MessagesBackend::from_config(&cfg.api, api_key)?;
        let catalog = fallback::load_catalog(cfg.catalog_path.as_deref())?;
        Ok(Self::new(Arc::new(backend), policy, Arc::new(catalog)))
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn catalog(&self) -> &FallbackCatalog {
        &self.catalog
    }

    /// Items for `request`: remote if possible, otherwise fallback.
    pub async fn obtain_content(&self, request: &CompletionRequest) -> Result<Vec<QuizItem>, ClientError> {
        self.obtain(request, &CancellationToken::new())
            .await
            .map(|g| g.items)
    }

    /// Like [`obtain_content`](Self::obtain_content) but reports the source and
    /// stops before the next attempt once `cancel` fires.
    pub async fn obtain(
        &self,
        request: &CompletionRequest,
        cancel: &CancellationToken,
    ) -> Result<Generated, ClientError> {
        let executed = retry::execute(self.backend.as_ref(), request, &self.policy, cancel).await;
        let (failure, attempts) = match executed {
            Ok(done) => {
                let attempts = done.report.attempt_count();
                match parse_items(&done.value.text, request.topic(), request.count()) {
                    Ok(items) => {
                        tracing::info!(
                            topic = request.topic(),
                            items = items.len(),
                            attempts,
                            "quiz generated by completion service"
                        );
                        return Ok(Generated {
                            items,
                            source: ContentSource::Remote,
                            attempts,
                        });
                    }
                    Err(e) => {
                        tracing::warn!(topic = request.topic(), error = %e, "completion payload rejected");
                        (ClassifiedFailure::invalid_response(e.to_string()), attempts)
                    }
                }
            }
            Err(ExecutionError::Cancelled { report }) => {
                tracing::info!(
                    topic = request.topic(),
                    attempts = report.attempt_count(),
                    "quiz generation cancelled"
                );
                return Err(ClientError::Cancelled);
            }
            Err(ExecutionError::Failed {
                terminal,
                failure,
                report,
            }) => {
                tracing::debug!(
                    topic = request.topic(),
                    ?terminal,
                    kind = %failure.kind(),
                    attempts = report.attempt_count(),
                    "remote generation gave up"
                );
                (failure, report.attempt_count())
            }
        };
        self.degrade(request, failure, attempts)
    }

    fn degrade(
        &self,
        request: &CompletionRequest,
        failure: ClassifiedFailure,
        attempts: usize,
    ) -> Result<Generated, ClientError> {
        match self.catalog.generate(request.topic(), request.count()) {
            Ok(items) => {
                tracing::warn!(
                    topic = request.topic(),
                    reason = %failure.kind(),
                    items = items.len(),
                    "serving fallback quiz"
                );
                Ok(Generated {
                    items,
                    source: ContentSource::Fallback {
                        reason: failure.kind(),
                    },
                    attempts,
                })
            }
            Err(unavailable) => {
                tracing::error!(
                    topic = request.topic(),
                    kind = %failure.kind(),
                    "{}; remote failure: {}",
                    unavailable,
                    failure.detail()
                );
                Err(ClientError::Unavailable {
                    kind: failure.kind(),
                    message: failure.user_message(),
                    topic: request.topic().to_string(),
                })
            }
        }
    }
}
