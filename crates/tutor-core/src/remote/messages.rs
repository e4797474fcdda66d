//! Messages API backend.
//!
//! Uses the curl crate (libcurl) for the POST. The transfer is blocking, so it
//! runs on tokio's blocking pool; the async caller is never stalled. Dropping
//! the `complete` future (e.g. on cancellation) aborts the transfer at libcurl's
//! next progress callback.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::{build_prompt, CompletionBackend, CompletionPayload, CompletionRequest};
use crate::config::ApiConfig;
use crate::retry::RemoteFailure;

const API_VERSION: &str = "2023-06-01";

/// Longest slice of an unparseable error body kept for logs.
const BODY_SNIPPET_LEN: usize = 200;

/// Completion backend speaking the Messages HTTP API.
#[derive(Debug, Clone)]
pub struct MessagesBackend {
    endpoint: Url,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl MessagesBackend {
    /// `api_key` may be `None`; every call then fails as an auth failure
    /// without touching the network.
    pub fn from_config(api: &ApiConfig, api_key: Option<String>) -> Result<Self> {
        let base = Url::parse(&api.base_url)
            .with_context(|| format!("invalid api base_url {:?}", api.base_url))?;
        let endpoint = base.join("v1/messages").context("build messages endpoint")?;
        Ok(Self {
            endpoint,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: api.model.clone(),
            max_tokens: api.max_tokens,
            connect_timeout: Duration::from_secs(api.connect_timeout_secs),
            request_timeout: Duration::from_secs(api.request_timeout_secs),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn request_body(&self, request: &CompletionRequest) -> String {
        serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [{ "role": "user", "content": build_prompt(request) }],
        })
        .to_string()
    }
}

#[async_trait]
impl CompletionBackend for MessagesBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionPayload, RemoteFailure> {
        let Some(api_key) = self.api_key.clone() else {
            return Err(RemoteFailure::MissingCredentials);
        };
        let abandoned = AbortOnDrop(Arc::new(AtomicBool::new(false)));
        let post = MessagesPost {
            abort: Arc::clone(&abandoned.0),
            endpoint: self.endpoint.to_string(),
            api_key,
            body: self.request_body(request),
            connect_timeout: self.connect_timeout,
            request_timeout: self.request_timeout,
        };
        let (code, body) = tokio::task::spawn_blocking(move || post.perform())
            .await
            .map_err(|e| RemoteFailure::transport(format!("transfer task failed: {}", e)))??;
        interpret_response(code, &body)
    }
}

/// Raises the flag when dropped, telling the blocking transfer to stop.
struct AbortOnDrop(Arc<AtomicBool>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Everything one blocking POST needs, owned so it can move to the blocking pool.
struct MessagesPost {
    abort: Arc<AtomicBool>,
    endpoint: String,
    api_key: String,
    body: String,
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl MessagesPost {
    fn perform(self) -> Result<(u32, Vec<u8>), curl::Error> {
        let mut response = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(&self.endpoint)?;
        easy.post(true)?;
        easy.post_fields_copy(self.body.as_bytes())?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.request_timeout)?;
        easy.progress(true)?;

        let mut list = curl::easy::List::new();
        list.append(&format!("x-api-key: {}", self.api_key))?;
        list.append(&format!("anthropic-version: {}", API_VERSION))?;
        list.append("content-type: application/json")?;
        // Send the body straight away instead of waiting for 100-continue.
        list.append("Expect:")?;
        easy.http_headers(list)?;

        {
            let abort = &self.abort;
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                response.extend_from_slice(data);
                Ok(data.len())
            })?;
            // Returning false aborts with CURLE_ABORTED_BY_CALLBACK.
            transfer.progress_function(|_, _, _, _| !abort.load(Ordering::Relaxed))?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        Ok((code, response))
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    message: String,
}

/// Map a status and body to a payload or a raw failure.
fn interpret_response(code: u32, body: &[u8]) -> Result<CompletionPayload, RemoteFailure> {
    let status = u16::try_from(code).unwrap_or(0);
    if (200..300).contains(&status) {
        let parsed: MessagesResponse = serde_json::from_slice(body)
            .map_err(|e| RemoteFailure::MalformedBody(format!("messages envelope: {}", e)))?;
        return parsed
            .content
            .into_iter()
            .find(|b| b.kind == "text")
            .and_then(|b| b.text)
            .map(CompletionPayload::new)
            .ok_or_else(|| RemoteFailure::MalformedBody("no text content block".to_string()));
    }

    match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(env) => Err(RemoteFailure::status(status, Some(&env.error.kind), env.error.message)),
        Err(_) => {
            let text = String::from_utf8_lossy(body);
            let snippet: String = text.chars().take(BODY_SNIPPET_LEN).collect();
            Err(RemoteFailure::status(status, None, snippet))
        }
    }
}
