//! `tutor quiz <topic>` – generate a quiz through the resilient client.

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tutor_core::client::{ClientError, ContentSource, ResilientClient};
use tutor_core::config::TutorConfig;
use tutor_core::remote::CompletionRequest;

use super::render;

pub async fn run_quiz(
    cfg: &TutorConfig,
    topic: &str,
    count: usize,
    context: &[(String, String)],
    json: bool,
) -> Result<()> {
    let client = ResilientClient::from_config(cfg)?;
    let mut request = CompletionRequest::new(topic, count)?;
    for (key, value) in context {
        request = request.with_context(key.as_str(), context_value(value));
    }

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received, cancelling quiz generation");
                cancel.cancel();
            }
        });
    }

    let generated = match client.obtain(&request, &cancel).await {
        Ok(g) => g,
        Err(ClientError::Cancelled) => {
            eprintln!("Cancelled.");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    if let ContentSource::Fallback { reason } = generated.source {
        eprintln!(
            "note: the question service was unavailable ({}); showing practice questions instead.",
            reason
        );
    }
    if json {
        render::print_json(&generated.items)?;
    } else {
        render::print_items(topic, &generated.items);
    }
    tracing::debug!(attempts = generated.attempts, source = ?generated.source, "quiz done");
    Ok(())
}

/// Numbers and booleans stay typed; anything else is passed as a string.
fn context_value(raw: &str) -> serde_json::Value {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(v @ (serde_json::Value::Number(_) | serde_json::Value::Bool(_))) => v,
        _ => serde_json::Value::String(raw.to_string()),
    }
}
