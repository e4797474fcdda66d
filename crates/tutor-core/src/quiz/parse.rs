//! Parse completion text into validated quiz items.

use super::item::{ItemError, QuizItem};

/// Completion text that does not describe a usable quiz.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("response is not a JSON list of questions: {0}")]
    Json(#[from] serde_json::Error),
    #[error("response contained no questions")]
    Empty,
    #[error("question {index}: {source}")]
    Item {
        index: usize,
        #[source]
        source: ItemError,
    },
}

/// Parses `text` into at most `count` items, each stamped with `topic`.
///
/// Accepts a bare JSON array or one wrapped in a markdown code fence.
/// Every item must pass [`QuizItem::validate`]; one bad item rejects the payload.
pub fn parse_items(text: &str, topic: &str, count: usize) -> Result<Vec<QuizItem>, PayloadError> {
    let body = strip_code_fence(text);
    let mut items: Vec<QuizItem> = serde_json::from_str(body)?;
    if items.is_empty() {
        return Err(PayloadError::Empty);
    }
    for (index, item) in items.iter().enumerate() {
        item.validate()
            .map_err(|source| PayloadError::Item { index, source })?;
    }
    items.truncate(count);
    for item in &mut items {
        item.topic = topic.to_string();
    }
    Ok(items)
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.trim_end();
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
