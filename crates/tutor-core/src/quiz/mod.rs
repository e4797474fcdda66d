//! Practice quiz items and the parser for completion payloads.

mod item;
mod parse;

pub use item::{ItemError, QuizItem};
pub use parse::{parse_items, PayloadError};

/// Human-readable form of a topic identifier (`linear_equations` -> `Linear Equations`).
pub fn topic_display(topic: &str) -> String {
    topic
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
