//! Text and JSON output for quiz items.

use anyhow::Result;
use tutor_core::quiz::{topic_display, QuizItem};

pub fn print_items(topic: &str, items: &[QuizItem]) {
    print!("{}", format_items(topic, items));
}

pub fn print_json(items: &[QuizItem]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(items)?);
    Ok(())
}

fn format_items(topic: &str, items: &[QuizItem]) -> String {
    let mut out = format!("{}: {} question(s)\n", topic_display(topic), items.len());
    for (i, item) in items.iter().enumerate() {
        out.push_str(&format!("\n{}. {}\n", i + 1, item.question));
        for (key, text) in &item.options {
            out.push_str(&format!("   {}) {}\n", key, text));
        }
        out.push_str(&format!(
            "   Answer: {} ({})\n",
            item.correct,
            item.correct_text().unwrap_or("?")
        ));
        out.push_str(&format!("   {}\n", item.explanation));
    }
    out
}
