use std::fmt::Write;

use super::CompletionRequest;
use crate::quiz::topic_display;

/// Builds the user prompt asking for `count` questions as a bare JSON array.
pub fn build_prompt(request: &CompletionRequest) -> String {
    let mut prompt = format!(
        "Generate {} multiple-choice algebra questions about {} for a high school student.\n",
        request.count(),
        topic_display(request.topic())
    );

    if !request.context().is_empty() {
        prompt.push_str("\nStudent context:\n");
        for (key, value) in request.context() {
            let value = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let _ = writeln!(prompt, "- {}: {}", key.replace('_', " "), value);
        }
    }

    let _ = write!(
        prompt,
        r#"
Requirements:
1. Questions should be at an appropriate difficulty level
2. Include 4 options (A, B, C, D) per question
3. Provide detailed explanations for correct answers
4. Reference relevant math concepts in explanations

Output ONLY valid JSON in this exact format (no markdown, no extra text):
[
  {{
    "question": "Solve for x: 2x + 5 = 13",
    "options": {{"A": "x = 3", "B": "x = 4", "C": "x = 5", "D": "x = 6"}},
    "correct": "B",
    "explanation": "Subtract 5 from both sides: 2x = 8. Then divide by 2: x = 4.",
    "topic": "{}"
  }}
]"#,
        request.topic()
    );
    prompt
}
