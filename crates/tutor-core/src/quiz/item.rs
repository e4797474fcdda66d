use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One multiple-choice practice question.
///
/// Field names match the JSON the completion service is asked to produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizItem {
    pub question: String,
    /// Option key (e.g. "A") to option text.
    pub options: BTreeMap<String, String>,
    /// Key of the correct option; must be one of `options`' keys.
    pub correct: String,
    pub explanation: String,
    #[serde(default)]
    pub topic: String,
}

/// Why an item is not safe to show.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItemError {
    #[error("question text is empty")]
    EmptyQuestion,
    #[error("no answer options")]
    NoOptions,
    #[error("option {0:?} has empty text")]
    EmptyOption(String),
    #[error("correct answer {0:?} is not one of the options")]
    CorrectNotAnOption(String),
    #[error("explanation is empty")]
    EmptyExplanation,
}

impl QuizItem {
    pub fn validate(&self) -> Result<(), ItemError> {
        if self.question.trim().is_empty() {
            return Err(ItemError::EmptyQuestion);
        }
        if self.options.is_empty() {
            return Err(ItemError::NoOptions);
        }
        if let Some((key, _)) = self.options.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(ItemError::EmptyOption(key.clone()));
        }
        if !self.options.contains_key(&self.correct) {
            return Err(ItemError::CorrectNotAnOption(self.correct.clone()));
        }
        if self.explanation.trim().is_empty() {
            return Err(ItemError::EmptyExplanation);
        }
        Ok(())
    }

    /// Text of the correct option.
    pub fn correct_text(&self) -> Option<&str> {
        self.options.get(&self.correct).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> QuizItem {
        QuizItem {
            question: "Solve for x: x + 1 = 3".into(),
            options: [("A", "x = 1"), ("B", "x = 2")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            correct: "B".into(),
            explanation: "Subtract 1 from both sides.".into(),
            topic: "linear_equations".into(),
        }
    }

    #[test]
    fn valid_item_passes() {
        let item = sample();
        assert_eq!(item.validate(), Ok(()));
        assert_eq!(item.correct_text(), Some("x = 2"));
    }

    #[test]
    fn blank_fields_rejected() {
        let mut q = sample();
        q.question = "  ".into();
        assert_eq!(q.validate(), Err(ItemError::EmptyQuestion));

        let mut e = sample();
        e.explanation.clear();
        assert_eq!(e.validate(), Err(ItemError::EmptyExplanation));

        let mut o = sample();
        o.options.insert("C".into(), String::new());
        assert_eq!(o.validate(), Err(ItemError::EmptyOption("C".into())));
    }

    #[test]
    fn correct_key_must_exist() {
        let mut item = sample();
        item.correct = "E".into();
        assert_eq!(item.validate(), Err(ItemError::CorrectNotAnOption("E".into())));

        item.options.clear();
        assert_eq!(item.validate(), Err(ItemError::NoOptions));
    }
}
