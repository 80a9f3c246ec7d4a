//! Quiz extraction from model text.
//!
//! The model is asked for a raw JSON array but sometimes wraps it in a
//! fenced code block. Fences are stripped before decoding.

use apnatoon_core::error::EngineError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Options every question must carry.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// One multiple-choice question as the model sends it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    /// Question text.
    pub question: String,
    /// Answer choices, in display order.
    pub options: Vec<String>,
    /// The exact text of the correct option.
    pub correct_answer: String,
}

/// Why model text could not be turned into a question list.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QuizParseError {
    /// The text is not JSON.
    #[error("quiz text is not valid JSON: {0}")]
    InvalidJson(String),

    /// The JSON is valid but is not a list.
    #[error("quiz JSON is not a list")]
    NotAList,

    /// A list element does not have the question shape.
    #[error("question {index} is malformed: {reason}")]
    InvalidQuestion {
        /// Zero-based position in the list.
        index: usize,
        /// Decoder message.
        reason: String,
    },

    /// A question does not have exactly four options.
    #[error("question {index} has {count} options, expected 4")]
    WrongOptionCount {
        /// Zero-based position in the list.
        index: usize,
        /// Options actually present.
        count: usize,
    },

    /// A question's correct answer is not one of its options.
    #[error("question {index} has a correct answer that is not an option")]
    AnswerNotAnOption {
        /// Zero-based position in the list.
        index: usize,
    },

    /// The list is empty.
    #[error("quiz has no questions")]
    Empty,
}

impl From<QuizParseError> for EngineError {
    fn from(error: QuizParseError) -> Self {
        Self::MalformedQuiz(error.to_string())
    }
}

/// Removes every ```` ```json ```` and ```` ``` ```` fence marker and trims.
#[must_use]
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_owned()
}

/// Decodes model text into a non-empty, validated question list.
///
/// # Errors
///
/// Returns a [`QuizParseError`] naming the first problem found.
pub fn parse_quiz(text: &str) -> Result<Vec<QuizQuestion>, QuizParseError> {
    let cleaned = strip_code_fences(text);
    let value: serde_json::Value =
        serde_json::from_str(&cleaned).map_err(|e| QuizParseError::InvalidJson(e.to_string()))?;
    let serde_json::Value::Array(items) = value else {
        return Err(QuizParseError::NotAList);
    };
    if items.is_empty() {
        return Err(QuizParseError::Empty);
    }

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let question: QuizQuestion =
                serde_json::from_value(item).map_err(|e| QuizParseError::InvalidQuestion {
                    index,
                    reason: e.to_string(),
                })?;
            if question.options.len() != OPTIONS_PER_QUESTION {
                return Err(QuizParseError::WrongOptionCount {
                    index,
                    count: question.options.len(),
                });
            }
            if !question.options.contains(&question.correct_answer) {
                return Err(QuizParseError::AnswerNotAnOption { index });
            }
            Ok(question)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_QUESTION: &str = r#"[{"question":"Who?","options":["A","B","C","D"],"correctAnswer":"B"}]"#;

    #[test]
    fn test_raw_array_parses() {
        let questions = parse_quiz(ONE_QUESTION).unwrap();

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question, "Who?");
        assert_eq!(questions[0].correct_answer, "B");
    }

    #[test]
    fn test_fenced_array_parses_like_raw_array() {
        let fenced = format!("```json\n{ONE_QUESTION}\n```");

        assert_eq!(parse_quiz(&fenced).unwrap(), parse_quiz(ONE_QUESTION).unwrap());
    }

    #[test]
    fn test_bare_fence_is_stripped() {
        let fenced = format!("```\n{ONE_QUESTION}\n```  ");

        assert_eq!(parse_quiz(&fenced).unwrap().len(), 1);
    }

    #[test]
    fn test_object_is_rejected_as_not_a_list() {
        let result = parse_quiz(r#"{"question":"x"}"#);

        assert_eq!(result, Err(QuizParseError::NotAList));
    }

    #[test]
    fn test_prose_is_rejected_as_invalid_json() {
        let result = parse_quiz("Here are your questions!");

        assert!(matches!(result, Err(QuizParseError::InvalidJson(_))));
    }

    #[test]
    fn test_empty_list_is_rejected() {
        assert_eq!(parse_quiz("[]"), Err(QuizParseError::Empty));
    }

    #[test]
    fn test_missing_field_names_the_question() {
        let result = parse_quiz(r#"[{"question":"Who?","options":["A","B","C","D"]}]"#);

        assert!(matches!(
            result,
            Err(QuizParseError::InvalidQuestion { index: 0, .. })
        ));
    }

    #[test]
    fn test_three_options_are_rejected() {
        let result = parse_quiz(r#"[{"question":"Q","options":["A","B","C"],"correctAnswer":"A"}]"#);

        assert_eq!(
            result,
            Err(QuizParseError::WrongOptionCount { index: 0, count: 3 })
        );
    }

    #[test]
    fn test_answer_outside_options_is_rejected() {
        let text = format!(
            "[{}, {}]",
            r#"{"question":"Q1","options":["A","B","C","D"],"correctAnswer":"A"}"#,
            r#"{"question":"Q2","options":["A","B","C","D"],"correctAnswer":"a"}"#
        );

        assert_eq!(
            parse_quiz(&text),
            Err(QuizParseError::AnswerNotAnOption { index: 1 })
        );
    }

    #[test]
    fn test_parse_error_converts_to_malformed_quiz() {
        let error: EngineError = QuizParseError::NotAList.into();

        assert!(matches!(error, EngineError::MalformedQuiz(reason) if reason == "quiz JSON is not a list"));
    }
}
