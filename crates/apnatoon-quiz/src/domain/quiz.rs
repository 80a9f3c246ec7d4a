//! The quiz state machine, free of timers and I/O.
//!
//! Per question: `Unanswered → Answered → (Unanswered[next] | Result)`.
//! The caller decides when an answered question advances.

use serde::{Deserialize, Serialize};

use crate::domain::parser::{QuizParseError, QuizQuestion};

/// Where the current question stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionStage {
    /// Waiting for an answer.
    Unanswered,
    /// An answer is recorded and showing its feedback.
    Answered,
    /// The last question was answered; the score is final.
    Result,
}

/// How one option should be highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionFeedback {
    /// Not selected, or nothing selected yet.
    Neutral,
    /// Selected and correct.
    Correct,
    /// Selected and wrong.
    Incorrect,
}

/// Overall judgement of a finished quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// Every answer was right.
    Perfect,
    /// Some answers were right.
    Good,
    /// No answers were right.
    KeepTrying,
}

/// Final score of a quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    /// Correct answers.
    pub score: usize,
    /// Questions asked.
    pub total: usize,
}

impl QuizResult {
    /// Judges the score against the number of questions.
    #[must_use]
    pub fn verdict(&self) -> Verdict {
        if self.score == self.total {
            Verdict::Perfect
        } else if self.score > 0 {
            Verdict::Good
        } else {
            Verdict::KeepTrying
        }
    }
}

/// What an advance did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved on to the question at this index.
    NextQuestion(usize),
    /// The quiz is over.
    Finished(QuizResult),
}

/// A scored pass over a fixed list of questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSession {
    questions: Vec<QuizQuestion>,
    current_index: usize,
    score: usize,
    selected_answer: Option<String>,
    stage: QuestionStage,
}

impl QuizSession {
    /// Starts at the first question with a zero score.
    ///
    /// # Errors
    ///
    /// Returns `QuizParseError::Empty` if `questions` is empty.
    pub fn new(questions: Vec<QuizQuestion>) -> Result<Self, QuizParseError> {
        if questions.is_empty() {
            return Err(QuizParseError::Empty);
        }
        Ok(Self {
            questions,
            current_index: 0,
            score: 0,
            selected_answer: None,
            stage: QuestionStage::Unanswered,
        })
    }

    /// All questions, in order.
    #[must_use]
    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    /// Number of questions.
    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// Index of the question being shown.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The question being shown.
    #[must_use]
    pub fn current_question(&self) -> &QuizQuestion {
        &self.questions[self.current_index]
    }

    /// Correct answers so far.
    #[must_use]
    pub fn score(&self) -> usize {
        self.score
    }

    /// The answer picked for the current question, if any.
    #[must_use]
    pub fn selected_answer(&self) -> Option<&str> {
        self.selected_answer.as_deref()
    }

    /// Where the current question stands.
    #[must_use]
    pub fn stage(&self) -> QuestionStage {
        self.stage
    }

    /// The final score, once the last question is done.
    #[must_use]
    pub fn result(&self) -> Option<QuizResult> {
        (self.stage == QuestionStage::Result).then_some(QuizResult {
            score: self.score,
            total: self.total(),
        })
    }

    /// Records `option` for the current question.
    ///
    /// Returns whether it was correct, or `None` if an answer is already
    /// recorded or the quiz is over. Matching is exact string equality.
    pub fn answer(&mut self, option: &str) -> Option<bool> {
        if self.stage != QuestionStage::Unanswered {
            return None;
        }
        let correct = option == self.current_question().correct_answer;
        if correct {
            self.score += 1;
        }
        self.selected_answer = Some(option.to_owned());
        self.stage = QuestionStage::Answered;
        Some(correct)
    }

    /// Leaves the answered question. Returns `None` unless in `Answered`.
    pub fn advance(&mut self) -> Option<Advance> {
        if self.stage != QuestionStage::Answered {
            return None;
        }
        if self.current_index + 1 < self.total() {
            self.current_index += 1;
            self.selected_answer = None;
            self.stage = QuestionStage::Unanswered;
            Some(Advance::NextQuestion(self.current_index))
        } else {
            self.stage = QuestionStage::Result;
            Some(Advance::Finished(QuizResult {
                score: self.score,
                total: self.total(),
            }))
        }
    }

    /// Highlighting for one option of the current question. Only the
    /// selected option is ever highlighted.
    #[must_use]
    pub fn option_feedback(&self, option: &str) -> OptionFeedback {
        match self.selected_answer.as_deref() {
            Some(selected) if selected == option => {
                if option == self.current_question().correct_answer {
                    OptionFeedback::Correct
                } else {
                    OptionFeedback::Incorrect
                }
            }
            _ => OptionFeedback::Neutral,
        }
    }
}
