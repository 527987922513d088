use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Difficulty tier attached to a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Straight theory recall.
    Basic,
    /// Theory applied to a non-obvious situation.
    Advanced,
    /// Player acts out a decision-maker scenario.
    Roleplay,
}

/// One selectable answer for a question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerOption {
    /// Text shown on the answer button.
    pub text: String,
    /// Whether picking this option is the correct move.
    pub is_correct: bool,
    /// Explanation revealed once the question has been answered.
    pub explanation: String,
}

/// A single quiz question with its ordered options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Question {
    /// Ordinal identifier of the question within the set.
    pub id: u32,
    /// The question itself.
    pub prompt: String,
    /// Short framing text setting up the situation.
    pub scenario: String,
    /// Difficulty tier.
    pub difficulty: Difficulty,
    /// Ordered answer options; exactly one must be marked correct.
    pub options: Vec<AnswerOption>,
}

impl Question {
    /// Index of the single correct option.
    ///
    /// The constructor of [`QuestionSet`] guarantees exactly one correct
    /// option per question, so this cannot fail on a validated set.
    pub fn correct_option(&self) -> Option<usize> {
        self.options.iter().position(|option| option.is_correct)
    }
}

/// Errors raised when a question set fails authoring validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuestionSetError {
    /// The set contains no questions at all.
    #[error("question set is empty")]
    Empty,
    /// A question has no options to choose from.
    #[error("question {id} has no options")]
    NoOptions {
        /// Identifier of the offending question.
        id: u32,
    },
    /// A question does not have exactly one option marked correct.
    #[error("question {id} must have exactly one correct option (found {count})")]
    CorrectOptionCount {
        /// Identifier of the offending question.
        id: u32,
        /// Number of options marked correct.
        count: usize,
    },
}

/// Immutable, validated set of questions driving a play-through.
///
/// Validation happens at construction so the scoring path can rely on the
/// single-correct-option invariant instead of authoring discipline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionSet {
    questions: Vec<Question>,
}

impl QuestionSet {
    /// Validate and wrap a list of questions.
    pub fn new(questions: Vec<Question>) -> Result<Self, QuestionSetError> {
        if questions.is_empty() {
            return Err(QuestionSetError::Empty);
        }

        for question in &questions {
            if question.options.is_empty() {
                return Err(QuestionSetError::NoOptions { id: question.id });
            }

            let correct = question
                .options
                .iter()
                .filter(|option| option.is_correct)
                .count();
            if correct != 1 {
                return Err(QuestionSetError::CorrectOptionCount {
                    id: question.id,
                    count: correct,
                });
            }
        }

        Ok(Self { questions })
    }

    /// Number of questions in the set.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Whether the set holds no questions (never true for a validated set).
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Question at the given 0-based index.
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// 0-based index of the last question.
    pub fn last_index(&self) -> usize {
        self.questions.len() - 1
    }

    /// Iterate over the questions in order.
    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(text: &str, is_correct: bool) -> AnswerOption {
        AnswerOption {
            text: text.into(),
            is_correct,
            explanation: format!("because {text}"),
        }
    }

    fn question(id: u32, options: Vec<AnswerOption>) -> Question {
        Question {
            id,
            prompt: format!("prompt {id}"),
            scenario: format!("scenario {id}"),
            difficulty: Difficulty::Basic,
            options,
        }
    }

    #[test]
    fn accepts_single_correct_option() {
        let set = QuestionSet::new(vec![question(
            1,
            vec![option("a", false), option("b", true)],
        )])
        .unwrap();

        assert_eq!(set.len(), 1);
        assert_eq!(set.get(0).unwrap().correct_option(), Some(1));
    }

    #[test]
    fn rejects_empty_set() {
        assert_eq!(QuestionSet::new(vec![]), Err(QuestionSetError::Empty));
    }

    #[test]
    fn rejects_question_without_options() {
        let err = QuestionSet::new(vec![question(3, vec![])]).unwrap_err();
        assert_eq!(err, QuestionSetError::NoOptions { id: 3 });
    }

    #[test]
    fn rejects_zero_correct_options() {
        let err =
            QuestionSet::new(vec![question(7, vec![option("a", false), option("b", false)])])
                .unwrap_err();
        assert_eq!(err, QuestionSetError::CorrectOptionCount { id: 7, count: 0 });
    }

    #[test]
    fn rejects_multiple_correct_options() {
        let err =
            QuestionSet::new(vec![question(8, vec![option("a", true), option("b", true)])])
                .unwrap_err();
        assert_eq!(err, QuestionSetError::CorrectOptionCount { id: 8, count: 2 });
    }
}
