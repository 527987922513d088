use std::{
    sync::Arc,
    time::{Instant, SystemTime, UNIX_EPOCH},
};

use rand::distr::{Alphanumeric, SampleString};
use thiserror::Error;

use crate::state::{
    question::QuestionSet,
    state_machine::{InvalidTransition, QuizEvent, QuizPhase, QuizStateMachine},
};

const SESSION_SUFFIX_LEN: usize = 7;

/// Issue a fresh session identifier: coarse timestamp plus a random suffix.
///
/// Collisions would need two issues within the same millisecond drawing the
/// same suffix, which is negligible at this traffic volume.
pub fn issue_session_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();
    let suffix = Alphanumeric
        .sample_string(&mut rand::rng(), SESSION_SUFFIX_LEN)
        .to_lowercase();
    format!("session_{millis}_{suffix}")
}

/// Errors raised by play-session operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Player name was empty or whitespace-only at start.
    #[error("player name must not be empty")]
    BlankName,
    /// The selected option index does not exist on the current question.
    #[error("option index {index} is out of range for the current question")]
    OptionOutOfRange {
        /// The rejected option index.
        index: usize,
    },
    /// An answer was submitted outside the playing phase.
    #[error("answers are not accepted while in {phase:?}")]
    NotAcceptingAnswers {
        /// Phase the session was in.
        phase: QuizPhase,
    },
    /// Advance requested without a correct reveal, or on the last question.
    #[error("cannot advance: the current question has not been answered correctly")]
    AdvanceUnavailable,
    /// The underlying state machine rejected the transition.
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
}

/// Snapshot of a finished play-through, produced on each terminal transition.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeRecord {
    /// Points accumulated before the run ended.
    pub score: u32,
    /// 1-based count of questions attempted (full set size on completion).
    pub total_questions: u32,
    /// True only when every question was answered correctly.
    pub completed: bool,
    /// Wall-clock seconds between start and the terminal transition.
    pub elapsed_seconds: f64,
}

impl OutcomeRecord {
    /// Elapsed time rounded to the nearest whole second for persistence.
    pub fn time_spent(&self) -> u64 {
        self.elapsed_seconds.round().max(0.0) as u64
    }

    /// Elapsed time rounded to two decimal places for display.
    pub fn display_seconds(&self) -> f64 {
        (self.elapsed_seconds * 100.0).round() / 100.0
    }
}

/// Result of submitting an answer.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerOutcome {
    /// A reveal was already active for this question; nothing changed.
    Ignored,
    /// Correct answer on a non-final question; awaiting an explicit advance.
    Revealed,
    /// Wrong answer; the run ended in `GameOver`.
    Failed(OutcomeRecord),
    /// Correct answer on the last question; the run ended in `Complete`.
    Completed(OutcomeRecord),
}

/// Mutable state of one play-through, owned by the session registry.
///
/// All operations are synchronous; persistence of terminal outcomes is the
/// caller's concern and never blocks a transition.
#[derive(Debug, Clone)]
pub struct PlaySession {
    session_id: String,
    machine: QuizStateMachine,
    questions: Arc<QuestionSet>,
    player_name: Option<String>,
    current_index: usize,
    score: u32,
    selected_option: Option<usize>,
    reveal: bool,
    started_at: Option<Instant>,
}

impl PlaySession {
    /// Create a pristine session bound to a validated question set.
    pub fn new(session_id: String, questions: Arc<QuestionSet>) -> Self {
        Self {
            session_id,
            machine: QuizStateMachine::new(),
            questions,
            player_name: None,
            current_index: 0,
            score: 0,
            selected_option: None,
            reveal: false,
            started_at: None,
        }
    }

    /// Stable identifier of the owning session.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> QuizPhase {
        self.machine.phase()
    }

    /// Name supplied when the run started, if any.
    pub fn player_name(&self) -> Option<&str> {
        self.player_name.as_deref()
    }

    /// 0-based index of the question currently faced.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Points accumulated so far.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Option picked for the current question, if a reveal is active.
    pub fn selected_option(&self) -> Option<usize> {
        self.selected_option
    }

    /// Whether the answer for the current question has been revealed.
    pub fn reveal(&self) -> bool {
        self.reveal
    }

    /// Whether a start timestamp has been recorded for the current run.
    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    /// The question set this session plays through.
    pub fn questions(&self) -> &Arc<QuestionSet> {
        &self.questions
    }

    /// Seconds elapsed since the run started, or zero before any start.
    pub fn elapsed_seconds(&self) -> f64 {
        self.started_at
            .map(|start| start.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Begin a run. Rejects blank names without leaving `Welcome` and
    /// without recording a start timestamp.
    pub fn start(&mut self, player_name: &str) -> Result<(), SessionError> {
        let name = player_name.trim();
        if name.is_empty() {
            return Err(SessionError::BlankName);
        }

        self.machine.apply(QuizEvent::StartGame)?;
        self.player_name = Some(name.to_owned());
        self.current_index = 0;
        self.score = 0;
        self.selected_option = None;
        self.reveal = false;
        self.started_at = Some(Instant::now());
        Ok(())
    }

    /// Submit an answer for the current question.
    ///
    /// A second submission while a reveal is active is a deliberate no-op so
    /// double-clicks cannot double-score or double-fail a question.
    pub fn select_answer(&mut self, option_index: usize) -> Result<AnswerOutcome, SessionError> {
        let phase = self.machine.phase();
        if phase != QuizPhase::Playing {
            return Err(SessionError::NotAcceptingAnswers { phase });
        }
        if self.reveal {
            return Ok(AnswerOutcome::Ignored);
        }

        let question = self
            .questions
            .get(self.current_index)
            .ok_or(SessionError::NotAcceptingAnswers { phase })?;
        let option = question
            .options
            .get(option_index)
            .ok_or(SessionError::OptionOutOfRange {
                index: option_index,
            })?;

        let correct = option.is_correct;
        let last = self.current_index == self.questions.last_index();

        self.selected_option = Some(option_index);
        self.reveal = true;

        if correct {
            self.score += 1;
            self.machine.apply(QuizEvent::CorrectAnswer { last })?;
            if last {
                Ok(AnswerOutcome::Completed(self.outcome(true)))
            } else {
                Ok(AnswerOutcome::Revealed)
            }
        } else {
            self.machine.apply(QuizEvent::WrongAnswer)?;
            Ok(AnswerOutcome::Failed(self.outcome(false)))
        }
    }

    /// Move to the next question after a correct reveal.
    pub fn advance(&mut self) -> Result<(), SessionError> {
        let phase = self.machine.phase();
        if phase != QuizPhase::Playing {
            return Err(SessionError::Transition(InvalidTransition {
                from: phase,
                event: QuizEvent::Advance,
            }));
        }

        let answered_correctly = self.reveal
            && self
                .selected_option
                .and_then(|index| {
                    self.questions
                        .get(self.current_index)
                        .and_then(|question| question.options.get(index))
                })
                .is_some_and(|option| option.is_correct);
        let last = self.current_index == self.questions.last_index();

        if !answered_correctly || last {
            return Err(SessionError::AdvanceUnavailable);
        }

        self.machine.apply(QuizEvent::Advance)?;
        self.current_index += 1;
        self.selected_option = None;
        self.reveal = false;
        Ok(())
    }

    /// Reset from a terminal phase back to a pristine welcome state.
    pub fn restart(&mut self) -> Result<(), SessionError> {
        self.machine.apply(QuizEvent::Restart)?;
        self.player_name = None;
        self.current_index = 0;
        self.score = 0;
        self.selected_option = None;
        self.reveal = false;
        self.started_at = None;
        Ok(())
    }

    fn outcome(&self, completed: bool) -> OutcomeRecord {
        let total_questions = if completed {
            self.questions.len() as u32
        } else {
            self.current_index as u32 + 1
        };

        OutcomeRecord {
            score: self.score,
            total_questions,
            completed,
            elapsed_seconds: self.elapsed_seconds(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::question::{AnswerOption, Difficulty, Question};

    fn question_set(count: usize) -> Arc<QuestionSet> {
        let questions = (0..count)
            .map(|i| Question {
                id: i as u32 + 1,
                prompt: format!("prompt {i}"),
                scenario: format!("scenario {i}"),
                difficulty: Difficulty::Basic,
                options: vec![
                    AnswerOption {
                        text: "wrong".into(),
                        is_correct: false,
                        explanation: "wrong move".into(),
                    },
                    AnswerOption {
                        text: "right".into(),
                        is_correct: true,
                        explanation: "right move".into(),
                    },
                ],
            })
            .collect();
        Arc::new(QuestionSet::new(questions).unwrap())
    }

    fn session(count: usize) -> PlaySession {
        PlaySession::new("session_test".into(), question_set(count))
    }

    #[test]
    fn blank_name_is_rejected_and_nothing_starts() {
        let mut play = session(3);

        assert_eq!(play.start(""), Err(SessionError::BlankName));
        assert_eq!(play.start("   "), Err(SessionError::BlankName));
        assert_eq!(play.phase(), QuizPhase::Welcome);
        assert!(!play.has_started());
        assert!(play.player_name().is_none());
    }

    #[test]
    fn full_correct_run_completes_with_full_score() {
        let mut play = session(3);
        play.start("Rosa").unwrap();

        assert_eq!(play.select_answer(1).unwrap(), AnswerOutcome::Revealed);
        play.advance().unwrap();
        assert_eq!(play.select_answer(1).unwrap(), AnswerOutcome::Revealed);
        play.advance().unwrap();

        let outcome = match play.select_answer(1).unwrap() {
            AnswerOutcome::Completed(outcome) => outcome,
            other => panic!("expected completion, got {other:?}"),
        };

        assert_eq!(play.phase(), QuizPhase::Complete);
        assert_eq!(outcome.score, 3);
        assert_eq!(outcome.total_questions, 3);
        assert!(outcome.completed);
    }

    #[test]
    fn wrong_answer_at_index_k_fails_with_k_points() {
        let mut play = session(5);
        play.start("Karl").unwrap();

        // Two correct answers, then a wrong one at index 2.
        play.select_answer(1).unwrap();
        play.advance().unwrap();
        play.select_answer(1).unwrap();
        play.advance().unwrap();

        let outcome = match play.select_answer(0).unwrap() {
            AnswerOutcome::Failed(outcome) => outcome,
            other => panic!("expected failure, got {other:?}"),
        };

        assert_eq!(play.phase(), QuizPhase::GameOver);
        assert_eq!(outcome.score, 2);
        assert_eq!(outcome.total_questions, 3);
        assert!(!outcome.completed);
    }

    #[test]
    fn wrong_answer_on_first_question_ends_immediately() {
        let mut play = session(5);
        play.start("Vera").unwrap();

        let outcome = match play.select_answer(0).unwrap() {
            AnswerOutcome::Failed(outcome) => outcome,
            other => panic!("expected failure, got {other:?}"),
        };

        assert_eq!(outcome.score, 0);
        assert_eq!(outcome.total_questions, 1);
    }

    #[test]
    fn second_answer_during_reveal_is_a_no_op() {
        let mut play = session(3);
        play.start("Rosa").unwrap();
        play.select_answer(1).unwrap();

        let score = play.score();
        let index = play.current_index();

        assert_eq!(play.select_answer(0).unwrap(), AnswerOutcome::Ignored);
        assert_eq!(play.score(), score);
        assert_eq!(play.current_index(), index);
        assert!(play.reveal());
        assert_eq!(play.phase(), QuizPhase::Playing);
    }

    #[test]
    fn advance_requires_a_correct_reveal() {
        let mut play = session(3);
        play.start("Rosa").unwrap();

        // Nothing answered yet.
        assert_eq!(play.advance(), Err(SessionError::AdvanceUnavailable));

        play.select_answer(1).unwrap();
        play.advance().unwrap();
        assert_eq!(play.current_index(), 1);
        assert!(!play.reveal());
        assert!(play.selected_option().is_none());
    }

    #[test]
    fn advance_is_invalid_on_the_last_question() {
        let mut play = session(1);
        play.start("Rosa").unwrap();

        // Completing the single question moves to a terminal phase; the
        // advance is rejected by the state machine, not the reveal check.
        play.select_answer(1).unwrap();
        assert!(matches!(
            play.advance(),
            Err(SessionError::Transition(_))
        ));
    }

    #[test]
    fn out_of_range_option_is_an_error() {
        let mut play = session(3);
        play.start("Rosa").unwrap();

        assert_eq!(
            play.select_answer(9),
            Err(SessionError::OptionOutOfRange { index: 9 })
        );
        // A rejected submission must not flip the reveal flag.
        assert!(!play.reveal());
    }

    #[test]
    fn answers_outside_playing_are_rejected() {
        let mut play = session(3);
        assert_eq!(
            play.select_answer(0),
            Err(SessionError::NotAcceptingAnswers {
                phase: QuizPhase::Welcome
            })
        );
    }

    #[test]
    fn restart_resets_everything_from_both_terminals() {
        let mut play = session(2);
        play.start("Karl").unwrap();
        play.select_answer(0).unwrap();
        assert_eq!(play.phase(), QuizPhase::GameOver);

        play.restart().unwrap();
        assert_eq!(play.phase(), QuizPhase::Welcome);
        assert_eq!(play.score(), 0);
        assert_eq!(play.current_index(), 0);
        assert!(play.player_name().is_none());
        assert!(!play.has_started());
        assert!(!play.reveal());

        play.start("Karl").unwrap();
        play.select_answer(1).unwrap();
        play.advance().unwrap();
        play.select_answer(1).unwrap();
        assert_eq!(play.phase(), QuizPhase::Complete);

        play.restart().unwrap();
        assert_eq!(play.phase(), QuizPhase::Welcome);
        assert!(!play.has_started());
    }

    #[test]
    fn elapsed_rounding_for_persistence_and_display() {
        let outcome = OutcomeRecord {
            score: 3,
            total_questions: 3,
            completed: true,
            elapsed_seconds: 12.5,
        };
        assert_eq!(outcome.time_spent(), 13);
        assert_eq!(outcome.display_seconds(), 12.5);

        let outcome = OutcomeRecord {
            score: 1,
            total_questions: 2,
            completed: false,
            elapsed_seconds: 7.4049,
        };
        assert_eq!(outcome.time_spent(), 7);
        assert_eq!(outcome.display_seconds(), 7.4);
    }

    #[test]
    fn session_ids_are_prefixed_and_distinct() {
        let a = issue_session_id();
        let b = issue_session_id();
        assert!(a.starts_with("session_"));
        assert_ne!(a, b);
    }
}
