use thiserror::Error;

/// Lifecycle phases of one quiz play-through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    /// Waiting for the player to enter a name and start.
    Welcome,
    /// A run is in progress; questions are being answered.
    Playing,
    /// Terminal: the player picked a wrong option and the run ended early.
    GameOver,
    /// Terminal: every question was answered correctly.
    Complete,
}

impl QuizPhase {
    /// Whether this phase is one of the two terminal outcomes.
    pub fn is_terminal(&self) -> bool {
        matches!(self, QuizPhase::GameOver | QuizPhase::Complete)
    }
}

/// Events that can be applied to the quiz state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizEvent {
    /// Player submitted a name and begins the run.
    StartGame,
    /// The selected option was correct; `last` marks the final question.
    CorrectAnswer {
        /// True when the answered question was the last of the set.
        last: bool,
    },
    /// The selected option was wrong, ending the run immediately.
    WrongAnswer,
    /// Move on to the next question after a correct reveal.
    Advance,
    /// Return from a terminal phase to a fresh welcome screen.
    Restart,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the state machine was in when the invalid event was received.
    pub from: QuizPhase,
    /// The event that cannot be applied from this phase.
    pub event: QuizEvent,
}

/// State machine implementing the quiz flow: `Welcome -> Playing -> {GameOver | Complete}`,
/// with `Restart` as the only way out of a terminal phase.
#[derive(Debug, Clone)]
pub struct QuizStateMachine {
    phase: QuizPhase,
}

impl Default for QuizStateMachine {
    fn default() -> Self {
        Self {
            phase: QuizPhase::Welcome,
        }
    }
}

impl QuizStateMachine {
    /// Create a new state machine initialised in the welcome phase.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    /// Apply an event, moving to the next phase when the transition is valid.
    pub fn apply(&mut self, event: QuizEvent) -> Result<QuizPhase, InvalidTransition> {
        let next = self.compute_transition(event)?;
        self.phase = next;
        Ok(next)
    }

    /// Compute the phase an event would lead to if the transition is valid.
    fn compute_transition(&self, event: QuizEvent) -> Result<QuizPhase, InvalidTransition> {
        let next = match (self.phase, event) {
            (QuizPhase::Welcome, QuizEvent::StartGame) => QuizPhase::Playing,
            (QuizPhase::Playing, QuizEvent::CorrectAnswer { last: false }) => QuizPhase::Playing,
            (QuizPhase::Playing, QuizEvent::CorrectAnswer { last: true }) => QuizPhase::Complete,
            (QuizPhase::Playing, QuizEvent::WrongAnswer) => QuizPhase::GameOver,
            (QuizPhase::Playing, QuizEvent::Advance) => QuizPhase::Playing,
            (QuizPhase::GameOver | QuizPhase::Complete, QuizEvent::Restart) => QuizPhase::Welcome,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(sm: &mut QuizStateMachine, event: QuizEvent) -> QuizPhase {
        sm.apply(event).unwrap()
    }

    #[test]
    fn initial_state_is_welcome() {
        let sm = QuizStateMachine::new();
        assert_eq!(sm.phase(), QuizPhase::Welcome);
    }

    #[test]
    fn full_run_reaches_complete() {
        let mut sm = QuizStateMachine::new();

        assert_eq!(apply(&mut sm, QuizEvent::StartGame), QuizPhase::Playing);
        assert_eq!(
            apply(&mut sm, QuizEvent::CorrectAnswer { last: false }),
            QuizPhase::Playing
        );
        assert_eq!(apply(&mut sm, QuizEvent::Advance), QuizPhase::Playing);
        assert_eq!(
            apply(&mut sm, QuizEvent::CorrectAnswer { last: true }),
            QuizPhase::Complete
        );
        assert!(sm.phase().is_terminal());
    }

    #[test]
    fn wrong_answer_ends_the_run() {
        let mut sm = QuizStateMachine::new();
        apply(&mut sm, QuizEvent::StartGame);

        assert_eq!(apply(&mut sm, QuizEvent::WrongAnswer), QuizPhase::GameOver);
        assert!(sm.phase().is_terminal());
    }

    #[test]
    fn restart_leaves_both_terminal_phases() {
        let mut sm = QuizStateMachine::new();
        apply(&mut sm, QuizEvent::StartGame);
        apply(&mut sm, QuizEvent::WrongAnswer);
        assert_eq!(apply(&mut sm, QuizEvent::Restart), QuizPhase::Welcome);

        apply(&mut sm, QuizEvent::StartGame);
        apply(&mut sm, QuizEvent::CorrectAnswer { last: true });
        assert_eq!(sm.phase(), QuizPhase::Complete);
        assert_eq!(apply(&mut sm, QuizEvent::Restart), QuizPhase::Welcome);
    }

    #[test]
    fn invalid_transition_returns_error() {
        let mut sm = QuizStateMachine::new();
        let err = sm.apply(QuizEvent::Advance).unwrap_err();
        assert_eq!(err.from, QuizPhase::Welcome);
        assert_eq!(err.event, QuizEvent::Advance);
        // The failed event must not move the machine.
        assert_eq!(sm.phase(), QuizPhase::Welcome);
    }

    #[test]
    fn restart_is_rejected_outside_terminal_phases() {
        let mut sm = QuizStateMachine::new();
        assert!(sm.apply(QuizEvent::Restart).is_err());

        sm.apply(QuizEvent::StartGame).unwrap();
        assert!(sm.apply(QuizEvent::Restart).is_err());
    }
}
