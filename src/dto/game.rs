use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::validation::validate_player_name,
    state::{
        QuizPhase,
        question::{Difficulty, Question},
        session::{OutcomeRecord, PlaySession},
    },
};

/// Payload used to obtain a session identifier.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateSessionRequest {
    /// Previously issued identifier to reuse; a fresh one is issued when
    /// absent or blank.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Payload used to start a run within a session.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StartGameRequest {
    /// Session to start the run in; a fresh session is created when absent.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Display name of the player; must not be blank.
    pub player_name: String,
}

impl Validate for StartGameRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_player_name(&self.player_name) {
            errors.add("player_name", e);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Payload submitting an answer for the current question.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AnswerRequest {
    /// Session submitting the answer.
    pub session_id: String,
    /// 0-based index of the chosen option.
    pub option_index: usize,
}

/// Payload referencing an existing session, used by advance and restart.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SessionRequest {
    /// Target session.
    pub session_id: String,
}

/// Response to a session creation request.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionCreatedResponse {
    /// Identifier to use for all subsequent game calls.
    pub session_id: String,
}

/// Lifecycle phase as exposed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PhaseDto {
    /// Waiting for a name and a start.
    Welcome,
    /// A run is in progress.
    Playing,
    /// The run ended on a wrong answer.
    GameOver,
    /// The run cleared every question.
    Complete,
}

impl From<QuizPhase> for PhaseDto {
    fn from(phase: QuizPhase) -> Self {
        match phase {
            QuizPhase::Welcome => PhaseDto::Welcome,
            QuizPhase::Playing => PhaseDto::Playing,
            QuizPhase::GameOver => PhaseDto::GameOver,
            QuizPhase::Complete => PhaseDto::Complete,
        }
    }
}

/// Projection of the current question that never leaks the correct option.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionView {
    /// Ordinal identifier of the question.
    pub id: u32,
    /// The question itself.
    pub prompt: String,
    /// Short framing text setting up the situation.
    pub scenario: String,
    /// Difficulty tier.
    pub difficulty: &'static str,
    /// Option texts in display order.
    pub options: Vec<String>,
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id,
            prompt: question.prompt.clone(),
            scenario: question.scenario.clone(),
            difficulty: difficulty_label(question.difficulty),
            options: question
                .options
                .iter()
                .map(|option| option.text.clone())
                .collect(),
        }
    }
}

fn difficulty_label(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Basic => "basic",
        Difficulty::Advanced => "advanced",
        Difficulty::Roleplay => "roleplay",
    }
}

/// Feedback shown once the current question has been answered.
#[derive(Debug, Serialize, ToSchema)]
pub struct RevealDto {
    /// Option the player picked.
    pub selected_index: usize,
    /// The single correct option.
    pub correct_index: usize,
    /// Whether the pick was correct.
    pub correct: bool,
    /// Explanation attached to the picked option.
    pub explanation: String,
}

/// Terminal outcome of a run, included when an answer ended it.
#[derive(Debug, Serialize, ToSchema)]
pub struct OutcomeDto {
    /// Final score.
    pub score: u32,
    /// Questions attempted.
    pub total_questions: u32,
    /// Whether the full set was cleared.
    pub completed: bool,
    /// Elapsed seconds, rounded to two decimals.
    pub time_spent_seconds: f64,
}

impl From<&OutcomeRecord> for OutcomeDto {
    fn from(outcome: &OutcomeRecord) -> Self {
        Self {
            score: outcome.score,
            total_questions: outcome.total_questions,
            completed: outcome.completed,
            time_spent_seconds: outcome.display_seconds(),
        }
    }
}

/// Full client-facing snapshot of one play session.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameStateResponse {
    /// Owning session.
    pub session_id: String,
    /// Current lifecycle phase.
    pub phase: PhaseDto,
    /// Name the run started under, if any.
    pub player_name: Option<String>,
    /// 0-based index of the question currently faced.
    pub question_index: usize,
    /// Size of the question set.
    pub total_questions: usize,
    /// Points accumulated so far.
    pub score: u32,
    /// Seconds elapsed since the run started, rounded to two decimals.
    pub elapsed_seconds: f64,
    /// Current question while playing, without the answer key.
    pub question: Option<QuestionView>,
    /// Reveal feedback when the current question has been answered.
    pub reveal: Option<RevealDto>,
}

impl GameStateResponse {
    /// Project a session into its client-facing snapshot.
    pub fn from_session(session: &PlaySession) -> Self {
        let questions = session.questions();
        let current = questions.get(session.current_index());

        let question = match session.phase() {
            QuizPhase::Playing => current.map(QuestionView::from),
            _ => None,
        };

        let reveal = if session.reveal() {
            session.selected_option().and_then(|selected_index| {
                let question = current?;
                let option = question.options.get(selected_index)?;
                let correct_index = question.correct_option()?;
                Some(RevealDto {
                    selected_index,
                    correct_index,
                    correct: option.is_correct,
                    explanation: option.explanation.clone(),
                })
            })
        } else {
            None
        };

        Self {
            session_id: session.session_id().to_owned(),
            phase: session.phase().into(),
            player_name: session.player_name().map(str::to_owned),
            question_index: session.current_index(),
            total_questions: questions.len(),
            score: session.score(),
            elapsed_seconds: (session.elapsed_seconds() * 100.0).round() / 100.0,
            question,
            reveal,
        }
    }
}

/// Response to an answer submission: the new snapshot plus the terminal
/// outcome when the answer ended the run.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnswerResponse {
    /// Snapshot after the answer was applied.
    pub state: GameStateResponse,
    /// Present only when the answer moved the run to a terminal phase.
    pub outcome: Option<OutcomeDto>,
}
