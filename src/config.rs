//! Application-level configuration loading, including the runtime question set.

use std::{env, fs, io::ErrorKind, path::PathBuf, sync::Arc, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::question::{AnswerOption, Difficulty, Question, QuestionSet};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "POLICYMAKER_BACK_CONFIG_PATH";

/// How far back a session counts as "online". A product choice, not a
/// correctness requirement, hence configurable.
const DEFAULT_PRESENCE_WINDOW_SECS: u64 = 5 * 60;
/// Interval between presence recomputations.
const DEFAULT_PRESENCE_POLL_SECS: u64 = 10;
/// Window for the live-counter estimate.
const DEFAULT_LIVE_WINDOW_SECS: u64 = 60;
/// Rows kept in the leaderboard and its local fallback mirror.
const DEFAULT_LEADERBOARD_LIMIT: usize = 10;
/// Default location of the local leaderboard fallback mirror.
const DEFAULT_CACHE_PATH: &str = "cache/leaderboard.json";

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    questions: Arc<QuestionSet>,
    presence_window: Duration,
    presence_poll_interval: Duration,
    live_window: Duration,
    leaderboard_limit: usize,
    cache_path: PathBuf,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the
    /// baked-in question set and default tunables.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => match Self::try_from_raw(raw) {
                    Ok(config) => {
                        info!(
                            path = %path.display(),
                            questions = config.questions.len(),
                            "loaded configuration"
                        );
                        config
                    }
                    Err(err) => {
                        warn!(
                            path = %path.display(),
                            error = %err,
                            "configured question set is malformed; falling back to defaults"
                        );
                        Self::default()
                    }
                },
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Build a configuration around a specific question set, keeping default
    /// tunables. Useful when embedding the engine or in tests.
    pub fn with_question_set(questions: QuestionSet) -> Self {
        Self {
            questions: Arc::new(questions),
            ..Self::default()
        }
    }

    /// Override the mirror location, keeping the rest of the configuration.
    /// Useful when embedding the engine or in tests.
    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = path.into();
        self
    }

    /// The validated question set driving every play-through.
    pub fn questions(&self) -> Arc<QuestionSet> {
        Arc::clone(&self.questions)
    }

    /// Staleness window for the online-player estimate.
    pub fn presence_window(&self) -> Duration {
        self.presence_window
    }

    /// Interval between presence recomputations.
    pub fn presence_poll_interval(&self) -> Duration {
        self.presence_poll_interval
    }

    /// Window for the live-counter estimate.
    pub fn live_window(&self) -> Duration {
        self.live_window
    }

    /// Default number of leaderboard rows served and mirrored locally.
    pub fn leaderboard_limit(&self) -> usize {
        self.leaderboard_limit
    }

    /// Path of the local leaderboard fallback mirror.
    pub fn cache_path(&self) -> &PathBuf {
        &self.cache_path
    }

    fn try_from_raw(raw: RawConfig) -> Result<Self, crate::state::question::QuestionSetError> {
        let questions = match raw.questions {
            Some(list) => QuestionSet::new(list)?,
            None => default_question_set(),
        };

        Ok(Self {
            questions: Arc::new(questions),
            presence_window: Duration::from_secs(raw.presence_window_secs),
            presence_poll_interval: Duration::from_secs(raw.presence_poll_interval_secs),
            live_window: Duration::from_secs(raw.live_window_secs),
            leaderboard_limit: raw.leaderboard_limit,
            cache_path: raw.cache_path,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            questions: Arc::new(default_question_set()),
            presence_window: Duration::from_secs(DEFAULT_PRESENCE_WINDOW_SECS),
            presence_poll_interval: Duration::from_secs(DEFAULT_PRESENCE_POLL_SECS),
            live_window: Duration::from_secs(DEFAULT_LIVE_WINDOW_SECS),
            leaderboard_limit: DEFAULT_LEADERBOARD_LIMIT,
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    questions: Option<Vec<Question>>,
    #[serde(default = "default_presence_window_secs")]
    presence_window_secs: u64,
    #[serde(default = "default_presence_poll_secs")]
    presence_poll_interval_secs: u64,
    #[serde(default = "default_live_window_secs")]
    live_window_secs: u64,
    #[serde(default = "default_leaderboard_limit")]
    leaderboard_limit: usize,
    #[serde(default = "default_cache_path")]
    cache_path: PathBuf,
}

fn default_presence_window_secs() -> u64 {
    DEFAULT_PRESENCE_WINDOW_SECS
}

fn default_presence_poll_secs() -> u64 {
    DEFAULT_PRESENCE_POLL_SECS
}

fn default_live_window_secs() -> u64 {
    DEFAULT_LIVE_WINDOW_SECS
}

fn default_leaderboard_limit() -> usize {
    DEFAULT_LEADERBOARD_LIMIT
}

fn default_cache_path() -> PathBuf {
    PathBuf::from(DEFAULT_CACHE_PATH)
}

fn default_question_set() -> QuestionSet {
    QuestionSet::new(default_questions())
        .unwrap_or_else(|err| panic!("built-in question set is invalid: {err}"))
}

/// Built-in question set shipped with the binary: "The Policymaker" mini-game
/// on state theory, five questions with a single correct option each.
fn default_questions() -> Vec<Question> {
    vec![
        Question {
            id: 1,
            prompt: "Class tensions in society are sharpening. What should the state do?"
                .into(),
            scenario: "You are the policymaker on duty.".into(),
            difficulty: Difficulty::Roleplay,
            options: vec![
                AnswerOption {
                    text: "Crack down hard to restore order".into(),
                    is_correct: false,
                    explanation: "Repression only deepens the conflict until revolution erupts."
                        .into(),
                },
                AnswerOption {
                    text: "Reform institutions and rebalance interests".into(),
                    is_correct: true,
                    explanation: "Well-aimed reform lets society develop sustainably.".into(),
                },
            ],
        },
        Question {
            id: 2,
            prompt: "Administrative procedures are a maze and citizens are fed up. Your move?"
                .into(),
            scenario: "Constituents keep filing complaints about red tape.".into(),
            difficulty: Difficulty::Roleplay,
            options: vec![
                AnswerOption {
                    text: "Keep everything as is, process is process".into(),
                    is_correct: false,
                    explanation: "Rigidity erodes public trust in the state apparatus.".into(),
                },
                AnswerOption {
                    text: "Digitise and simplify the procedures".into(),
                    is_correct: true,
                    explanation: "Digital transformation is the path of an enabling state.".into(),
                },
            ],
        },
        Question {
            id: 3,
            prompt: "New technology outpaces the law. Which approach do you pick?".into(),
            scenario: "AI and blockchain are reshaping society faster than legislation.".into(),
            difficulty: Difficulty::Advanced,
            options: vec![
                AnswerOption {
                    text: "Ban it until further study".into(),
                    is_correct: false,
                    explanation: "Blanket bans leave the country trailing the rest of the world."
                        .into(),
                },
                AnswerOption {
                    text: "Run a regulatory sandbox and adjust as you learn".into(),
                    is_correct: true,
                    explanation: "Creating room to experiment is the progressive approach.".into(),
                },
            ],
        },
        Question {
            id: 4,
            prompt: "What is the state, in Marxist-Leninist theory?".into(),
            scenario: "A foundational theory question.".into(),
            difficulty: Difficulty::Basic,
            options: vec![
                AnswerOption {
                    text: "An organisation representing all of society".into(),
                    is_correct: false,
                    explanation:
                        "The state has a class character and serves the ruling class.".into(),
                },
                AnswerOption {
                    text: "An instrument of rule of the dominant class".into(),
                    is_correct: true,
                    explanation:
                        "The state arises from irreconcilable class contradictions.".into(),
                },
            ],
        },
        Question {
            id: 5,
            prompt: "To build a socialist rule-of-law state, what comes first?".into(),
            scenario: "Setting the long-term development direction.".into(),
            difficulty: Difficulty::Advanced,
            options: vec![
                AnswerOption {
                    text: "Concentrate power for efficient governance".into(),
                    is_correct: false,
                    explanation:
                        "Over-concentration invites abuse of power and erodes democracy.".into(),
                },
                AnswerOption {
                    text: "Separate powers with mutual oversight".into(),
                    is_correct: true,
                    explanation:
                        "Controlling power is the core principle of a rule-of-law state.".into(),
                },
            ],
        },
    ]
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
