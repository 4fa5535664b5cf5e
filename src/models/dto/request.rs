use serde::Deserialize;
use validator::Validate;

use crate::models::domain::question::{DifficultyLevel, QuestionType};
use crate::models::domain::question_answer::AnswerToken;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StartSessionRequest {
    #[validate(length(min = 1, max = 200))]
    pub user_id: String,

    /// Explicit question set. Left empty for adaptive sessions, which pick their own.
    #[serde(default)]
    #[validate(length(max = 200))]
    pub question_ids: Vec<String>,

    #[validate(range(min = 1, max = 200))]
    pub question_count: Option<usize>,

    #[validate(range(min = 1, max = 10))]
    pub target_difficulty: Option<u8>,

    #[serde(default)]
    pub adaptive: bool,

    #[serde(default)]
    pub practice_mode: bool,

    #[validate(range(min = 1, max = 86400))]
    pub time_limit_secs: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    #[validate(length(min = 1))]
    pub session_id: String,

    #[validate(length(min = 1))]
    pub question_id: String,

    #[serde(default)]
    pub answers: Vec<AnswerToken>,

    /// Upper bound comes from `Config::max_time_spent_secs`.
    #[validate(range(min = 0))]
    pub time_spent_secs: i64,

    #[validate(range(max = 100))]
    pub hints_used: Option<u32>,
}

/// Filters for question lookups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionCriteria {
    pub min_difficulty: Option<DifficultyLevel>,
    pub max_difficulty: Option<DifficultyLevel>,
    pub question_types: Vec<QuestionType>,
    pub category: Option<String>,
    pub exclude_ids: Vec<String>,
    pub limit: Option<usize>,
}

impl QuestionCriteria {
    pub fn around(level: DifficultyLevel, spread: u8) -> Self {
        QuestionCriteria {
            min_difficulty: Some(DifficultyLevel::clamped(level.value() as i64 - spread as i64)),
            max_difficulty: Some(DifficultyLevel::clamped(level.value() as i64 + spread as i64)),
            ..Self::default()
        }
    }
}
