use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::domain::question::{DifficultyLevel, Question, QuestionType};
use crate::models::domain::score::Score;

pub const META_HINTS_USED: &str = "hints_used";

/// One submitted token: an answer id, free text, or a boolean.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum AnswerToken {
    Flag(bool),
    Text(String),
}

impl AnswerToken {
    pub fn text(value: &str) -> Self {
        AnswerToken::Text(value.to_string())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnswerToken::Text(text) => Some(text),
            AnswerToken::Flag(_) => None,
        }
    }

    /// String form used when comparing against answer ids.
    pub fn to_token_string(&self) -> String {
        match self {
            AnswerToken::Flag(flag) => flag.to_string(),
            AnswerToken::Text(text) => text.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct QuestionAnswer {
    pub id: String,
    pub question_id: String,
    pub question_type: QuestionType,
    pub difficulty: DifficultyLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub submitted: Vec<AnswerToken>,
    pub time_spent_secs: u32,
    pub score: Score,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,
    pub answered_at: DateTime<Utc>,
}

impl QuestionAnswer {
    /// Validates the submission shape against the question and captures the result.
    pub fn new(
        question: &Question,
        submitted: Vec<AnswerToken>,
        time_spent_secs: i64,
        max_time_spent_secs: u32,
        score: Score,
    ) -> AppResult<Self> {
        if time_spent_secs < 0 || time_spent_secs > max_time_spent_secs as i64 {
            return Err(AppError::ValidationError(format!(
                "Time spent must be within [0, {}] seconds, got {}",
                max_time_spent_secs, time_spent_secs
            )));
        }

        validate_arity(question, &submitted)?;

        Ok(QuestionAnswer {
            id: Uuid::new_v4().to_string(),
            question_id: question.id.clone(),
            question_type: question.question_type,
            difficulty: question.difficulty,
            category: question.category.clone(),
            submitted,
            time_spent_secs: time_spent_secs as u32,
            score,
            metadata: BTreeMap::new(),
            answered_at: Utc::now(),
        })
    }

    pub fn with_hints_used(mut self, hints_used: u32) -> Self {
        self.metadata
            .insert(META_HINTS_USED.to_string(), Value::from(hints_used));
        self
    }

    pub fn hints_used(&self) -> u32 {
        self.metadata
            .get(META_HINTS_USED)
            .and_then(Value::as_u64)
            .unwrap_or(0) as u32
    }

    pub fn is_correct(&self) -> bool {
        self.score.is_full_credit()
    }

    pub fn is_pending_manual_grading(&self) -> bool {
        self.score.is_pending_manual_grading()
    }
}

fn validate_arity(question: &Question, submitted: &[AnswerToken]) -> AppResult<()> {
    match question.question_type {
        QuestionType::TrueFalse => match submitted {
            [AnswerToken::Flag(_)] => Ok(()),
            _ => Err(AppError::ValidationError(format!(
                "True/false question '{}' expects exactly one boolean answer",
                question.id
            ))),
        },
        QuestionType::Essay | QuestionType::CodeCompletion => match submitted {
            [AnswerToken::Text(_)] => Ok(()),
            _ => Err(AppError::ValidationError(format!(
                "{} question '{}' expects exactly one text answer",
                question.question_type.as_str(),
                question.id
            ))),
        },
        QuestionType::SingleChoice | QuestionType::MultipleChoice => Ok(()),
    }
}
