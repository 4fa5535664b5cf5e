use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::domain::adaptive_profile::RecommendationStrategy;
use crate::models::domain::quiz_session::SessionStatus;
use crate::models::domain::score::ScoreStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScoreView {
    pub points: f64,
    pub max_points: f64,
    pub percentage: f64,
    pub status: ScoreStatus,
    pub requires_manual_grading: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub breakdown: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SessionSummary {
    pub session_id: String,
    pub user_id: String,
    pub status: SessionStatus,
    pub total_questions: usize,
    pub answered_questions: usize,
    pub current_question_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_question_id: Option<String>,
    pub progress: f64,
    pub progress_percentage: f64,
    pub accuracy: f64,
    pub points_earned: f64,
    pub max_points: f64,
    pub score_percentage: f64,
    pub pending_manual_grading: usize,
    pub average_time_spent_secs: f64,
    pub target_difficulty: u8,
    pub adaptive: bool,
    pub practice_mode: bool,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit_secs: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_secs: Option<i64>,
    pub is_timed_out: bool,
    pub elapsed_secs: i64,
}

/// Accuracy for one group of answers (a category or a difficulty level).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GroupProgress {
    pub key: String,
    pub answered: usize,
    pub correct: usize,
    pub accuracy: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StreakData {
    pub current: usize,
    pub longest: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceTrend {
    Improving,
    Declining,
    Stable,
    InsufficientData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProgressSummary {
    pub session_id: String,
    pub answered_questions: usize,
    pub total_questions: usize,
    pub progress: f64,
    pub accuracy: f64,
    pub streak: StreakData,
    pub category_progress: Vec<GroupProgress>,
    pub difficulty_progress: Vec<GroupProgress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weakest_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strongest_category: Option<String>,
    pub trend: PerformanceTrend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RecommendationSummary {
    pub user_id: String,
    pub recommended_difficulty: u8,
    pub strategy: RecommendationStrategy,
    pub strategy_description: String,
    pub confidence: f64,
    pub confidence_level: String,
    pub learning_velocity: f64,
    pub knowledge_gaps: Vec<u8>,
    pub strong_areas: Vec<u8>,
    pub recent_performance: Vec<f64>,
    pub sessions_analyzed: usize,
}
