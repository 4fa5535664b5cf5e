use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::domain::question::DifficultyLevel;

/// Per-user statistics derived from completed sessions. Never edited by hand;
/// recompute it from the session history instead.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct AdaptiveProfile {
    pub user_id: String,
    /// Session scores (percentages) grouped by the difficulty they were attempted at.
    pub difficulty_profile: BTreeMap<u8, Vec<f64>>,
    pub learning_velocity: f64,
    pub knowledge_gaps: Vec<DifficultyLevel>,
    pub strong_areas: Vec<DifficultyLevel>,
    pub recommended_difficulty: DifficultyLevel,
    pub strategy: RecommendationStrategy,
    /// Trailing raw scores, oldest first.
    pub recent_performance: Vec<f64>,
    pub confidence: f64,
    pub sessions_analyzed: usize,
    pub computed_at: DateTime<Utc>,
}

/// Which branch of the difficulty heuristic produced the recommendation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStrategy {
    Advance,
    Reinforce,
    Maintain,
    Baseline, // no history yet
}

impl AdaptiveProfile {
    pub fn has_history(&self) -> bool {
        self.sessions_analyzed > 0
    }

    pub fn is_gap(&self, level: DifficultyLevel) -> bool {
        self.knowledge_gaps.contains(&level)
    }
}
