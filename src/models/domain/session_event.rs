//! Session lifecycle events handed to the notification sink.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::dto::read_model::{
    ProgressSummary, RecommendationSummary, ScoreView, SessionSummary,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum SessionEvent {
    SessionStarted {
        user_id: String,
        summary: SessionSummary,
        occurred_at: DateTime<Utc>,
    },
    QuestionAnswered {
        user_id: String,
        session_id: String,
        question_id: String,
        score: ScoreView,
        progress: ProgressSummary,
        occurred_at: DateTime<Utc>,
    },
    SessionCompleted {
        user_id: String,
        summary: SessionSummary,
        #[serde(skip_serializing_if = "Option::is_none")]
        recommendation: Option<RecommendationSummary>,
        occurred_at: DateTime<Utc>,
    },
}

impl SessionEvent {
    pub fn user_id(&self) -> &str {
        match self {
            SessionEvent::SessionStarted { user_id, .. } => user_id,
            SessionEvent::QuestionAnswered { user_id, .. } => user_id,
            SessionEvent::SessionCompleted { user_id, .. } => user_id,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            SessionEvent::SessionStarted { .. } => "session_started",
            SessionEvent::QuestionAnswered { .. } => "question_answered",
            SessionEvent::SessionCompleted { .. } => "session_completed",
        }
    }

    /// Attaches a recommendation to a completion event; other events are returned unchanged.
    pub fn with_recommendation(self, summary: RecommendationSummary) -> Self {
        match self {
            SessionEvent::SessionCompleted {
                user_id,
                summary: session,
                occurred_at,
                ..
            } => SessionEvent::SessionCompleted {
                user_id,
                summary: session,
                recommendation: Some(summary),
                occurred_at,
            },
            other => other,
        }
    }

    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
