use chrono::{DateTime, Duration, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::question::DifficultyLevel;
use crate::models::domain::question_answer::QuestionAnswer;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct QuizSession {
    pub id: String,
    pub user_id: String,
    pub question_ids: Vec<String>, // pre-selected at start, in serving order
    pub question_answers: Vec<QuestionAnswer>,
    pub target_difficulty: DifficultyLevel,
    pub adaptive: bool,
    pub practice_mode: bool,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit_secs: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
}

impl QuizSession {
    pub fn new(
        user_id: &str,
        question_ids: Vec<String>,
        target_difficulty: DifficultyLevel,
        adaptive: bool,
        practice_mode: bool,
        time_limit_secs: Option<u32>,
    ) -> Self {
        QuizSession {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            question_ids,
            question_answers: Vec::new(),
            target_difficulty,
            adaptive,
            practice_mode,
            started_at: Utc::now(),
            completed_at: None,
            time_limit_secs,
        }
    }

    pub fn total_questions(&self) -> usize {
        self.question_ids.len()
    }

    pub fn answered_count(&self) -> usize {
        self.question_answers.len()
    }

    pub fn current_question_index(&self) -> usize {
        self.question_answers.len()
    }

    /// Next question to serve, if any remain.
    pub fn current_question_id(&self) -> Option<&str> {
        self.question_ids
            .get(self.current_question_index())
            .map(String::as_str)
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    pub fn status(&self) -> SessionStatus {
        if self.is_completed() {
            SessionStatus::Completed
        } else {
            SessionStatus::InProgress
        }
    }

    pub fn contains_question(&self, question_id: &str) -> bool {
        self.question_ids.iter().any(|id| id == question_id)
    }

    pub fn has_answered(&self, question_id: &str) -> bool {
        self.question_answers
            .iter()
            .any(|qa| qa.question_id == question_id)
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.time_limit_secs
            .map(|limit| self.started_at + Duration::seconds(limit as i64))
    }

    /// Seconds left before the time limit, floored at zero. `None` when untimed.
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> Option<i64> {
        self.deadline()
            .map(|deadline| (deadline - now).num_seconds().max(0))
    }

    pub fn is_timed_out(&self, now: DateTime<Utc>) -> bool {
        self.deadline().map(|deadline| now >= deadline).unwrap_or(false)
    }

    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> i64 {
        let end = self.completed_at.unwrap_or(now);
        (end - self.started_at).num_seconds().max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_session(time_limit_secs: Option<u32>) -> QuizSession {
        QuizSession::new(
            "user-1",
            vec!["q-1".to_string(), "q-2".to_string()],
            DifficultyLevel::clamped(3),
            false,
            false,
            time_limit_secs,
        )
    }

    #[test]
    fn new_session_starts_in_progress() {
        let session = make_session(None);

        assert_eq!(session.status(), SessionStatus::InProgress);
        assert_eq!(session.total_questions(), 2);
        assert_eq!(session.current_question_index(), 0);
        assert_eq!(session.current_question_id(), Some("q-1"));
        assert!(session.contains_question("q-2"));
        assert!(!session.contains_question("q-3"));
    }

    #[test]
    fn untimed_session_never_times_out() {
        let session = make_session(None);
        let later = session.started_at + Duration::days(3);

        assert_eq!(session.remaining_secs(later), None);
        assert!(!session.is_timed_out(later));
    }

    #[test]
    fn remaining_time_counts_down_and_floors_at_zero() {
        let session = make_session(Some(600));

        let after_100 = session.started_at + Duration::seconds(100);
        assert_eq!(session.remaining_secs(after_100), Some(500));
        assert!(!session.is_timed_out(after_100));

        let after_700 = session.started_at + Duration::seconds(700);
        assert_eq!(session.remaining_secs(after_700), Some(0));
        assert!(session.is_timed_out(after_700));
    }

    #[test]
    fn session_round_trip_serialization() {
        let session = make_session(Some(60));

        let json = serde_json::to_string(&session).expect("session should serialize");
        let parsed: QuizSession = serde_json::from_str(&json).expect("session should deserialize");

        assert_eq!(parsed, session);
    }
}
