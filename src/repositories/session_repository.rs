use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{errors::AppResult, models::domain::QuizSession};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Inserts or replaces the session by id.
    async fn save(&self, session: QuizSession) -> AppResult<QuizSession>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizSession>>;
    async fn find_active_by_user(&self, user_id: &str) -> AppResult<Option<QuizSession>>;
    /// Completed sessions of a user, oldest completion first.
    async fn find_completed_by_user(&self, user_id: &str) -> AppResult<Vec<QuizSession>>;
}

#[derive(Clone, Default)]
pub struct InMemorySessionRepository {
    sessions: Arc<RwLock<HashMap<String, QuizSession>>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn save(&self, session: QuizSession) -> AppResult<QuizSession> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizSession>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(id).cloned())
    }

    async fn find_active_by_user(&self, user_id: &str) -> AppResult<Option<QuizSession>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .values()
            .filter(|s| s.user_id == user_id && !s.is_completed())
            .max_by_key(|s| s.started_at)
            .cloned())
    }

    async fn find_completed_by_user(&self, user_id: &str) -> AppResult<Vec<QuizSession>> {
        let sessions = self.sessions.read().await;
        let mut items: Vec<QuizSession> = sessions
            .values()
            .filter(|s| s.user_id == user_id && s.is_completed())
            .cloned()
            .collect();
        items.sort_by(|a, b| a.completed_at.cmp(&b.completed_at).then(a.id.cmp(&b.id)));
        Ok(items)
    }
}
