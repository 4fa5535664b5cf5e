use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    config::Config,
    errors::AppResult,
    models::{
        domain::{AdaptiveProfile, DifficultyLevel, Question},
        dto::{read_model::RecommendationSummary, request::QuestionCriteria},
    },
    repositories::{QuestionRepository, SessionRepository},
    services::{formatters, recommendation_engine::RecommendationEngine},
};

/// Widest spread tried around the recommended level before giving up on filling the limit.
const MAX_SPREAD: u8 = 9;

pub struct RecommendationService {
    question_repository: Arc<dyn QuestionRepository>,
    session_repository: Arc<dyn SessionRepository>,
    engine: RecommendationEngine,
    ttl: Duration,
    cache: RwLock<HashMap<String, (Instant, AdaptiveProfile)>>,
}

impl RecommendationService {
    pub fn new(
        question_repository: Arc<dyn QuestionRepository>,
        session_repository: Arc<dyn SessionRepository>,
        config: &Config,
    ) -> Self {
        Self {
            question_repository,
            session_repository,
            engine: RecommendationEngine::new(config.clone()),
            ttl: Duration::from_secs(config.profile_cache_ttl_secs),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Cached profile while it is younger than the TTL, otherwise recomputed
    /// from the user's completed sessions.
    pub async fn get_profile(&self, user_id: &str) -> AppResult<AdaptiveProfile> {
        {
            let cache = self.cache.read().await;
            if let Some((stored_at, profile)) = cache.get(user_id) {
                if stored_at.elapsed() < self.ttl {
                    log::debug!("Profile cache hit for user {}", user_id);
                    return Ok(profile.clone());
                }
            }
        }

        let sessions = self.session_repository.find_completed_by_user(user_id).await?;
        let profile = self.engine.compute_profile(user_id, &sessions, Utc::now());

        let mut cache = self.cache.write().await;
        let ttl = self.ttl;
        cache.retain(|_, (stored_at, _)| stored_at.elapsed() < ttl);
        cache.insert(user_id.to_string(), (Instant::now(), profile.clone()));
        Ok(profile)
    }

    pub async fn invalidate(&self, user_id: &str) {
        if self.cache.write().await.remove(user_id).is_some() {
            log::debug!("Invalidated cached profile for user {}", user_id);
        }
    }

    pub async fn recommendation_summary(&self, user_id: &str) -> AppResult<RecommendationSummary> {
        let profile = self.get_profile(user_id).await?;
        Ok(formatters::recommendation_summary(&profile))
    }

    /// Up to `limit` questions close to the user's recommended level, skipping
    /// anything in `exclude_ids`.
    pub async fn recommend_questions(
        &self,
        user_id: &str,
        exclude_ids: &HashSet<String>,
        limit: usize,
    ) -> AppResult<Vec<Question>> {
        if limit == 0 {
            return Ok(vec![]);
        }

        let profile = self.get_profile(user_id).await?;
        let level = profile.recommended_difficulty;
        self.select_around(&profile, level, exclude_ids, limit).await
    }

    /// Like [`Self::recommend_questions`] but centred on `level`. The
    /// difficulty band widens until enough candidates are found or the whole
    /// range has been searched.
    pub async fn recommend_questions_around(
        &self,
        user_id: &str,
        level: DifficultyLevel,
        exclude_ids: &HashSet<String>,
        limit: usize,
    ) -> AppResult<Vec<Question>> {
        if limit == 0 {
            return Ok(vec![]);
        }

        let profile = self.get_profile(user_id).await?;
        self.select_around(&profile, level, exclude_ids, limit).await
    }

    async fn select_around(
        &self,
        profile: &AdaptiveProfile,
        level: DifficultyLevel,
        exclude_ids: &HashSet<String>,
        limit: usize,
    ) -> AppResult<Vec<Question>> {
        let mut spread = 1;
        let candidates = loop {
            let criteria = QuestionCriteria {
                exclude_ids: exclude_ids.iter().cloned().collect(),
                ..QuestionCriteria::around(level, spread)
            };
            let found = self.question_repository.find_by_criteria(&criteria).await?;

            if found.len() >= limit || spread >= MAX_SPREAD {
                break found;
            }
            spread += 2;
        };

        let selected = self
            .engine
            .select_around(profile, level, candidates, exclude_ids, limit);

        log::info!(
            "Recommended {} question(s) for user {} around difficulty {}",
            selected.len(),
            profile.user_id,
            level
        );
        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::adaptive_profile::RecommendationStrategy;
    use crate::repositories::question_repository::MockQuestionRepository;
    use crate::repositories::session_repository::MockSessionRepository;
    use crate::repositories::{InMemoryQuestionRepository, InMemorySessionRepository};
    use crate::test_utils::fixtures;

    fn config_with_ttl(ttl: u64) -> Config {
        Config {
            profile_cache_ttl_secs: ttl,
            ..Config::test_config()
        }
    }

    #[tokio::test]
    async fn test_profile_is_cached_until_invalidated() {
        let mut sessions = MockSessionRepository::new();
        sessions
            .expect_find_completed_by_user()
            .times(2)
            .returning(|user_id| Ok(fixtures::history(user_id, 4, &[70.0, 75.0])));

        let service = RecommendationService::new(
            Arc::new(MockQuestionRepository::new()),
            Arc::new(sessions),
            &config_with_ttl(300),
        );

        let first = service.get_profile("user-1").await.unwrap();
        let second = service.get_profile("user-1").await.unwrap();
        assert_eq!(first, second);

        service.invalidate("user-1").await;
        let third = service.get_profile("user-1").await.unwrap();
        assert_eq!(third.sessions_analyzed, 2);
    }

    #[tokio::test]
    async fn test_expired_profile_is_recomputed() {
        let mut sessions = MockSessionRepository::new();
        sessions
            .expect_find_completed_by_user()
            .times(2)
            .returning(|_| Ok(vec![]));

        let service = RecommendationService::new(
            Arc::new(MockQuestionRepository::new()),
            Arc::new(sessions),
            &config_with_ttl(0),
        );

        service.get_profile("user-1").await.unwrap();
        service.get_profile("user-1").await.unwrap();
    }

    #[tokio::test]
    async fn test_repository_errors_propagate() {
        let mut sessions = MockSessionRepository::new();
        sessions
            .expect_find_completed_by_user()
            .returning(|_| Err(crate::errors::AppError::InternalError("down".to_string())));

        let service = RecommendationService::new(
            Arc::new(MockQuestionRepository::new()),
            Arc::new(sessions),
            &config_with_ttl(300),
        );

        assert!(service.get_profile("user-1").await.is_err());
    }

    #[tokio::test]
    async fn test_recommendation_summary_for_new_user() {
        let service = RecommendationService::new(
            Arc::new(InMemoryQuestionRepository::new()),
            Arc::new(InMemorySessionRepository::new()),
            &Config::test_config(),
        );

        let summary = service.recommendation_summary("user-1").await.unwrap();
        assert_eq!(summary.recommended_difficulty, 5);
        assert_eq!(summary.strategy, RecommendationStrategy::Baseline);
        assert_eq!(summary.confidence_level, "very low");
    }

    #[tokio::test]
    async fn test_recommend_questions_widens_band_and_excludes() {
        let questions = InMemoryQuestionRepository::with_questions(vec![
            fixtures::question_with("near", 5, "a"),
            fixtures::question_with("answered", 5, "a"),
            fixtures::question_with("mid", 7, "a"),
            fixtures::question_with("far", 10, "a"),
        ])
        .await;
        let service = RecommendationService::new(
            Arc::new(questions),
            Arc::new(InMemorySessionRepository::new()),
            &Config::test_config(),
        );
        let exclude: HashSet<String> = ["answered".to_string()].into_iter().collect();

        let picked = service
            .recommend_questions("user-1", &exclude, 3)
            .await
            .unwrap();
        let ids: Vec<&str> = picked.iter().map(|q| q.id.as_str()).collect();

        assert_eq!(ids, vec!["near", "mid", "far"]);
    }

    #[tokio::test]
    async fn test_expired_entries_are_evicted_on_write() {
        let service = RecommendationService::new(
            Arc::new(InMemoryQuestionRepository::new()),
            Arc::new(InMemorySessionRepository::new()),
            &config_with_ttl(0),
        );

        service.get_profile("user-1").await.unwrap();
        service.get_profile("user-2").await.unwrap();
        service.get_profile("user-3").await.unwrap();

        let cache = service.cache.read().await;
        assert_eq!(cache.len(), 1);
        assert!(cache.contains_key("user-3"));
    }

    #[tokio::test]
    async fn test_recommend_questions_around_explicit_level() {
        let questions = InMemoryQuestionRepository::with_questions(vec![
            fixtures::question_with("easy", 2, "a"),
            fixtures::question_with("mid", 5, "a"),
        ])
        .await;
        let service = RecommendationService::new(
            Arc::new(questions),
            Arc::new(InMemorySessionRepository::new()),
            &Config::test_config(),
        );

        let picked = service
            .recommend_questions_around(
                "user-1",
                DifficultyLevel::clamped(2),
                &HashSet::new(),
                1,
            )
            .await
            .unwrap();
        let ids: Vec<&str> = picked.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["easy"]);

        let recommended = service
            .recommend_questions("user-1", &HashSet::new(), 1)
            .await
            .unwrap();
        assert_eq!(recommended[0].id, "mid");
    }

    #[tokio::test]
    async fn test_recommend_questions_zero_limit() {
        let service = RecommendationService::new(
            Arc::new(MockQuestionRepository::new()),
            Arc::new(MockSessionRepository::new()),
            &Config::test_config(),
        );

        let picked = service
            .recommend_questions("user-1", &HashSet::new(), 0)
            .await
            .unwrap();
        assert!(picked.is_empty());
    }
}
