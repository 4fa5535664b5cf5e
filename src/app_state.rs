use std::sync::Arc;

use crate::{
    config::Config,
    errors::AppResult,
    repositories::{
        InMemoryQuestionRepository, InMemorySessionRepository, QuestionRepository,
        SessionRepository,
    },
    services::{
        notifier::{LogNotificationSink, NotificationSink},
        quiz_session_service::QuizSessionService,
        recommendation_service::RecommendationService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub quiz_session_service: Arc<QuizSessionService>,
    pub recommendation_service: Arc<RecommendationService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        config: Config,
        question_repository: Arc<dyn QuestionRepository>,
        session_repository: Arc<dyn SessionRepository>,
        notifier: Arc<dyn NotificationSink>,
    ) -> AppResult<Self> {
        config.validate()?;
        let config = Arc::new(config);

        let recommendation_service = Arc::new(RecommendationService::new(
            question_repository.clone(),
            session_repository.clone(),
            &config,
        ));
        let quiz_session_service = Arc::new(QuizSessionService::new(
            question_repository,
            session_repository,
            notifier,
            recommendation_service.clone(),
            config.clone(),
        ));

        log::info!(
            "Quiz engine ready (gap < {}, strong > {}, profile cache {}s)",
            config.gap_threshold,
            config.strong_threshold,
            config.profile_cache_ttl_secs
        );

        Ok(Self {
            quiz_session_service,
            recommendation_service,
            config,
        })
    }

    /// Wires the in-memory repositories and the logging sink.
    pub fn in_memory(
        config: Config,
        question_repository: InMemoryQuestionRepository,
    ) -> AppResult<Self> {
        Self::new(
            config,
            Arc::new(question_repository),
            Arc::new(InMemorySessionRepository::new()),
            Arc::new(LogNotificationSink),
        )
    }
}
