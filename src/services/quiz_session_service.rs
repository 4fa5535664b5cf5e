use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use chrono::Utc;
use tokio::sync::Mutex;
use validator::Validate;

use crate::{
    config::Config,
    errors::{AppError, AppResult},
    models::{
        domain::{DifficultyLevel, Question, QuestionAnswer, QuizSession, SessionEvent},
        dto::{
            read_model::{ProgressSummary, SessionSummary},
            request::{StartSessionRequest, SubmitAnswerRequest},
        },
    },
    repositories::{QuestionRepository, SessionRepository},
    services::{
        formatters,
        notifier::NotificationSink,
        recommendation_service::RecommendationService,
        scoring::ScoringService,
        session_aggregator::{SessionAggregator, SessionOutcome},
    },
};

const DEFAULT_QUESTION_COUNT: usize = 10;

pub struct QuizSessionService {
    question_repository: Arc<dyn QuestionRepository>,
    session_repository: Arc<dyn SessionRepository>,
    notifier: Arc<dyn NotificationSink>,
    recommendations: Arc<RecommendationService>,
    scoring: ScoringService,
    config: Arc<Config>,
    session_locks: LockMap,
    user_locks: LockMap,
}

impl QuizSessionService {
    pub fn new(
        question_repository: Arc<dyn QuestionRepository>,
        session_repository: Arc<dyn SessionRepository>,
        notifier: Arc<dyn NotificationSink>,
        recommendations: Arc<RecommendationService>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            scoring: ScoringService::new(&config),
            question_repository,
            session_repository,
            notifier,
            recommendations,
            config,
            session_locks: Mutex::new(HashMap::new()),
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Starts are serialised per user so that at most one session is active.
    pub async fn start_session(&self, request: StartSessionRequest) -> AppResult<QuizSession> {
        request.validate()?;

        let lock = lock_for(&self.user_locks, &request.user_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.start_session_locked(&request).await
        };
        release(&self.user_locks, &request.user_id, lock).await;
        result
    }

    async fn start_session_locked(&self, request: &StartSessionRequest) -> AppResult<QuizSession> {
        if let Some(active) = self
            .session_repository
            .find_active_by_user(&request.user_id)
            .await?
        {
            return Err(AppError::InvalidState(format!(
                "User '{}' already has an active session '{}'",
                request.user_id, active.id
            )));
        }

        let target_difficulty = match request.target_difficulty {
            Some(level) => DifficultyLevel::new(level)?,
            None if request.adaptive => {
                self.recommendations
                    .get_profile(&request.user_id)
                    .await?
                    .recommended_difficulty
            }
            None => DifficultyLevel::new(self.config.default_difficulty)?,
        };

        let questions = if request.question_ids.is_empty() {
            let count = request.question_count.unwrap_or(DEFAULT_QUESTION_COUNT);
            self.recommendations
                .recommend_questions_around(
                    &request.user_id,
                    target_difficulty,
                    &HashSet::new(),
                    count,
                )
                .await?
        } else {
            self.load_questions(&request.question_ids).await?
        };

        if questions.is_empty() {
            return Err(AppError::NotFound(
                "No questions are available for a new session".to_string(),
            ));
        }

        let session = QuizSession::new(
            &request.user_id,
            questions.into_iter().map(|q| q.id).collect(),
            target_difficulty,
            request.adaptive,
            request.practice_mode,
            request.time_limit_secs,
        );
        let session = self.session_repository.save(session).await?;

        log::info!(
            "Started session {} for user {} with {} question(s) at difficulty {}",
            session.id,
            session.user_id,
            session.total_questions(),
            session.target_difficulty
        );

        let now = Utc::now();
        self.publish(SessionEvent::SessionStarted {
            user_id: session.user_id.clone(),
            summary: formatters::session_summary(&session, now),
            occurred_at: now,
        })
        .await;

        Ok(session)
    }

    /// Explicit question set: every id must exist, be unique and be gradeable.
    async fn load_questions(&self, ids: &[String]) -> AppResult<Vec<Question>> {
        let mut seen = HashSet::new();
        if let Some(duplicate) = ids.iter().find(|id| !seen.insert(id.as_str())) {
            return Err(AppError::ValidationError(format!(
                "Question '{}' is listed more than once",
                duplicate
            )));
        }

        let questions = self.question_repository.find_by_ids(ids).await?;
        if questions.len() != ids.len() {
            let found: HashSet<&str> = questions.iter().map(|q| q.id.as_str()).collect();
            let missing: Vec<&str> = ids
                .iter()
                .map(String::as_str)
                .filter(|id| !found.contains(id))
                .collect();
            return Err(AppError::NotFound(format!(
                "Questions not found: {}",
                missing.join(", ")
            )));
        }

        for question in &questions {
            question.ensure_usable()?;
        }
        Ok(questions)
    }

    pub async fn submit_answer(&self, request: SubmitAnswerRequest) -> AppResult<QuestionAnswer> {
        request.validate()?;

        let session_id = request.session_id.clone();
        let lock = lock_for(&self.session_locks, &session_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.submit_answer_locked(request).await
        };
        release(&self.session_locks, &session_id, lock).await;
        result
    }

    async fn submit_answer_locked(&self, request: SubmitAnswerRequest) -> AppResult<QuestionAnswer> {
        let session = self.load_session(&request.session_id).await?;
        let now = Utc::now();
        SessionAggregator::ensure_accepts_answer(&session, &request.question_id, now)?;

        let question = self
            .question_repository
            .find_by_id(&request.question_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Question '{}' not found", request.question_id))
            })?;

        let score = self.scoring.score(&question, &request.answers);
        let mut answer = QuestionAnswer::new(
            &question,
            request.answers,
            request.time_spent_secs,
            self.config.max_time_spent_secs,
            score,
        )?;
        if let Some(hints) = request.hints_used {
            answer = answer.with_hints_used(hints);
        }

        let SessionOutcome { session, events } =
            SessionAggregator::record_answer(session, answer.clone(), now)?;
        self.session_repository.save(session).await?;

        log::debug!(
            "Recorded answer to question {} in session {} ({} / {} points)",
            answer.question_id,
            request.session_id,
            answer.score.points(),
            answer.score.max_points()
        );

        for event in events {
            self.publish(event).await;
        }
        Ok(answer)
    }

    /// Finalises the session. Adaptive, graded sessions also refresh the
    /// user's profile and attach the new recommendation to the event.
    pub async fn complete_session(&self, session_id: &str) -> AppResult<SessionSummary> {
        let lock = lock_for(&self.session_locks, session_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.complete_session_locked(session_id).await
        };
        release(&self.session_locks, session_id, lock).await;
        result
    }

    async fn complete_session_locked(&self, session_id: &str) -> AppResult<SessionSummary> {
        let session = self.load_session(session_id).await?;
        let now = Utc::now();
        let SessionOutcome { session, events } =
            SessionAggregator::complete_session(session, now)?;
        let session = self.session_repository.save(session).await?;

        self.recommendations.invalidate(&session.user_id).await;
        let recommendation = if session.adaptive && !session.practice_mode {
            match self
                .recommendations
                .recommendation_summary(&session.user_id)
                .await
            {
                Ok(summary) => Some(summary),
                Err(e) => {
                    log::warn!(
                        "Could not refresh recommendation for user {}: {}",
                        session.user_id,
                        e
                    );
                    None
                }
            }
        } else {
            None
        };

        log::info!(
            "Completed session {} for user {}: {}/{} answered",
            session.id,
            session.user_id,
            session.answered_count(),
            session.total_questions()
        );

        for event in events {
            let event = match &recommendation {
                Some(summary) => event.with_recommendation(summary.clone()),
                None => event,
            };
            self.publish(event).await;
        }

        Ok(formatters::session_summary(&session, now))
    }

    pub async fn session_summary(&self, session_id: &str) -> AppResult<SessionSummary> {
        let session = self.load_session(session_id).await?;
        Ok(formatters::session_summary(&session, Utc::now()))
    }

    pub async fn progress_summary(&self, session_id: &str) -> AppResult<ProgressSummary> {
        let session = self.load_session(session_id).await?;
        Ok(formatters::progress_summary(&session))
    }

    async fn load_session(&self, session_id: &str) -> AppResult<QuizSession> {
        self.session_repository
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Session '{}' not found", session_id)))
    }

    async fn publish(&self, event: SessionEvent) {
        let event_type = event.event_type();
        if let Err(e) = self.notifier.publish(event).await {
            log::warn!("Failed to publish {} event: {}", event_type, e);
        }
    }
}

type LockMap = Mutex<HashMap<String, Arc<Mutex<()>>>>;

async fn lock_for(locks: &LockMap, key: &str) -> Arc<Mutex<()>> {
    let mut locks = locks.lock().await;
    locks
        .entry(key.to_string())
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone()
}

/// Drops the map entry once no other caller holds or waits on the lock.
async fn release(locks: &LockMap, key: &str, lock: Arc<Mutex<()>>) {
    let mut locks = locks.lock().await;
    // one reference in the map, one held here
    if Arc::strong_count(&lock) <= 2 {
        locks.remove(key);
    }
}
