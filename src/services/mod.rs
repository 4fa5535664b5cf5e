pub mod formatters;
pub mod notifier;
pub mod quiz_session_service;
pub mod recommendation_engine;
pub mod recommendation_service;
pub mod scoring;
pub mod session_aggregator;

pub use notifier::{InMemoryNotificationSink, LogNotificationSink, NotificationSink};
pub use quiz_session_service::QuizSessionService;
pub use recommendation_engine::RecommendationEngine;
pub use recommendation_service::RecommendationService;
pub use scoring::{ScoringService, ScoringStrategy};
pub use session_aggregator::{SessionAggregator, SessionOutcome};
