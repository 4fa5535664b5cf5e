//! Read-model formatters. Pure functions: they only borrow their inputs and
//! the same input always yields the same output.

use chrono::{DateTime, Utc};

use crate::models::domain::adaptive_profile::RecommendationStrategy;
use crate::models::domain::score::round2;
use crate::models::domain::{AdaptiveProfile, QuizSession, Score};
use crate::models::dto::read_model::{
    ProgressSummary, RecommendationSummary, ScoreView, SessionSummary,
};
use crate::services::session_aggregator::SessionAggregator;

pub fn score_view(score: &Score) -> ScoreView {
    ScoreView {
        points: score.points(),
        max_points: score.max_points(),
        percentage: round2(score.percentage()),
        status: score.status(),
        requires_manual_grading: score.is_pending_manual_grading(),
        breakdown: score.breakdown().clone(),
        metadata: score.metadata().clone(),
    }
}

pub fn session_summary(session: &QuizSession, now: DateTime<Utc>) -> SessionSummary {
    let score = SessionAggregator::session_score(session);
    let progress = SessionAggregator::progress(session);
    // A finished session stops its clock at completion.
    let clock = session.completed_at.unwrap_or(now);

    SessionSummary {
        session_id: session.id.clone(),
        user_id: session.user_id.clone(),
        status: session.status(),
        total_questions: session.total_questions(),
        answered_questions: session.answered_count(),
        current_question_index: session.current_question_index(),
        current_question_id: session.current_question_id().map(str::to_string),
        progress: round2(progress),
        progress_percentage: round2(progress * 100.0),
        accuracy: SessionAggregator::accuracy(session),
        points_earned: score.points(),
        max_points: score.max_points(),
        score_percentage: round2(score.percentage()),
        pending_manual_grading: SessionAggregator::pending_manual_grading_count(session),
        average_time_spent_secs: SessionAggregator::average_time_spent(session),
        target_difficulty: session.target_difficulty.value(),
        adaptive: session.adaptive,
        practice_mode: session.practice_mode,
        started_at: session.started_at,
        completed_at: session.completed_at,
        time_limit_secs: session.time_limit_secs,
        remaining_secs: session.remaining_secs(clock),
        is_timed_out: session.is_timed_out(clock),
        elapsed_secs: session.elapsed_secs(now),
    }
}

pub fn progress_summary(session: &QuizSession) -> ProgressSummary {
    ProgressSummary {
        session_id: session.id.clone(),
        answered_questions: session.answered_count(),
        total_questions: session.total_questions(),
        progress: round2(SessionAggregator::progress(session)),
        accuracy: SessionAggregator::accuracy(session),
        streak: SessionAggregator::streak(session),
        category_progress: SessionAggregator::category_progress(session),
        difficulty_progress: SessionAggregator::difficulty_progress(session),
        weakest_category: SessionAggregator::weakest_category(session),
        strongest_category: SessionAggregator::strongest_category(session),
        trend: SessionAggregator::performance_trend(session),
    }
}

pub fn recommendation_summary(profile: &AdaptiveProfile) -> RecommendationSummary {
    RecommendationSummary {
        user_id: profile.user_id.clone(),
        recommended_difficulty: profile.recommended_difficulty.value(),
        strategy: profile.strategy,
        strategy_description: strategy_description(profile),
        confidence: round2(profile.confidence),
        confidence_level: confidence_level(profile.confidence).to_string(),
        learning_velocity: round2(profile.learning_velocity),
        knowledge_gaps: profile.knowledge_gaps.iter().map(|d| d.value()).collect(),
        strong_areas: profile.strong_areas.iter().map(|d| d.value()).collect(),
        recent_performance: profile.recent_performance.clone(),
        sessions_analyzed: profile.sessions_analyzed,
    }
}

pub fn confidence_level(confidence: f64) -> &'static str {
    if confidence >= 0.9 {
        "very high"
    } else if confidence >= 0.8 {
        "high"
    } else if confidence >= 0.6 {
        "medium"
    } else if confidence >= 0.4 {
        "low"
    } else {
        "very low"
    }
}

fn strategy_description(profile: &AdaptiveProfile) -> String {
    let level = profile.recommended_difficulty;
    match profile.strategy {
        RecommendationStrategy::Advance => format!(
            "Recent scores are consistently high; move up to difficulty {}",
            level
        ),
        RecommendationStrategy::Reinforce => format!(
            "Recent scores are below target; step down to difficulty {} to reinforce fundamentals",
            level
        ),
        RecommendationStrategy::Maintain => format!(
            "Performance is steady; keep practising around difficulty {}",
            level
        ),
        RecommendationStrategy::Baseline => format!(
            "No completed sessions yet; start at difficulty {}",
            level
        ),
    }
}
