//! Moving-window difficulty recommendation.
//!
//! Every number in an [`AdaptiveProfile`] traces back to a plain average
//! over a window of session scores.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::models::domain::adaptive_profile::RecommendationStrategy;
use crate::models::domain::score::round2;
use crate::models::domain::{AdaptiveProfile, DifficultyLevel, Question, QuizSession};
use crate::services::session_aggregator::SessionAggregator;

#[derive(Clone, Debug)]
pub struct RecommendationEngine {
    config: Config,
}

impl RecommendationEngine {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn compute_profile(
        &self,
        user_id: &str,
        sessions: &[QuizSession],
        now: DateTime<Utc>,
    ) -> AdaptiveProfile {
        let history = scored_history(user_id, sessions);

        let mut difficulty_profile: BTreeMap<u8, Vec<f64>> = BTreeMap::new();
        for (level, score) in &history {
            difficulty_profile
                .entry(level.value())
                .or_default()
                .push(*score);
        }

        let scores: Vec<f64> = history.iter().map(|(_, score)| *score).collect();
        let recent_performance = tail(&scores, self.config.recent_performance_len).to_vec();

        let mut knowledge_gaps = Vec::new();
        let mut strong_areas = Vec::new();
        for (level, level_scores) in &difficulty_profile {
            let level_mean = mean(level_scores);
            if level_mean < self.config.gap_threshold {
                knowledge_gaps.push(DifficultyLevel::clamped(*level as i64));
            } else if level_mean > self.config.strong_threshold {
                strong_areas.push(DifficultyLevel::clamped(*level as i64));
            }
        }

        let (recommended_difficulty, strategy) =
            self.recommend_difficulty(&scores, &difficulty_profile);

        log::debug!(
            "Computed adaptive profile for user {}: {} sessions, recommended difficulty {} ({:?})",
            user_id,
            history.len(),
            recommended_difficulty,
            strategy
        );

        AdaptiveProfile {
            user_id: user_id.to_string(),
            learning_velocity: self.learning_velocity(&scores),
            confidence: self.confidence(&scores),
            difficulty_profile,
            knowledge_gaps,
            strong_areas,
            recommended_difficulty,
            strategy,
            recent_performance,
            sessions_analyzed: history.len(),
            computed_at: now,
        }
    }

    /// Mean of the recent window minus mean of the early window of the last
    /// `recent_performance_len` scores. Zero with fewer than two scores.
    pub fn learning_velocity(&self, scores: &[f64]) -> f64 {
        if scores.len() < 2 {
            return 0.0;
        }

        let (early, recent) = self.windows(scores);
        mean(recent) - mean(early)
    }

    /// Early window: the first `velocity_window` scores of the trailing
    /// window. Recent window: its last `velocity_window` scores. The two
    /// overlap when fewer than twice the window size is available.
    fn windows<'a>(&self, scores: &'a [f64]) -> (&'a [f64], &'a [f64]) {
        let window = tail(scores, self.config.recent_performance_len);
        let size = self.config.velocity_window.min(window.len());
        (&window[..size], &window[window.len() - size..])
    }

    fn recommend_difficulty(
        &self,
        scores: &[f64],
        difficulty_profile: &BTreeMap<u8, Vec<f64>>,
    ) -> (DifficultyLevel, RecommendationStrategy) {
        let (min_level, max_level) = (
            self.config.min_difficulty.max(DifficultyLevel::MIN) as i64,
            self.config.max_difficulty.min(DifficultyLevel::MAX) as i64,
        );
        let clamp = |level: i64| DifficultyLevel::clamped(level.clamp(min_level, max_level));

        let (Some(lowest), Some(highest)) = (
            difficulty_profile.keys().next(),
            difficulty_profile.keys().next_back(),
        ) else {
            return (
                clamp(self.config.default_difficulty as i64),
                RecommendationStrategy::Baseline,
            );
        };

        let (_, recent) = self.windows(scores);
        let recent_mean = mean(recent);

        if recent_mean > self.config.strong_threshold {
            (clamp(*highest as i64 + 1), RecommendationStrategy::Advance)
        } else if recent_mean < self.config.gap_threshold {
            (clamp(*lowest as i64 - 1), RecommendationStrategy::Reinforce)
        } else {
            let levels: Vec<f64> = difficulty_profile.keys().map(|l| *l as f64).collect();
            (
                clamp(mean(&levels).round() as i64),
                RecommendationStrategy::Maintain,
            )
        }
    }

    /// Share of the trailing window that is filled, scaled down by how much
    /// the recent scores spread.
    pub fn confidence(&self, scores: &[f64]) -> f64 {
        if scores.is_empty() {
            return 0.0;
        }

        let window_len = self.config.recent_performance_len.max(1);
        let coverage = scores.len().min(window_len) as f64 / window_len as f64;

        let (_, recent) = self.windows(scores);
        let stability = 1.0 - std_dev(recent).min(50.0) / 50.0;

        round2((coverage * stability).clamp(0.0, 1.0))
    }

    /// Ranks usable candidates by distance from the recommended difficulty,
    /// knowledge-gap levels first on equal distance, otherwise in input order.
    pub fn select_next_questions(
        &self,
        profile: &AdaptiveProfile,
        candidates: Vec<Question>,
        exclude_ids: &HashSet<String>,
        limit: usize,
    ) -> Vec<Question> {
        self.select_around(
            profile,
            profile.recommended_difficulty,
            candidates,
            exclude_ids,
            limit,
        )
    }

    /// Same ranking as [`Self::select_next_questions`], centred on `target`
    /// instead of the profile's recommendation.
    pub fn select_around(
        &self,
        profile: &AdaptiveProfile,
        target: DifficultyLevel,
        candidates: Vec<Question>,
        exclude_ids: &HashSet<String>,
        limit: usize,
    ) -> Vec<Question> {
        let target = target.value() as i16;

        let mut ranked: Vec<Question> = candidates
            .into_iter()
            .filter(|q| !exclude_ids.contains(&q.id) && q.is_usable())
            .collect();

        // sort_by_key is stable, so input order breaks remaining ties
        ranked.sort_by_key(|q| {
            let distance = (q.difficulty.value() as i16 - target).abs();
            (distance, !profile.is_gap(q.difficulty))
        });

        let mut seen = HashSet::new();
        ranked.retain(|q| seen.insert(q.id.clone()));
        ranked.truncate(limit);
        ranked
    }
}

/// (difficulty, percentage) per completed, non-practice session, oldest first.
fn scored_history(user_id: &str, sessions: &[QuizSession]) -> Vec<(DifficultyLevel, f64)> {
    let mut completed: Vec<&QuizSession> = sessions
        .iter()
        .filter(|s| s.user_id == user_id && s.is_completed() && !s.practice_mode)
        .collect();
    completed.sort_by_key(|s| s.completed_at);

    completed
        .into_iter()
        .filter_map(|session| {
            let score = SessionAggregator::session_score(session);
            (score.max_points() > 0.0)
                .then(|| (session.target_difficulty, round2(score.percentage())))
        })
        .collect()
}

fn tail(scores: &[f64], len: usize) -> &[f64] {
    &scores[scores.len().saturating_sub(len)..]
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
