//! Session-level bookkeeping and statistics.
//!
//! Answers awaiting manual grading count towards progress but are left out
//! of accuracy, streaks, group breakdowns and the trend until graded.

use chrono::{DateTime, Utc};

use crate::errors::{AppError, AppResult};
use crate::models::domain::score::round2;
use crate::models::domain::{QuestionAnswer, QuizSession, Score, SessionEvent};
use crate::models::dto::read_model::{GroupProgress, PerformanceTrend, StreakData};
use crate::services::formatters;

pub const UNCATEGORIZED: &str = "uncategorized";
const TREND_WINDOW: usize = 3;

/// Updated session plus the events the change produced.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub session: QuizSession,
    pub events: Vec<SessionEvent>,
}

pub struct SessionAggregator;

impl SessionAggregator {
    /// Appends an answer, rejecting anything that would break the session's invariants.
    pub fn record_answer(
        mut session: QuizSession,
        answer: QuestionAnswer,
        now: DateTime<Utc>,
    ) -> AppResult<SessionOutcome> {
        Self::ensure_accepts_answer(&session, &answer.question_id, now)?;

        let question_id = answer.question_id.clone();
        let score = formatters::score_view(&answer.score);
        session.question_answers.push(answer);

        let event = SessionEvent::QuestionAnswered {
            user_id: session.user_id.clone(),
            session_id: session.id.clone(),
            question_id,
            score,
            progress: formatters::progress_summary(&session),
            occurred_at: now,
        };

        Ok(SessionOutcome {
            session,
            events: vec![event],
        })
    }

    /// The checks `record_answer` applies, usable before any scoring work is done.
    pub fn ensure_accepts_answer(
        session: &QuizSession,
        question_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        if session.is_completed() {
            return Err(AppError::InvalidState(format!(
                "Session '{}' is already completed",
                session.id
            )));
        }

        if !session.contains_question(question_id) {
            return Err(AppError::NotFound(format!(
                "Question '{}' is not part of session '{}'",
                question_id, session.id
            )));
        }

        if session.has_answered(question_id) {
            return Err(AppError::InvalidState(format!(
                "Question '{}' was already answered in session '{}'",
                question_id, session.id
            )));
        }

        if !session.practice_mode && session.is_timed_out(now) {
            return Err(AppError::InvalidState(format!(
                "Session '{}' exceeded its time limit",
                session.id
            )));
        }

        Ok(())
    }

    pub fn complete_session(
        mut session: QuizSession,
        now: DateTime<Utc>,
    ) -> AppResult<SessionOutcome> {
        if session.is_completed() {
            return Err(AppError::InvalidState(format!(
                "Session '{}' is already completed",
                session.id
            )));
        }

        session.completed_at = Some(now);

        let event = SessionEvent::SessionCompleted {
            user_id: session.user_id.clone(),
            summary: formatters::session_summary(&session, now),
            recommendation: None,
            occurred_at: now,
        };

        Ok(SessionOutcome {
            session,
            events: vec![event],
        })
    }

    pub fn progress(session: &QuizSession) -> f64 {
        let total = session.total_questions();
        if total == 0 {
            return 0.0;
        }
        session.answered_count() as f64 / total as f64
    }

    /// Percentage of graded answers earning full credit, to two decimals.
    pub fn accuracy(session: &QuizSession) -> f64 {
        accuracy_of(graded(&session.question_answers))
    }

    pub fn streak(session: &QuizSession) -> StreakData {
        let graded: Vec<&QuestionAnswer> = graded(&session.question_answers).collect();

        let current = graded.iter().rev().take_while(|qa| qa.is_correct()).count();

        let mut longest = 0;
        let mut run = 0;
        for qa in &graded {
            if qa.is_correct() {
                run += 1;
                longest = longest.max(run);
            } else {
                run = 0;
            }
        }

        StreakData { current, longest }
    }

    pub fn category_progress(session: &QuizSession) -> Vec<GroupProgress> {
        group_progress(session, |qa| {
            qa.category
                .clone()
                .unwrap_or_else(|| UNCATEGORIZED.to_string())
        })
    }

    pub fn difficulty_progress(session: &QuizSession) -> Vec<GroupProgress> {
        group_progress(session, |qa| qa.difficulty.to_string())
    }

    pub fn weakest_category(session: &QuizSession) -> Option<String> {
        let groups = Self::category_progress(session);
        let mut weakest: Option<&GroupProgress> = None;
        for group in &groups {
            // strict comparison keeps the first group on ties
            if weakest.map_or(true, |w| group.accuracy < w.accuracy) {
                weakest = Some(group);
            }
        }
        weakest.map(|g| g.key.clone())
    }

    pub fn strongest_category(session: &QuizSession) -> Option<String> {
        let groups = Self::category_progress(session);
        let mut strongest: Option<&GroupProgress> = None;
        for group in &groups {
            if strongest.map_or(true, |s| group.accuracy > s.accuracy) {
                strongest = Some(group);
            }
        }
        strongest.map(|g| g.key.clone())
    }

    pub fn performance_trend(session: &QuizSession) -> PerformanceTrend {
        let scores: Vec<f64> = graded(&session.question_answers)
            .map(|qa| qa.score.percentage())
            .collect();
        trend_of(&scores)
    }

    /// Aggregate of all graded answers in the session.
    pub fn session_score(session: &QuizSession) -> Score {
        let (points, max_points) = graded(&session.question_answers)
            .fold((0.0, 0.0), |(points, max), qa| {
                (points + qa.score.points(), max + qa.score.max_points())
            });

        Score::new(round2(points), round2(max_points))
            .unwrap_or_else(|_| Score::zero(round2(max_points)))
    }

    pub fn average_time_spent(session: &QuizSession) -> f64 {
        let answers = &session.question_answers;
        if answers.is_empty() {
            return 0.0;
        }
        let total: u64 = answers.iter().map(|qa| qa.time_spent_secs as u64).sum();
        round2(total as f64 / answers.len() as f64)
    }

    pub fn pending_manual_grading_count(session: &QuizSession) -> usize {
        session
            .question_answers
            .iter()
            .filter(|qa| qa.is_pending_manual_grading())
            .count()
    }
}

fn graded(answers: &[QuestionAnswer]) -> impl Iterator<Item = &QuestionAnswer> {
    answers.iter().filter(|qa| !qa.is_pending_manual_grading())
}

fn accuracy_of<'a>(answers: impl Iterator<Item = &'a QuestionAnswer>) -> f64 {
    let (answered, correct) = answers.fold((0usize, 0usize), |(answered, correct), qa| {
        (answered + 1, correct + qa.is_correct() as usize)
    });

    if answered == 0 {
        return 0.0;
    }
    round2(correct as f64 / answered as f64 * 100.0)
}

fn group_progress<F>(session: &QuizSession, key_of: F) -> Vec<GroupProgress>
where
    F: Fn(&QuestionAnswer) -> String,
{
    // Vec instead of a map to keep first-encounter order.
    let mut groups: Vec<(String, Vec<&QuestionAnswer>)> = Vec::new();
    for qa in graded(&session.question_answers) {
        let key = key_of(qa);
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(qa),
            None => groups.push((key, vec![qa])),
        }
    }

    groups
        .into_iter()
        .map(|(key, members)| GroupProgress {
            key,
            answered: members.len(),
            correct: members.iter().filter(|qa| qa.is_correct()).count(),
            accuracy: accuracy_of(members.into_iter()),
        })
        .collect()
}

/// Counts rising and falling steps across the last three scores.
pub(crate) fn trend_of(scores: &[f64]) -> PerformanceTrend {
    if scores.len() < TREND_WINDOW {
        return PerformanceTrend::InsufficientData;
    }

    let recent = &scores[scores.len() - TREND_WINDOW..];
    let (rising, falling) = recent
        .windows(2)
        .fold((0, 0), |(rising, falling), pair| {
            let delta = pair[1] - pair[0];
            if delta > 0.0 {
                (rising + 1, falling)
            } else if delta < 0.0 {
                (rising, falling + 1)
            } else {
                (rising, falling)
            }
        });

    match rising.cmp(&falling) {
        std::cmp::Ordering::Greater => PerformanceTrend::Improving,
        std::cmp::Ordering::Less => PerformanceTrend::Declining,
        std::cmp::Ordering::Equal => PerformanceTrend::Stable,
    }
}
