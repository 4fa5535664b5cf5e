use std::collections::HashSet;

use crate::models::domain::{AnswerToken, Question, QuestionType, Score};
use crate::services::scoring::{matches_any_correct, ScoringStrategy};

pub const BREAKDOWN_CORRECT_ANSWERS: &str = "correct_answers";
pub const BREAKDOWN_INCORRECT_ANSWERS: &str = "incorrect_answers";
pub const BREAKDOWN_PENALTY_POINTS: &str = "penalty_points";

/// Partial credit for the share of correct answers picked, minus a fixed
/// penalty per incorrect pick.
pub struct MultipleChoiceStrategy {
    incorrect_penalty: f64,
}

impl MultipleChoiceStrategy {
    pub fn new(incorrect_penalty: f64) -> Self {
        Self {
            incorrect_penalty: incorrect_penalty.clamp(0.0, 1.0),
        }
    }
}

impl Default for MultipleChoiceStrategy {
    fn default() -> Self {
        Self::new(0.10)
    }
}

impl ScoringStrategy for MultipleChoiceStrategy {
    fn name(&self) -> &'static str {
        "multiple_choice"
    }

    fn supports(&self, question: &Question) -> bool {
        question.question_type == QuestionType::MultipleChoice
    }

    fn score(&self, question: &Question, submitted: &[AnswerToken]) -> Score {
        let max_points = question.max_points();
        let total_correct = question.correct_answers().count();
        if total_correct == 0 {
            return Score::zero(max_points);
        }

        // a repeated pick counts once
        let mut seen = HashSet::new();
        let distinct: Vec<&AnswerToken> = submitted
            .iter()
            .filter(|token| seen.insert(token.to_token_string()))
            .collect();

        let correct_selected = distinct
            .iter()
            .filter(|token| matches_any_correct(question, token))
            .count();
        let incorrect_selected = distinct.len() - correct_selected;

        let correct_fraction = correct_selected as f64 / total_correct as f64;
        let penalty = incorrect_selected as f64 * self.incorrect_penalty;
        let final_fraction = (correct_fraction - penalty).max(0.0);

        Score::from_fraction(final_fraction, max_points)
            .with_breakdown(BREAKDOWN_CORRECT_ANSWERS, correct_selected as f64)
            .with_breakdown(BREAKDOWN_INCORRECT_ANSWERS, incorrect_selected as f64)
            .with_breakdown(BREAKDOWN_PENALTY_POINTS, penalty * max_points)
    }
}
