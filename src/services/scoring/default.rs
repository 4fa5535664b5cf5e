use crate::models::domain::{AnswerToken, Question, Score};
use crate::services::scoring::ScoringStrategy;

/// Fallback used when no specialised strategy claims a question.
pub struct DefaultStrategy;

impl ScoringStrategy for DefaultStrategy {
    fn name(&self) -> &'static str {
        "default"
    }

    fn supports(&self, _question: &Question) -> bool {
        true
    }

    fn score(&self, question: &Question, submitted: &[AnswerToken]) -> Score {
        let hit = submitted.iter().any(|token| {
            let token = token.to_token_string();
            question.correct_answers().any(|answer| answer.id == token)
        });

        if hit {
            Score::full(question.max_points())
        } else {
            Score::zero(question.max_points())
        }
    }
}
