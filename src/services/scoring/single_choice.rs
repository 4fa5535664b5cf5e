use crate::models::domain::{AnswerToken, Question, QuestionType, Score};
use crate::services::scoring::{matches_any_correct, ScoringStrategy};

/// All-or-nothing scoring for exactly one selected answer.
pub struct SingleChoiceStrategy;

impl ScoringStrategy for SingleChoiceStrategy {
    fn name(&self) -> &'static str {
        "single_choice"
    }

    fn supports(&self, question: &Question) -> bool {
        question.question_type == QuestionType::SingleChoice
    }

    fn score(&self, question: &Question, submitted: &[AnswerToken]) -> Score {
        let max_points = question.max_points();

        // Wrong arity is a zero, not an error.
        let [token] = submitted else {
            return Score::zero(max_points);
        };

        if matches_any_correct(question, token) {
            Score::full(max_points)
        } else {
            Score::zero(max_points)
        }
    }
}
