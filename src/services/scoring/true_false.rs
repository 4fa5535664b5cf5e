use crate::models::domain::{AnswerToken, Question, QuestionType, Score};
use crate::services::scoring::{token_matches, ScoringStrategy};

pub struct TrueFalseStrategy;

impl ScoringStrategy for TrueFalseStrategy {
    fn name(&self) -> &'static str {
        "true_false"
    }

    fn supports(&self, question: &Question) -> bool {
        question.question_type == QuestionType::TrueFalse
    }

    fn score(&self, question: &Question, submitted: &[AnswerToken]) -> Score {
        let max_points = question.max_points();

        let ([token], Some(correct)) = (submitted, question.correct_answers().next()) else {
            return Score::zero(max_points);
        };

        if token_matches(token, correct) {
            Score::full(max_points)
        } else {
            Score::zero(max_points)
        }
    }
}
