use serde_json::Value;

use crate::models::domain::{AnswerToken, Question, QuestionType, Score};
use crate::services::scoring::ScoringStrategy;

pub const META_WORD_COUNT: &str = "word_count";
pub const META_CHARACTER_COUNT: &str = "character_count";
pub const META_LINE_COUNT: &str = "line_count";

/// Essay and code-completion answers: never auto-scored, only measured for the grader.
pub struct ManualGradingStrategy;

impl ScoringStrategy for ManualGradingStrategy {
    fn name(&self) -> &'static str {
        "manual_grading"
    }

    fn supports(&self, question: &Question) -> bool {
        question.question_type.requires_manual_grading()
    }

    fn score(&self, question: &Question, submitted: &[AnswerToken]) -> Score {
        let text = submitted
            .iter()
            .filter_map(AnswerToken::as_text)
            .collect::<Vec<_>>()
            .join("\n");

        let score = Score::pending_manual_grading(question.max_points())
            .with_metadata(META_WORD_COUNT, Value::from(text.split_whitespace().count()))
            .with_metadata(META_CHARACTER_COUNT, Value::from(text.chars().count()));

        if question.question_type == QuestionType::CodeCompletion {
            score.with_metadata(META_LINE_COUNT, Value::from(text.lines().count()))
        } else {
            score
        }
    }
}
