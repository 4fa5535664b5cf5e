use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct Question {
    pub id: String,
    pub content: QuestionContent,
    pub question_type: QuestionType,
    pub difficulty: DifficultyLevel,
    pub weight: f64, // max points awarded for a full-credit answer
    pub answers: Vec<Answer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct QuestionContent {
    pub body: String,
    pub format: ContentFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ContentFormat {
    Text,
    Markdown,
    Code,
    Latex,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    SingleChoice,
    MultipleChoice,
    TrueFalse,
    Essay,
    CodeCompletion,
}

impl QuestionType {
    /// Essay and code-completion answers are graded by a person.
    pub fn requires_manual_grading(&self) -> bool {
        matches!(self, QuestionType::Essay | QuestionType::CodeCompletion)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::SingleChoice => "single_choice",
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::TrueFalse => "true_false",
            QuestionType::Essay => "essay",
            QuestionType::CodeCompletion => "code_completion",
        }
    }
}

/// Ordinal difficulty, always within 1..=10.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize, JsonSchema,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct DifficultyLevel(u8);

impl DifficultyLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn new(level: u8) -> AppResult<Self> {
        if (Self::MIN..=Self::MAX).contains(&level) {
            Ok(Self(level))
        } else {
            Err(AppError::ValidationError(format!(
                "Difficulty level must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                level
            )))
        }
    }

    /// Builds a level from any integer, saturating at the bounds.
    pub fn clamped(level: i64) -> Self {
        Self(level.clamp(Self::MIN as i64, Self::MAX as i64) as u8)
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for DifficultyLevel {
    type Error = AppError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DifficultyLevel> for u8 {
    fn from(level: DifficultyLevel) -> Self {
        level.0
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct Answer {
    pub id: String,
    pub content: String,
    pub correct: bool,
    credit_percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    pub position: u16,
}

impl Answer {
    pub fn new(id: &str, content: &str, credit_percentage: f64, position: u16) -> Self {
        let credit_percentage = clamp_credit(credit_percentage);
        Answer {
            id: id.to_string(),
            content: content.to_string(),
            correct: credit_percentage > 0.0,
            credit_percentage,
            feedback: None,
            position,
        }
    }

    pub fn correct(id: &str, content: &str, position: u16) -> Self {
        Self::new(id, content, 100.0, position)
    }

    pub fn incorrect(id: &str, content: &str, position: u16) -> Self {
        Self::new(id, content, 0.0, position)
    }

    pub fn credit_percentage(&self) -> f64 {
        clamp_credit(self.credit_percentage)
    }

    pub fn set_credit_percentage(&mut self, credit: f64) {
        self.credit_percentage = clamp_credit(credit);
        self.correct = self.credit_percentage > 0.0;
    }

    pub fn is_correct(&self) -> bool {
        self.correct || self.credit_percentage() > 0.0
    }

    pub fn is_partial_credit(&self) -> bool {
        let credit = self.credit_percentage();
        credit > 0.0 && credit < 100.0
    }
}

fn clamp_credit(credit: f64) -> f64 {
    if credit.is_nan() {
        0.0
    } else {
        credit.clamp(0.0, 100.0)
    }
}

impl Question {
    pub fn correct_answers(&self) -> impl Iterator<Item = &Answer> {
        self.answers.iter().filter(|a| a.is_correct())
    }

    pub fn max_points(&self) -> f64 {
        self.weight
    }

    /// Checks the invariants a question must hold before it can be served in a session.
    pub fn ensure_usable(&self) -> AppResult<()> {
        if !(self.weight.is_finite() && self.weight > 0.0) {
            return Err(AppError::ValidationError(format!(
                "Question '{}' must have a positive scoring weight",
                self.id
            )));
        }

        if self.question_type == QuestionType::TrueFalse && self.answers.len() != 2 {
            return Err(AppError::ValidationError(format!(
                "True/false question '{}' must have exactly 2 answers, has {}",
                self.id,
                self.answers.len()
            )));
        }

        if !self.question_type.requires_manual_grading() && self.correct_answers().next().is_none()
        {
            return Err(AppError::ValidationError(format!(
                "Question '{}' has no correct answer",
                self.id
            )));
        }

        Ok(())
    }

    pub fn is_usable(&self) -> bool {
        self.ensure_usable().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures;

    #[test]
    fn question_type_round_trip_serialization() {
        let variants = [
            QuestionType::SingleChoice,
            QuestionType::MultipleChoice,
            QuestionType::TrueFalse,
            QuestionType::Essay,
            QuestionType::CodeCompletion,
        ];

        for variant in variants {
            let json = serde_json::to_string(&variant).expect("variant should serialize");
            assert_eq!(json, format!("\"{}\"", variant.as_str()));
            let parsed: QuestionType =
                serde_json::from_str(&json).expect("variant should deserialize");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn question_type_rejects_unknown_variant() {
        let parsed = serde_json::from_str::<QuestionType>("\"matching\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn difficulty_level_rejects_out_of_range() {
        assert!(DifficultyLevel::new(0).is_err());
        assert!(DifficultyLevel::new(11).is_err());
        assert_eq!(DifficultyLevel::new(7).map(|d| d.value()), Ok(7));
        assert!(serde_json::from_str::<DifficultyLevel>("12").is_err());
    }

    #[test]
    fn difficulty_level_clamped_saturates() {
        assert_eq!(DifficultyLevel::clamped(-3).value(), 1);
        assert_eq!(DifficultyLevel::clamped(42).value(), 10);
        assert_eq!(DifficultyLevel::clamped(4).value(), 4);
    }

    #[test]
    fn answer_credit_is_clamped_and_drives_correctness() {
        let over = Answer::new("a1", "over", 150.0, 0);
        assert_eq!(over.credit_percentage(), 100.0);
        assert!(over.is_correct());

        let under = Answer::new("a2", "under", -20.0, 1);
        assert_eq!(under.credit_percentage(), 0.0);
        assert!(!under.is_correct());

        let partial = Answer::new("a3", "partial", 40.0, 2);
        assert!(partial.is_correct());
        assert!(partial.is_partial_credit());
    }

    #[test]
    fn set_credit_percentage_updates_flag() {
        let mut answer = Answer::incorrect("a1", "x", 0);
        answer.set_credit_percentage(25.0);
        assert!(answer.is_correct());
        answer.set_credit_percentage(0.0);
        assert!(!answer.is_correct());
    }

    #[test]
    fn true_false_requires_two_answers() {
        let mut question = fixtures::true_false_question("tf-1", true);
        assert!(question.ensure_usable().is_ok());

        question.answers.pop();
        assert!(matches!(
            question.ensure_usable(),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn objective_question_without_correct_answer_is_unusable() {
        let mut question = fixtures::single_choice_question("q-1", "A1");
        for answer in question.answers.iter_mut() {
            answer.set_credit_percentage(0.0);
        }
        assert!(!question.is_usable());
    }

    #[test]
    fn essay_without_answers_is_usable() {
        let question = fixtures::essay_question("essay-1");
        assert!(question.answers.is_empty());
        assert!(question.is_usable());
    }

    #[test]
    fn non_positive_weight_is_unusable() {
        let mut question = fixtures::single_choice_question("q-1", "A1");
        question.weight = 0.0;
        assert!(question.ensure_usable().is_err());
    }
}
