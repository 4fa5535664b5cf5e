//! Per-question-type scoring.
//!
//! Each strategy declares which questions it `supports`; `ScoringService`
//! asks the registered strategies in order and falls back to
//! [`DefaultStrategy`] when none claims the question.

pub mod default;
pub mod manual;
pub mod multiple_choice;
pub mod single_choice;
pub mod true_false;

pub use default::DefaultStrategy;
pub use manual::ManualGradingStrategy;
pub use multiple_choice::MultipleChoiceStrategy;
pub use single_choice::SingleChoiceStrategy;
pub use true_false::TrueFalseStrategy;

use crate::config::Config;
use crate::models::domain::{Answer, AnswerToken, Question, Score};

pub trait ScoringStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn supports(&self, question: &Question) -> bool;
    fn score(&self, question: &Question, submitted: &[AnswerToken]) -> Score;
}

pub struct ScoringService {
    strategies: Vec<Box<dyn ScoringStrategy>>,
    fallback: DefaultStrategy,
}

impl ScoringService {
    pub fn new(config: &Config) -> Self {
        Self::with_strategies(vec![
            Box::new(SingleChoiceStrategy),
            Box::new(MultipleChoiceStrategy::new(config.incorrect_penalty)),
            Box::new(TrueFalseStrategy),
            Box::new(ManualGradingStrategy),
        ])
    }

    pub fn with_strategies(strategies: Vec<Box<dyn ScoringStrategy>>) -> Self {
        Self {
            strategies,
            fallback: DefaultStrategy,
        }
    }

    /// Adds a strategy ahead of the ones already registered.
    pub fn register(&mut self, strategy: Box<dyn ScoringStrategy>) {
        self.strategies.insert(0, strategy);
    }

    pub fn strategy_for(&self, question: &Question) -> &dyn ScoringStrategy {
        self.strategies
            .iter()
            .find(|s| s.supports(question))
            .map(|s| s.as_ref())
            .unwrap_or(&self.fallback)
    }

    pub fn score(&self, question: &Question, submitted: &[AnswerToken]) -> Score {
        let strategy = self.strategy_for(question);
        let score = strategy.score(question, submitted);
        log::debug!(
            "Scored question {} with {} strategy: {}/{}",
            question.id,
            strategy.name(),
            score.points(),
            score.max_points()
        );
        score
    }
}

/// True when the token names this answer, by id or (for booleans) by content.
pub(crate) fn token_matches(token: &AnswerToken, answer: &Answer) -> bool {
    match token {
        AnswerToken::Text(text) => text == &answer.id,
        AnswerToken::Flag(flag) => {
            let flag = flag.to_string();
            answer.id.eq_ignore_ascii_case(&flag) || answer.content.trim().eq_ignore_ascii_case(&flag)
        }
    }
}

pub(crate) fn matches_any_correct(question: &Question, token: &AnswerToken) -> bool {
    question.correct_answers().any(|answer| token_matches(token, answer))
}
