use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    errors::AppResult,
    models::{domain::Question, dto::request::QuestionCriteria},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Question>>;
    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Question>>;
    /// Matching questions ordered by id.
    async fn find_by_criteria(&self, criteria: &QuestionCriteria) -> AppResult<Vec<Question>>;
}

fn matches(question: &Question, criteria: &QuestionCriteria) -> bool {
    if criteria.exclude_ids.iter().any(|id| *id == question.id) {
        return false;
    }
    if criteria
        .min_difficulty
        .is_some_and(|min| question.difficulty < min)
    {
        return false;
    }
    if criteria
        .max_difficulty
        .is_some_and(|max| question.difficulty > max)
    {
        return false;
    }
    if !criteria.question_types.is_empty()
        && !criteria.question_types.contains(&question.question_type)
    {
        return false;
    }
    match &criteria.category {
        Some(category) => question.category.as_deref() == Some(category.as_str()),
        None => true,
    }
}

#[derive(Clone, Default)]
pub struct InMemoryQuestionRepository {
    questions: Arc<RwLock<HashMap<String, Question>>>,
}

impl InMemoryQuestionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_questions(questions: Vec<Question>) -> Self {
        let repository = Self::new();
        for question in questions {
            repository.insert(question).await;
        }
        repository
    }

    /// Inserts or replaces a question by id.
    pub async fn insert(&self, question: Question) {
        let mut questions = self.questions.write().await;
        questions.insert(question.id.clone(), question);
    }
}

#[async_trait]
impl QuestionRepository for InMemoryQuestionRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Question>> {
        let questions = self.questions.read().await;
        Ok(questions.get(id).cloned())
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Question>> {
        let questions = self.questions.read().await;
        Ok(ids.iter().filter_map(|id| questions.get(id).cloned()).collect())
    }

    async fn find_by_criteria(&self, criteria: &QuestionCriteria) -> AppResult<Vec<Question>> {
        let questions = self.questions.read().await;
        let mut items: Vec<Question> = questions
            .values()
            .filter(|q| matches(q, criteria))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));

        if let Some(limit) = criteria.limit {
            items.truncate(limit);
        }
        Ok(items)
    }
}
