#[cfg(test)]
pub mod fixtures {
    use chrono::{Duration, Utc};

    use crate::models::domain::question::{ContentFormat, QuestionContent};
    use crate::models::domain::{
        Answer, AnswerToken, DifficultyLevel, Question, QuestionAnswer, QuestionType, QuizSession,
        Score,
    };

    fn content(body: &str, format: ContentFormat) -> QuestionContent {
        QuestionContent {
            body: body.to_string(),
            format,
            language: None,
        }
    }

    /// Single-choice question with answers A1..A4; `correct_id` holds the credit.
    pub fn single_choice_question(id: &str, correct_id: &str) -> Question {
        Question {
            id: id.to_string(),
            content: content("Which option is right?", ContentFormat::Text),
            question_type: QuestionType::SingleChoice,
            difficulty: DifficultyLevel::clamped(3),
            weight: 1.0,
            answers: (1..=4)
                .map(|n| {
                    let answer_id = format!("A{}", n);
                    let credit = if answer_id == correct_id { 100.0 } else { 0.0 };
                    Answer::new(&answer_id, &format!("Option {}", n), credit, n as u16)
                })
                .collect(),
            explanation: None,
            category: Some("general".to_string()),
        }
    }

    /// Multiple-choice question worth 10 points with answers A1..A`total`.
    pub fn multiple_choice_question(id: &str, correct_ids: &[&str], total: usize) -> Question {
        Question {
            id: id.to_string(),
            content: content("Select all that apply", ContentFormat::Markdown),
            question_type: QuestionType::MultipleChoice,
            difficulty: DifficultyLevel::clamped(5),
            weight: 10.0,
            answers: (1..=total)
                .map(|n| {
                    let answer_id = format!("A{}", n);
                    let credit = if correct_ids.contains(&answer_id.as_str()) {
                        100.0
                    } else {
                        0.0
                    };
                    Answer::new(&answer_id, &format!("Choice {}", n), credit, n as u16)
                })
                .collect(),
            explanation: Some("Several answers hold".to_string()),
            category: Some("general".to_string()),
        }
    }

    pub fn true_false_question(id: &str, correct_is_true: bool) -> Question {
        let (true_credit, false_credit) = if correct_is_true {
            (100.0, 0.0)
        } else {
            (0.0, 100.0)
        };

        Question {
            id: id.to_string(),
            content: content("Rust has a garbage collector.", ContentFormat::Text),
            question_type: QuestionType::TrueFalse,
            difficulty: DifficultyLevel::clamped(2),
            weight: 1.0,
            answers: vec![
                Answer::new(&format!("{}-true", id), "True", true_credit, 0),
                Answer::new(&format!("{}-false", id), "False", false_credit, 1),
            ],
            explanation: None,
            category: Some("basics".to_string()),
        }
    }

    pub fn essay_question(id: &str) -> Question {
        Question {
            id: id.to_string(),
            content: content("Explain ownership.", ContentFormat::Markdown),
            question_type: QuestionType::Essay,
            difficulty: DifficultyLevel::clamped(6),
            weight: 5.0,
            answers: vec![],
            explanation: None,
            category: Some("concepts".to_string()),
        }
    }

    pub fn code_completion_question(id: &str) -> Question {
        Question {
            id: id.to_string(),
            content: QuestionContent {
                body: "fn main() { /* print hi */ }".to_string(),
                format: ContentFormat::Code,
                language: Some("rust".to_string()),
            },
            question_type: QuestionType::CodeCompletion,
            difficulty: DifficultyLevel::clamped(7),
            weight: 5.0,
            answers: vec![],
            explanation: None,
            category: Some("coding".to_string()),
        }
    }

    pub fn question_with(id: &str, difficulty: u8, category: &str) -> Question {
        let mut question = single_choice_question(id, "A1");
        question.difficulty = DifficultyLevel::clamped(difficulty as i64);
        question.category = Some(category.to_string());
        question
    }

    /// Answer to a single-choice question, right or wrong.
    pub fn answer_for(question: &Question, correct: bool) -> QuestionAnswer {
        let token = if correct { "A1" } else { "A2" };
        let score = if correct {
            Score::full(question.max_points())
        } else {
            Score::zero(question.max_points())
        };
        QuestionAnswer::new(question, vec![AnswerToken::text(token)], 30, 3600, score)
            .expect("fixture answer should be valid")
    }

    pub fn session_with_questions(user_id: &str, question_ids: &[&str]) -> QuizSession {
        QuizSession::new(
            user_id,
            question_ids.iter().map(|id| id.to_string()).collect(),
            DifficultyLevel::clamped(3),
            true,
            false,
            None,
        )
    }

    /// Completed session whose single answer scores `percentage` at `difficulty`.
    pub fn completed_session(
        user_id: &str,
        difficulty: u8,
        percentage: f64,
        minutes_ago: i64,
    ) -> QuizSession {
        let mut question = single_choice_question(&format!("hist-{}", minutes_ago), "A1");
        question.weight = 100.0;
        question.difficulty = DifficultyLevel::clamped(difficulty as i64);

        let score = Score::from_fraction(percentage / 100.0, 100.0);
        let answer = QuestionAnswer::new(&question, vec![AnswerToken::text("A1")], 10, 3600, score)
            .expect("fixture answer should be valid");

        let mut session = session_with_questions(user_id, &[&question.id]);
        session.target_difficulty = DifficultyLevel::clamped(difficulty as i64);
        session.started_at = Utc::now() - Duration::minutes(minutes_ago) - Duration::minutes(5);
        session.question_answers.push(answer);
        session.completed_at = Some(Utc::now() - Duration::minutes(minutes_ago));
        session
    }

    /// Completed sessions at `difficulty`, oldest first, one per score.
    pub fn history(user_id: &str, difficulty: u8, scores: &[f64]) -> Vec<QuizSession> {
        let n = scores.len() as i64;
        scores
            .iter()
            .enumerate()
            .map(|(i, score)| completed_session(user_id, difficulty, *score, (n - i as i64) * 10))
            .collect()
    }
}

#[cfg(test)]
pub mod test_helpers {
    /// Initialises logging once for tests; repeated calls are ignored.
    pub fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    pub fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "Expected {}, got {}",
            expected,
            actual
        );
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;

    #[test]
    fn test_fixture_questions_are_usable() {
        assert!(single_choice_question("q", "A1").is_usable());
        assert!(multiple_choice_question("q", &["A1", "A3"], 4).is_usable());
        assert!(true_false_question("q", true).is_usable());
        assert!(essay_question("q").is_usable());
        assert!(code_completion_question("q").is_usable());
    }

    #[test]
    fn test_history_is_ordered_oldest_first() {
        let sessions = history("user-1", 4, &[10.0, 20.0, 30.0]);
        assert_eq!(sessions.len(), 3);
        assert!(sessions[0].completed_at < sessions[2].completed_at);
        assert!(sessions.iter().all(|s| s.is_completed()));
    }
}
