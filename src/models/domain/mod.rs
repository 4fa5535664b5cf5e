pub mod adaptive_profile;
pub mod question;
pub mod question_answer;
pub mod quiz_session;
pub mod score;
pub mod session_event;
pub use adaptive_profile::AdaptiveProfile;
pub use question::{Answer, DifficultyLevel, Question, QuestionType};
pub use question_answer::{AnswerToken, QuestionAnswer};
pub use quiz_session::QuizSession;
pub use score::Score;
pub use session_event::SessionEvent;
