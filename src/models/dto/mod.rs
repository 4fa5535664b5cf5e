pub mod read_model;
pub mod request;

pub use request::{QuestionCriteria, StartSessionRequest, SubmitAnswerRequest};
