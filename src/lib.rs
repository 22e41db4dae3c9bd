pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod services;
pub mod session;
pub mod utils;

pub use crate::engine::attempt::{AttemptEngine, AttemptPhase, EngineError};
pub use crate::engine::clock::{Clock, ClockEvent};
pub use crate::engine::ledger::AnswerLedger;
pub use crate::error::{Error, Result};
pub use crate::models::blueprint::{AnswerKey, QuestionBlueprint, TestBlueprint};
pub use crate::models::question::{Answer, Question, QuestionType};
pub use crate::models::submission::{GradeReport, QuestionResult, Submission, SubmissionStatus};
pub use crate::models::test::Test;
pub use crate::services::memory::InMemoryTestService;
pub use crate::services::test_service::{ServiceError, TestService};
pub use crate::session::{ActiveAttempt, SessionEvent, SessionState, TestSessionController};
