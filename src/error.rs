use crate::engine::attempt::EngineError;
use crate::services::test_service::ServiceError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Submission rejected: {0}")]
    SubmissionRejected(String),

    #[error("Test service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Invalid test: {0}")]
    InvalidTest(String),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ServiceError> for Error {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound => Error::NotFound("test or submission not found".to_string()),
            ServiceError::Rejected(reason) => Error::SubmissionRejected(reason),
            ServiceError::Unavailable(reason) => Error::ServiceUnavailable(reason),
        }
    }
}

impl Error {
    /// Submission failures the session may retry with the frozen snapshot.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::SubmissionRejected(_) | Error::ServiceUnavailable(_)
        )
    }
}
