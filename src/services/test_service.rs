use crate::models::submission::{Submission, SubmissionStatus};
use crate::models::test::Test;
use async_trait::async_trait;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("test not found")]
    NotFound,
    #[error("submission rejected: {0}")]
    Rejected(String),
    #[error("test service unavailable: {0}")]
    Unavailable(String),
}

/// The external test-service collaborator. The transport behind it (hosted
/// database, HTTP, in-memory stand-in) is out of the engine's scope; the
/// engine makes exactly one `submit_attempt` call per attempt and never
/// retries on its own.
#[async_trait]
pub trait TestService: Send + Sync {
    /// The client-safe test definition, or `NotFound` when the test is
    /// absent, closed, or not accessible to this student.
    async fn fetch_attemptable_test(
        &self,
        test_id: Uuid,
        student_id: Uuid,
    ) -> Result<Test, ServiceError>;

    /// Status of a prior submission by this student, if one exists.
    async fn fetch_existing_submission(
        &self,
        test_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<SubmissionStatus>, ServiceError>;

    /// Accepts a finished attempt. The acknowledgment carries the immediate
    /// status: graded for MCQ-only tests, pending when a human grader still
    /// has work to do.
    async fn submit_attempt(&self, submission: Submission) -> Result<SubmissionStatus, ServiceError>;
}
