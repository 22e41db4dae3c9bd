use crate::models::blueprint::{AnswerKey, TestBlueprint};
use crate::models::submission::{Submission, SubmissionStatus};
use crate::models::test::Test;
use crate::services::grading;
use crate::services::test_service::{ServiceError, TestService};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

struct StoredTest {
    test: Test,
    key: AnswerKey,
    is_active: bool,
}

struct StoredSubmission {
    submitted_at: DateTime<Utc>,
    report: crate::models::submission::GradeReport,
    needs_review: bool,
}

#[derive(Default)]
struct Inner {
    tests: HashMap<Uuid, StoredTest>,
    submissions: HashMap<(Uuid, Uuid), StoredSubmission>,
}

/// In-memory reference collaborator: the server-side stand-in used by the
/// binary and the integration tests. It ingests blueprints, serves only the
/// client-safe half, grades on submit and guards the one-submission-per-
/// (test, student) invariant the engine relies on but does not enforce.
#[derive(Default)]
pub struct InMemoryTestService {
    inner: Mutex<Inner>,
}

impl InMemoryTestService {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Validates and stores a blueprint, quarantining the answer key away
    /// from the client-safe test.
    pub fn register(&self, blueprint: TestBlueprint) -> crate::error::Result<Uuid> {
        blueprint.validate()?;
        let is_active = blueprint.is_active;
        let (test, key) = blueprint.split();
        test.check_shape().map_err(crate::error::Error::InvalidTest)?;
        let id = test.id;
        info!(test_id = %id, title = %test.title, "test registered");
        self.lock().tests.insert(
            id,
            StoredTest {
                test,
                key,
                is_active,
            },
        );
        Ok(id)
    }

    /// Closes a test to further submissions.
    pub fn close_test(&self, test_id: Uuid) {
        if let Some(stored) = self.lock().tests.get_mut(&test_id) {
            stored.is_active = false;
        }
    }

    /// A grader scores one review-pending answer. Once no question awaits
    /// review the submission flips from pending to graded.
    pub fn record_manual_grade(
        &self,
        test_id: Uuid,
        student_id: Uuid,
        question_id: &str,
        marks_awarded: i64,
        correct: bool,
    ) -> Result<SubmissionStatus, ServiceError> {
        let mut inner = self.lock();
        let stored = inner
            .submissions
            .get_mut(&(test_id, student_id))
            .ok_or(ServiceError::NotFound)?;

        let result = stored
            .report
            .results
            .iter_mut()
            .find(|r| r.question_id == question_id && r.correct.is_none())
            .ok_or_else(|| {
                ServiceError::Rejected(format!("question {} is not awaiting review", question_id))
            })?;
        result.correct = Some(correct);
        result.marks_awarded = marks_awarded;

        let results = std::mem::take(&mut stored.report.results);
        stored.report = grading::build_report(results);
        stored.needs_review = stored.report.results.iter().any(|r| r.correct.is_none());
        Ok(stored.status())
    }
}

impl StoredSubmission {
    fn status(&self) -> SubmissionStatus {
        if self.needs_review {
            SubmissionStatus::Pending {
                submitted_at: self.submitted_at,
            }
        } else {
            SubmissionStatus::Graded(self.report.clone())
        }
    }
}

#[async_trait]
impl TestService for InMemoryTestService {
    async fn fetch_attemptable_test(
        &self,
        test_id: Uuid,
        _student_id: Uuid,
    ) -> Result<Test, ServiceError> {
        let inner = self.lock();
        match inner.tests.get(&test_id) {
            Some(stored) if stored.is_active => Ok(stored.test.clone()),
            _ => Err(ServiceError::NotFound),
        }
    }

    async fn fetch_existing_submission(
        &self,
        test_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<SubmissionStatus>, ServiceError> {
        let inner = self.lock();
        if !inner.tests.contains_key(&test_id) {
            return Err(ServiceError::NotFound);
        }
        Ok(inner
            .submissions
            .get(&(test_id, student_id))
            .map(StoredSubmission::status))
    }

    async fn submit_attempt(&self, submission: Submission) -> Result<SubmissionStatus, ServiceError> {
        let mut inner = self.lock();
        let stored_test = inner
            .tests
            .get(&submission.test_id)
            .ok_or(ServiceError::NotFound)?;
        if !stored_test.is_active {
            return Err(ServiceError::Rejected("test is closed".to_string()));
        }
        let slot = (submission.test_id, submission.student_id);
        if inner.submissions.contains_key(&slot) {
            return Err(ServiceError::Rejected("already submitted".to_string()));
        }

        let (report, needs_review) =
            grading::grade(&stored_test.test, &stored_test.key, &submission);
        info!(
            test_id = %submission.test_id,
            student_id = %submission.student_id,
            score = report.score,
            needs_review,
            "submission accepted"
        );
        let stored = StoredSubmission {
            submitted_at: submission.submitted_at,
            report,
            needs_review,
        };
        let status = stored.status();
        inner.submissions.insert(slot, stored);
        Ok(status)
    }
}
