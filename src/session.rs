use crate::engine::attempt::{AttemptEngine, AttemptPhase};
use crate::engine::clock::{Clock, ClockEvent};
use crate::error::{Error, Result};
use crate::models::question::Answer;
use crate::models::submission::{GradeReport, SubmissionStatus};
use crate::models::test::Test;
use crate::services::test_service::TestService;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

/// Which attempt-lifecycle variant applies to (test, student), resolved once
/// on entry.
#[derive(Debug, Clone)]
pub enum SessionState {
    /// No prior submission; the caller may begin an attempt.
    NotStarted(Test),
    /// A submission exists but still awaits a grader. No re-attempt.
    PendingGrading { submitted_at: DateTime<Utc> },
    /// Graded; read-only results computed by the grading collaborator.
    Graded(GradeReport),
}

/// What the embedder's event loop gets back for a clock event.
#[derive(Debug)]
pub enum SessionEvent {
    TimeUpdated {
        remaining: u32,
        display: String,
        urgent: bool,
    },
    /// The expiry auto-submit went through.
    Submitted(SubmissionStatus),
    /// The expiry auto-submit failed; the attempt is left `Submitting` and
    /// `retry_submit` reuses the frozen snapshot.
    SubmitFailed(Error),
}

/// Page-level coordinator: routes a (test, student) pair to the right
/// lifecycle variant and wires a fresh attempt to its clock. Performs no
/// timing or answer logic itself.
pub struct TestSessionController {
    service: Arc<dyn TestService>,
}

impl TestSessionController {
    pub fn new(service: Arc<dyn TestService>) -> Self {
        Self { service }
    }

    /// Queries the collaborator once and resolves the lifecycle variant.
    pub async fn open(&self, test_id: Uuid, student_id: Uuid) -> Result<SessionState> {
        match self
            .service
            .fetch_existing_submission(test_id, student_id)
            .await?
        {
            Some(SubmissionStatus::Pending { submitted_at }) => {
                Ok(SessionState::PendingGrading { submitted_at })
            }
            Some(SubmissionStatus::Graded(report)) => Ok(SessionState::Graded(report)),
            None => {
                let test = self.service.fetch_attemptable_test(test_id, student_id).await?;
                Ok(SessionState::NotStarted(test))
            }
        }
    }

    /// Starts an attempt: validates the test, starts the clock, hands back
    /// the live attempt plus the clock's event receiver for the embedder's
    /// select loop.
    pub fn begin(
        &self,
        test: Test,
        student_id: Uuid,
    ) -> Result<(ActiveAttempt, mpsc::Receiver<ClockEvent>)> {
        self.begin_with_period(test, student_id, Duration::from_secs(1))
    }

    pub fn begin_with_period(
        &self,
        test: Test,
        student_id: Uuid,
        tick_period: Duration,
    ) -> Result<(ActiveAttempt, mpsc::Receiver<ClockEvent>)> {
        test.validate()?;
        test.check_shape().map_err(Error::InvalidTest)?;

        let (mut clock, events) = Clock::with_period(tick_period);
        clock.start(test.duration_secs());
        info!(test_id = %test.id, %student_id, duration_secs = test.duration_secs(), "attempt started");

        let attempt = ActiveAttempt {
            engine: AttemptEngine::new(test, student_id),
            clock,
            service: self.service.clone(),
        };
        Ok((attempt, events))
    }
}

/// An in-progress attempt: the state machine, its clock and the collaborator
/// the finished submission goes to. All methods take `&mut self`, so the
/// embedder's single event loop serializes every mutation.
pub struct ActiveAttempt {
    engine: AttemptEngine,
    clock: Clock,
    service: Arc<dyn TestService>,
}

impl ActiveAttempt {
    pub fn engine(&self) -> &AttemptEngine {
        &self.engine
    }

    pub fn navigate(&mut self, index: usize) -> Result<usize> {
        Ok(self.engine.navigate(index)?)
    }

    pub fn answer(&mut self, question_id: &str, answer: Answer) -> Result<()> {
        Ok(self.engine.answer(question_id, answer)?)
    }

    /// User-initiated submit. On a collaborator failure the engine stays
    /// `Submitting` with the snapshot frozen, and the error surfaces as
    /// retryable.
    pub async fn submit(&mut self) -> Result<SubmissionStatus> {
        let submission = self.engine.request_submit()?;
        self.clock.stop();
        self.forward(submission).await
    }

    /// Re-issues the frozen snapshot after a failed submit.
    pub async fn retry_submit(&mut self) -> Result<SubmissionStatus> {
        let submission = self.engine.retry_submission()?;
        self.forward(submission).await
    }

    /// Gives the attempt back to the student after a failed submit. The
    /// clock restarts from the remaining time; the receiver from `begin`
    /// keeps delivering.
    pub fn abandon_submit(&mut self) -> Result<()> {
        self.engine.reopen()?;
        self.clock.start(self.engine.seconds_remaining());
        Ok(())
    }

    async fn forward(&mut self, submission: crate::models::submission::Submission) -> Result<SubmissionStatus> {
        match self.service.submit_attempt(submission).await {
            Ok(status) => {
                self.engine.confirm_submitted()?;
                info!(test_id = %self.engine.test().id, "submission acknowledged by service");
                Ok(status)
            }
            Err(err) => {
                warn!(test_id = %self.engine.test().id, error = %err, "submission failed, snapshot kept for retry");
                Err(err.into())
            }
        }
    }

    /// Feeds one clock event into the attempt. A tick that arrives while a
    /// submit is already under way is discarded; the expiry tick performs
    /// the auto-submit through the same single-entry path as a user submit.
    pub async fn handle_clock_event(&mut self, event: ClockEvent) -> Result<Option<SessionEvent>> {
        match event {
            ClockEvent::Tick { remaining } => {
                if let Some(submission) = self.engine.tick(remaining) {
                    self.clock.stop();
                    match self.forward(submission).await {
                        Ok(status) => Ok(Some(SessionEvent::Submitted(status))),
                        Err(err) => Ok(Some(SessionEvent::SubmitFailed(err))),
                    }
                } else if self.engine.phase() == AttemptPhase::InProgress {
                    Ok(Some(SessionEvent::TimeUpdated {
                        remaining: self.engine.seconds_remaining(),
                        display: self.engine.remaining_display(),
                        urgent: self.engine.is_urgent(),
                    }))
                } else {
                    Ok(None)
                }
            }
            // The final tick already funneled the auto-submit.
            ClockEvent::Expired => Ok(None),
        }
    }

    /// View-teardown contract: stop the clock so no tick fires against a
    /// discarded attempt. Dropping the attempt stops it as well.
    pub fn close(&mut self) {
        self.clock.stop();
    }
}
