use crate::engine::ledger::AnswerLedger;
use crate::models::question::{Answer, Question};
use crate::models::submission::Submission;
use crate::models::test::Test;
use crate::utils::time::{format_clock, URGENT_THRESHOLD_SECS};
use chrono::Utc;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptPhase {
    InProgress,
    Submitting,
    Submitted,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("attempt is {0:?}; mutation is only allowed while in progress")]
    NotInProgress(AttemptPhase),
    #[error("unknown question id: {0}")]
    UnknownQuestion(String),
    #[error("option {index} is out of range for question {question_id} ({options} options)")]
    OptionOutOfRange {
        question_id: String,
        index: usize,
        options: usize,
    },
    #[error("answer shape does not match the type of question {0}")]
    AnswerTypeMismatch(String),
    #[error("no submission is awaiting acknowledgment")]
    NothingPending,
}

/// The attempt state machine: `InProgress -> Submitting -> Submitted`,
/// `Submitted` terminal. Only `InProgress` permits mutation; both the user
/// submit and the timeout funnel through the same single-entry transition
/// into `Submitting`, so at most one `Submission` is ever emitted per
/// attempt. The losing path of a submit/timeout race gets a rejection,
/// never a queue slot.
pub struct AttemptEngine {
    test: Test,
    student_id: Uuid,
    ledger: AnswerLedger,
    current_index: usize,
    seconds_remaining: u32,
    phase: AttemptPhase,
    pending: Option<Submission>,
}

impl AttemptEngine {
    pub fn new(test: Test, student_id: Uuid) -> Self {
        let seconds_remaining = test.duration_secs();
        Self {
            test,
            student_id,
            ledger: AnswerLedger::new(),
            current_index: 0,
            seconds_remaining,
            phase: AttemptPhase::InProgress,
            pending: None,
        }
    }

    fn guard_in_progress(&self) -> Result<(), EngineError> {
        if self.phase == AttemptPhase::InProgress {
            Ok(())
        } else {
            Err(EngineError::NotInProgress(self.phase))
        }
    }

    /// Moves to `index`, clamped to the question range. Free order; no
    /// answered-ness requirement. Returns the index actually landed on.
    pub fn navigate(&mut self, index: usize) -> Result<usize, EngineError> {
        self.guard_in_progress()?;
        self.current_index = index.min(self.test.questions.len() - 1);
        Ok(self.current_index)
    }

    /// Records an answer for `question_id`, overwriting any prior one.
    /// Rejects ids not in the test, MCQ indices out of option range and
    /// answers whose shape does not fit the question type.
    pub fn answer(&mut self, question_id: &str, answer: Answer) -> Result<(), EngineError> {
        self.guard_in_progress()?;
        let question = self
            .test
            .question(question_id)
            .ok_or_else(|| EngineError::UnknownQuestion(question_id.to_string()))?;
        match (&answer, question.is_mcq()) {
            (Answer::Selected(index), true) => {
                if *index >= question.options.len() {
                    return Err(EngineError::OptionOutOfRange {
                        question_id: question_id.to_string(),
                        index: *index,
                        options: question.options.len(),
                    });
                }
            }
            (Answer::Text(_), false) => {}
            _ => return Err(EngineError::AnswerTypeMismatch(question_id.to_string())),
        }
        self.ledger.set(question_id, answer);
        Ok(())
    }

    /// Clock callback. The delivered `remaining` is authoritative (coalesced
    /// ticks are a host reality), except that time never increases. A zero
    /// triggers the auto-submit; ticks arriving after `InProgress` are
    /// discarded without complaint, so a redundant post-expiry tick is a
    /// no-op rather than a double submission.
    pub fn tick(&mut self, remaining: u32) -> Option<Submission> {
        if self.phase != AttemptPhase::InProgress {
            return None;
        }
        self.seconds_remaining = self.seconds_remaining.min(remaining);
        if self.seconds_remaining == 0 {
            debug!(test_id = %self.test.id, "time expired, auto-submitting");
            return Some(self.freeze_submission());
        }
        None
    }

    /// User-initiated submit. First transition into `Submitting` wins; a
    /// second call, whether a double click or the timeout racing the user,
    /// is rejected.
    pub fn request_submit(&mut self) -> Result<Submission, EngineError> {
        self.guard_in_progress()?;
        Ok(self.freeze_submission())
    }

    fn freeze_submission(&mut self) -> Submission {
        self.phase = AttemptPhase::Submitting;
        let submission = Submission {
            test_id: self.test.id,
            student_id: self.student_id,
            answers: self.ledger.snapshot(),
            time_taken_seconds: self.test.duration_secs() - self.seconds_remaining,
            submitted_at: Utc::now(),
        };
        debug!(
            test_id = %submission.test_id,
            answered = submission.answers.len(),
            time_taken_seconds = submission.time_taken_seconds,
            "attempt frozen for submission"
        );
        self.pending = Some(submission.clone());
        submission
    }

    /// Collaborator acknowledged the submission: `Submitting -> Submitted`.
    pub fn confirm_submitted(&mut self) -> Result<(), EngineError> {
        if self.phase != AttemptPhase::Submitting {
            return Err(EngineError::NotInProgress(self.phase));
        }
        self.phase = AttemptPhase::Submitted;
        self.pending = None;
        debug!(test_id = %self.test.id, "submission acknowledged");
        Ok(())
    }

    /// The frozen submission awaiting acknowledgment, if any.
    pub fn pending_submission(&self) -> Option<&Submission> {
        self.pending.as_ref()
    }

    /// Re-issues the frozen snapshot after a failed submit. The snapshot is
    /// reused as-is so no answers are lost on retry.
    pub fn retry_submission(&self) -> Result<Submission, EngineError> {
        if self.phase != AttemptPhase::Submitting {
            return Err(EngineError::NotInProgress(self.phase));
        }
        self.pending.clone().ok_or(EngineError::NothingPending)
    }

    /// `Submitting -> InProgress`: the caller chose to return the attempt to
    /// the student after a failed submit instead of retrying.
    pub fn reopen(&mut self) -> Result<(), EngineError> {
        if self.phase != AttemptPhase::Submitting {
            return Err(EngineError::NotInProgress(self.phase));
        }
        self.phase = AttemptPhase::InProgress;
        self.pending = None;
        debug!(test_id = %self.test.id, "attempt reopened after failed submit");
        Ok(())
    }

    pub fn phase(&self) -> AttemptPhase {
        self.phase
    }

    pub fn test(&self) -> &Test {
        &self.test
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> &Question {
        &self.test.questions[self.current_index]
    }

    pub fn question_count(&self) -> usize {
        self.test.questions.len()
    }

    pub fn answer_for(&self, question_id: &str) -> Option<&Answer> {
        self.ledger.get(question_id)
    }

    pub fn answered_count(&self) -> usize {
        self.ledger.answered_count()
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    /// `mm:ss` projection of the remaining time.
    pub fn remaining_display(&self) -> String {
        format_clock(self.seconds_remaining)
    }

    /// Under five minutes left; consumed by presentation.
    pub fn is_urgent(&self) -> bool {
        self.seconds_remaining < URGENT_THRESHOLD_SECS
    }
}
