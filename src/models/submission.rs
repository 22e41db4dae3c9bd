use crate::models::question::Answer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// The finalized, immutable payload handed to the grading collaborator once
/// an attempt ends. Skipped questions are simply absent from `answers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub test_id: Uuid,
    pub student_id: Uuid,
    pub answers: BTreeMap<String, Answer>,
    pub time_taken_seconds: u32,
    pub submitted_at: DateTime<Utc>,
}

/// What the test service reports for an existing submission: still awaiting
/// a human grader, or fully graded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionStatus {
    Pending { submitted_at: DateTime<Utc> },
    Graded(GradeReport),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeReport {
    pub score: i64,
    pub max_score: i64,
    pub percentage: f64,
    pub results: Vec<QuestionResult>,
    pub graded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question_id: String,
    pub answer: Option<Answer>,
    /// None while the answer still awaits manual review.
    pub correct: Option<bool>,
    pub marks_awarded: i64,
    pub marks_available: u32,
}
