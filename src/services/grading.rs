use crate::models::blueprint::AnswerKey;
use crate::models::question::Answer;
use crate::models::submission::{GradeReport, QuestionResult, Submission};
use crate::models::test::Test;
use crate::utils::time::now;

/// Grades a submission against the server-held answer key. MCQ answers are
/// scored immediately: full `marks` when correct, `negative_marks` deducted
/// when wrong, nothing for a skipped question. Essay, short-answer and
/// very-short-answer questions are marked as awaiting review; a test
/// containing any of those comes back `needs_review = true` and the service
/// reports the submission as pending until a grader fills the gaps in.
pub fn grade(test: &Test, key: &AnswerKey, submission: &Submission) -> (GradeReport, bool) {
    let mut results = Vec::with_capacity(test.questions.len());
    let mut needs_review = false;

    for q in &test.questions {
        let answer = submission.answers.get(&q.id).cloned();
        if q.is_mcq() {
            let (correct, marks_awarded) = match (&answer, key.correct_option(&q.id)) {
                (Some(Answer::Selected(given)), Some(expected)) if *given == expected => {
                    (Some(true), q.marks as i64)
                }
                (Some(_), _) => (Some(false), -(q.negative_marks.unwrap_or(0) as i64)),
                (None, _) => (Some(false), 0),
            };
            results.push(QuestionResult {
                question_id: q.id.clone(),
                answer,
                correct,
                marks_awarded,
                marks_available: q.marks,
            });
        } else {
            needs_review = true;
            results.push(QuestionResult {
                question_id: q.id.clone(),
                answer,
                correct: None,
                marks_awarded: 0,
                marks_available: q.marks,
            });
        }
    }

    (build_report(results), needs_review)
}

/// Re-totals a report after its per-question results changed (manual grading).
pub fn build_report(results: Vec<QuestionResult>) -> GradeReport {
    let score: i64 = results.iter().map(|r| r.marks_awarded).sum();
    let max_score: i64 = results.iter().map(|r| r.marks_available as i64).sum();
    let percentage = if max_score > 0 {
        ((score as f64 / max_score as f64) * 100.0).max(0.0)
    } else {
        0.0
    };
    GradeReport {
        score,
        max_score,
        percentage,
        results,
        graded_at: now(),
    }
}
