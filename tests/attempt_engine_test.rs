use exam_engine::{
    Answer, AttemptEngine, AttemptPhase, EngineError, Question, QuestionType, Test,
};
use uuid::Uuid;

fn mcq(id: &str, options: &[&str]) -> Question {
    Question {
        id: id.to_string(),
        question_type: QuestionType::Mcq,
        text: format!("Question {}", id),
        options: options.iter().map(|o| o.to_string()).collect(),
        marks: 2,
        negative_marks: Some(1),
    }
}

fn essay(id: &str) -> Question {
    Question {
        id: id.to_string(),
        question_type: QuestionType::Essay,
        text: format!("Question {}", id),
        options: vec![],
        marks: 5,
        negative_marks: None,
    }
}

fn sample_test(duration_minutes: u32) -> Test {
    Test {
        id: Uuid::new_v4(),
        title: "Sample".to_string(),
        description: None,
        duration_minutes,
        questions: vec![mcq("q1", &["a", "b", "c", "d"]), essay("q2")],
    }
}

#[test]
fn answered_count_tracks_distinct_questions() {
    let mut engine = AttemptEngine::new(sample_test(10), Uuid::new_v4());

    engine.answer("q1", Answer::Selected(0)).unwrap();
    engine.answer("q1", Answer::Selected(2)).unwrap();
    engine.answer("q2", Answer::Text("draft".into())).unwrap();
    engine.answer("q1", Answer::Selected(1)).unwrap();

    assert_eq!(engine.answered_count(), 2);
    assert_eq!(engine.answer_for("q1"), Some(&Answer::Selected(1)));
}

#[test]
fn second_request_submit_is_rejected() {
    let mut engine = AttemptEngine::new(sample_test(10), Uuid::new_v4());
    engine.answer("q1", Answer::Selected(1)).unwrap();

    let first = engine.request_submit();
    assert!(first.is_ok());
    // The user-click/timeout race funnels here: the loser gets a rejection.
    assert_eq!(
        engine.request_submit(),
        Err(EngineError::NotInProgress(AttemptPhase::Submitting))
    );
}

#[test]
fn tick_zero_exits_in_progress_exactly_once() {
    let mut engine = AttemptEngine::new(sample_test(1), Uuid::new_v4());

    let submission = engine.tick(0);
    assert!(submission.is_some());
    assert_eq!(engine.phase(), AttemptPhase::Submitting);

    // Redundant post-expiry ticks are silent no-ops, never a second submission.
    assert!(engine.tick(0).is_none());
    assert!(engine.tick(0).is_none());
    assert_eq!(engine.phase(), AttemptPhase::Submitting);
}

#[test]
fn navigate_clamps_and_is_idempotent() {
    let mut engine = AttemptEngine::new(sample_test(10), Uuid::new_v4());
    engine.answer("q1", Answer::Selected(0)).unwrap();
    engine.tick(599);
    let remaining_before = engine.seconds_remaining();

    assert_eq!(engine.navigate(1).unwrap(), 1);
    assert_eq!(engine.navigate(1).unwrap(), 1);
    assert_eq!(engine.navigate(1).unwrap(), 1);
    assert_eq!(engine.navigate(999).unwrap(), 1);

    assert_eq!(engine.answered_count(), 1);
    assert_eq!(engine.seconds_remaining(), remaining_before);
    // Navigating to an unanswered question shows it as unanswered.
    assert!(engine.answer_for("q2").is_none());
}

#[test]
fn time_taken_is_duration_minus_remaining() {
    let mut engine = AttemptEngine::new(sample_test(10), Uuid::new_v4());
    engine.answer("q1", Answer::Selected(2)).unwrap();
    engine.answer("q2", Answer::Text("foo".into())).unwrap();
    engine.tick(300);

    let submission = engine.request_submit().unwrap();
    assert_eq!(submission.time_taken_seconds, 600 - 300);
    assert_eq!(submission.answers.get("q1"), Some(&Answer::Selected(2)));
    assert_eq!(submission.answers.get("q2"), Some(&Answer::Text("foo".into())));
}

#[test]
fn timeout_auto_submits_exactly_once() {
    let test = Test {
        id: Uuid::new_v4(),
        title: "One minute".to_string(),
        description: None,
        duration_minutes: 1,
        questions: vec![mcq("q1", &["a", "b", "c"])],
    };
    let mut engine = AttemptEngine::new(test, Uuid::new_v4());

    let mut submissions = Vec::new();
    for remaining in (0..60).rev() {
        if remaining == 50 {
            // Student picks option 1 ten seconds in.
            engine.answer("q1", Answer::Selected(1)).unwrap();
        }
        if let Some(submission) = engine.tick(remaining) {
            submissions.push(submission);
        }
    }

    assert_eq!(submissions.len(), 1);
    let submission = &submissions[0];
    assert_eq!(submission.time_taken_seconds, 60);
    assert_eq!(submission.answers.len(), 1);
    assert_eq!(submission.answers.get("q1"), Some(&Answer::Selected(1)));
}

#[test]
fn skipped_question_has_no_entry_in_submission() {
    let mut engine = AttemptEngine::new(sample_test(10), Uuid::new_v4());
    engine.answer("q1", Answer::Selected(0)).unwrap();

    let submission = engine.request_submit().unwrap();
    assert!(submission.answers.contains_key("q1"));
    assert!(!submission.answers.contains_key("q2"));
}

#[test]
fn submit_while_awaiting_ack_is_rejected_then_confirmable() {
    let mut engine = AttemptEngine::new(sample_test(10), Uuid::new_v4());
    engine.answer("q1", Answer::Selected(3)).unwrap();

    let frozen = engine.request_submit().unwrap();
    // Simulates the network ack still being in flight.
    assert!(engine.request_submit().is_err());
    assert_eq!(engine.retry_submission().unwrap(), frozen);

    engine.confirm_submitted().unwrap();
    assert_eq!(engine.phase(), AttemptPhase::Submitted);
    assert!(engine.retry_submission().is_err());
    assert!(engine.pending_submission().is_none());
}

#[test]
fn no_mutation_after_submitted() {
    let mut engine = AttemptEngine::new(sample_test(10), Uuid::new_v4());
    engine.request_submit().unwrap();
    engine.confirm_submitted().unwrap();

    assert_eq!(
        engine.navigate(0),
        Err(EngineError::NotInProgress(AttemptPhase::Submitted))
    );
    assert!(engine.answer("q1", Answer::Selected(0)).is_err());
    assert!(engine.request_submit().is_err());
    assert!(engine.tick(10).is_none());
    assert_eq!(engine.seconds_remaining(), 600);
}

#[test]
fn delivered_remaining_is_authoritative_but_never_increases() {
    let mut engine = AttemptEngine::new(sample_test(10), Uuid::new_v4());

    // A coalesced batch of ticks lands as one big jump.
    engine.tick(400);
    assert_eq!(engine.seconds_remaining(), 400);

    // A stale larger value must not give time back.
    engine.tick(550);
    assert_eq!(engine.seconds_remaining(), 400);
}

#[test]
fn tick_during_submitting_is_discarded() {
    let mut engine = AttemptEngine::new(sample_test(10), Uuid::new_v4());
    engine.tick(500);
    engine.request_submit().unwrap();

    assert!(engine.tick(499).is_none());
    assert_eq!(engine.seconds_remaining(), 500);
}

#[test]
fn answer_validation_rejects_bad_input() {
    let mut engine = AttemptEngine::new(sample_test(10), Uuid::new_v4());

    assert_eq!(
        engine.answer("nope", Answer::Selected(0)),
        Err(EngineError::UnknownQuestion("nope".into()))
    );
    assert_eq!(
        engine.answer("q1", Answer::Selected(4)),
        Err(EngineError::OptionOutOfRange {
            question_id: "q1".into(),
            index: 4,
            options: 4,
        })
    );
    assert_eq!(
        engine.answer("q1", Answer::Text("not an index".into())),
        Err(EngineError::AnswerTypeMismatch("q1".into()))
    );
    assert_eq!(
        engine.answer("q2", Answer::Selected(0)),
        Err(EngineError::AnswerTypeMismatch("q2".into()))
    );
    assert_eq!(engine.answered_count(), 0);
}

#[test]
fn countdown_display_and_urgency() {
    let mut engine = AttemptEngine::new(sample_test(10), Uuid::new_v4());
    assert_eq!(engine.remaining_display(), "10:00");
    assert!(!engine.is_urgent());

    engine.tick(300);
    assert!(!engine.is_urgent());

    engine.tick(299);
    assert!(engine.is_urgent());
    assert_eq!(engine.remaining_display(), "04:59");
}

#[test]
fn reopen_returns_attempt_to_the_student() {
    let mut engine = AttemptEngine::new(sample_test(10), Uuid::new_v4());
    engine.answer("q1", Answer::Selected(0)).unwrap();
    engine.tick(500);
    engine.request_submit().unwrap();

    engine.reopen().unwrap();
    assert_eq!(engine.phase(), AttemptPhase::InProgress);
    assert!(engine.pending_submission().is_none());

    // Nothing was lost and the attempt can be finished again.
    engine.answer("q2", Answer::Text("second wind".into())).unwrap();
    let submission = engine.request_submit().unwrap();
    assert_eq!(submission.answers.len(), 2);
    assert_eq!(submission.time_taken_seconds, 100);
}
