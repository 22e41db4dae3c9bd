use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use exam_engine::config::{get_config, init_config};
use exam_engine::models::blueprint::TestBlueprint;
use exam_engine::models::question::{Answer, Question};
use exam_engine::models::submission::{GradeReport, SubmissionStatus};
use exam_engine::models::test::Test;
use exam_engine::services::memory::InMemoryTestService;
use exam_engine::session::{ActiveAttempt, SessionEvent, SessionState, TestSessionController};
use exam_engine::ClockEvent;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "exam_engine=info".into()),
        )
        .init();
    init_config()?;
    let config = get_config();

    let raw = tokio::fs::read_to_string(&config.test_file)
        .await
        .with_context(|| format!("reading test file {}", config.test_file))?;
    let blueprint: TestBlueprint = serde_json::from_str(&raw)?;
    let test_id = blueprint.id;
    let student_id = config.student_id.unwrap_or_else(uuid::Uuid::new_v4);

    let service = Arc::new(InMemoryTestService::new());
    service.register(blueprint)?;
    let controller = TestSessionController::new(service);

    match controller.open(test_id, student_id).await? {
        SessionState::PendingGrading { submitted_at } => {
            println!("Submission from {} is awaiting grading.", submitted_at);
        }
        SessionState::Graded(report) => print_report(&report),
        SessionState::NotStarted(test) => {
            run_attempt(&controller, test, student_id, config.tick_ms).await?;
        }
    }
    Ok(())
}

async fn run_attempt(
    controller: &TestSessionController,
    test: Test,
    student_id: uuid::Uuid,
    tick_ms: u64,
) -> anyhow::Result<()> {
    print_header(&test);
    let (mut attempt, mut clock_events) =
        controller.begin_with_period(test, student_id, Duration::from_millis(tick_ms))?;
    print_question(attempt.engine().current_question(), attempt.engine().current_index());

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            event = clock_events.recv() => {
                let Some(event) = event else { break };
                if let Some(done) = on_clock_event(&mut attempt, event).await? {
                    finish(done);
                    break;
                }
            }
            line = input.next_line() => {
                let Some(line) = line? else { break };
                match on_input(&mut attempt, line.trim()).await? {
                    InputOutcome::Continue => {}
                    InputOutcome::Quit => {
                        attempt.close();
                        break;
                    }
                    InputOutcome::Done(status) => {
                        finish(status);
                        break;
                    }
                }
            }
        }
    }
    Ok(())
}

async fn on_clock_event(
    attempt: &mut ActiveAttempt,
    event: ClockEvent,
) -> anyhow::Result<Option<SubmissionStatus>> {
    match attempt.handle_clock_event(event).await? {
        Some(SessionEvent::TimeUpdated { remaining, display, urgent }) => {
            // Keep the terminal quiet: report every 30s, and every tick once urgent.
            if urgent || remaining % 30 == 0 {
                println!("[{}]{}", display, if urgent { " time is running out!" } else { "" });
            }
            Ok(None)
        }
        Some(SessionEvent::Submitted(status)) => {
            println!("Time is up; your answers were submitted automatically.");
            Ok(Some(status))
        }
        Some(SessionEvent::SubmitFailed(err)) => {
            println!("Time is up, but submitting failed: {}. Type :retry to try again.", err);
            Ok(None)
        }
        None => Ok(None),
    }
}

enum InputOutcome {
    Continue,
    Quit,
    Done(SubmissionStatus),
}

async fn on_input(attempt: &mut ActiveAttempt, line: &str) -> anyhow::Result<InputOutcome> {
    if line.is_empty() {
        return Ok(InputOutcome::Continue);
    }
    if let Some(command) = line.strip_prefix(':') {
        let mut parts = command.split_whitespace();
        match parts.next().unwrap_or("") {
            "next" => {
                let target = attempt.engine().current_index() + 1;
                show_move(attempt, target);
            }
            "prev" => {
                let target = attempt.engine().current_index().saturating_sub(1);
                show_move(attempt, target);
            }
            "goto" => match parts.next().and_then(|n| n.parse::<usize>().ok()) {
                // 1-based on the terminal, 0-based inside.
                Some(n) if n >= 1 => show_move(attempt, n - 1),
                _ => println!("Usage: :goto <question number>"),
            },
            "status" => {
                let engine = attempt.engine();
                println!(
                    "{} of {} answered, {} left",
                    engine.answered_count(),
                    engine.question_count(),
                    engine.remaining_display()
                );
            }
            "submit" => match attempt.submit().await {
                Ok(status) => return Ok(InputOutcome::Done(status)),
                Err(err) => println!("Submission failed: {}. Type :retry to try again.", err),
            },
            "retry" => match attempt.retry_submit().await {
                Ok(status) => return Ok(InputOutcome::Done(status)),
                Err(err) => println!("Submission failed again: {}", err),
            },
            "quit" => return Ok(InputOutcome::Quit),
            other => println!("Unknown command :{}", other),
        }
        return Ok(InputOutcome::Continue);
    }

    // Anything else answers the current question.
    let question = attempt.engine().current_question().clone();
    let answer = if question.is_mcq() {
        match line.parse::<usize>() {
            Ok(n) if n >= 1 => Answer::Selected(n - 1),
            _ => {
                println!("Answer with an option number between 1 and {}.", question.options.len());
                return Ok(InputOutcome::Continue);
            }
        }
    } else {
        Answer::Text(line.to_string())
    };
    match attempt.answer(&question.id, answer) {
        Ok(()) => info!(question_id = %question.id, "answer recorded"),
        Err(err) => println!("{}", err),
    }
    Ok(InputOutcome::Continue)
}

fn show_move(attempt: &mut ActiveAttempt, index: usize) {
    if let Ok(landed) = attempt.navigate(index) {
        print_question(attempt.engine().current_question(), landed);
    }
}

fn print_header(test: &Test) {
    println!("== {} ==", test.title);
    if let Some(description) = &test.description {
        println!("{}", description);
    }
    println!(
        "{} questions, {} minutes. Answer by typing; :next :prev :goto :status :submit :quit.",
        test.questions.len(),
        test.duration_minutes
    );
}

fn print_question(question: &Question, index: usize) {
    println!("\nQ{}: {}", index + 1, question.text);
    for (i, option) in question.options.iter().enumerate() {
        println!("  {}. {}", i + 1, option);
    }
}

fn finish(status: SubmissionStatus) {
    match status {
        SubmissionStatus::Pending { .. } => {
            println!("Submitted. Your answers are awaiting grading.");
        }
        SubmissionStatus::Graded(report) => print_report(&report),
    }
}

fn print_report(report: &GradeReport) {
    println!(
        "Score: {}/{} ({:.1}%)",
        report.score, report.max_score, report.percentage
    );
    for result in &report.results {
        let verdict = match result.correct {
            Some(true) => "correct",
            Some(false) => "wrong",
            None => "awaiting review",
        };
        println!(
            "  {}: {} ({}/{})",
            result.question_id, verdict, result.marks_awarded, result.marks_available
        );
    }
}
