use crate::models::question::{default_marks, Question, QuestionType};
use crate::models::test::Test;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

/// Authoring-side question: the client-safe fields plus the answer key.
/// Blueprints are what the test service ingests; they never cross the
/// engine boundary.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QuestionBlueprint {
    #[validate(length(min = 1))]
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[validate(length(min = 1))]
    pub text: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default = "default_marks")]
    #[validate(range(min = 1))]
    pub marks: u32,
    pub negative_marks: Option<u32>,
    /// MCQ only. Stripped out by `TestBlueprint::split` before the test is
    /// handed to a student client.
    pub correct_option_index: Option<usize>,
}

impl QuestionBlueprint {
    fn split(self) -> (Question, Option<usize>) {
        let key = self.correct_option_index;
        let question = Question {
            id: self.id,
            question_type: self.question_type,
            text: self.text,
            options: self.options,
            marks: self.marks,
            negative_marks: self.negative_marks,
        };
        (question, key)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TestBlueprint {
    pub id: Uuid,
    #[validate(length(min = 1))]
    pub title: String,
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Duration must be at least 1 minute"))]
    pub duration_minutes: u32,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[validate(length(min = 1, message = "A test needs at least one question"), nested)]
    pub questions: Vec<QuestionBlueprint>,
}

fn default_active() -> bool {
    true
}

/// Server-side mapping question id -> correct option index, for MCQ questions
/// that have one. Kept apart from `Test` so the key can never ride along into
/// a serialized client payload.
#[derive(Debug, Clone, Default)]
pub struct AnswerKey {
    correct: HashMap<String, usize>,
}

impl AnswerKey {
    pub fn correct_option(&self, question_id: &str) -> Option<usize> {
        self.correct.get(question_id).copied()
    }
}

impl TestBlueprint {
    /// Splits the blueprint into the client-safe `Test` and the private
    /// answer key.
    pub fn split(self) -> (Test, AnswerKey) {
        let mut key = AnswerKey::default();
        let mut questions = Vec::with_capacity(self.questions.len());
        for qb in self.questions {
            let (question, correct) = qb.split();
            if let Some(idx) = correct {
                key.correct.insert(question.id.clone(), idx);
            }
            questions.push(question);
        }
        let test = Test {
            id: self.id,
            title: self.title,
            description: self.description,
            duration_minutes: self.duration_minutes,
            questions,
        };
        (test, key)
    }
}
