use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Mcq,
    Essay,
    ShortAnswer,
    VeryShortAnswer,
}

/// The client-safe question: what the attempt engine holds while the attempt
/// is open. It carries no correct-answer data; the answer key stays on the
/// service side (see `models::blueprint`).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Question {
    #[validate(length(min = 1))]
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[validate(length(min = 1))]
    pub text: String,
    /// Option texts, MCQ only; the option index is the canonical answer encoding.
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default = "default_marks")]
    #[validate(range(min = 1))]
    pub marks: u32,
    pub negative_marks: Option<u32>,
}

pub(crate) fn default_marks() -> u32 {
    1
}

impl Question {
    pub fn is_mcq(&self) -> bool {
        self.question_type == QuestionType::Mcq
    }
}

/// A recorded answer: an option index for MCQ, free text for the other types.
/// A skipped question has no `Answer` at all, never a sentinel value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Selected(usize),
    Text(String),
}
