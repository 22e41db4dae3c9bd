use crate::models::question::Question;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Test {
    pub id: Uuid,
    #[validate(length(min = 1))]
    pub title: String,
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Duration must be at least 1 minute"))]
    pub duration_minutes: u32,
    /// Display and navigation order, fixed for the duration of one attempt.
    #[validate(length(min = 1, message = "A test needs at least one question"), nested)]
    pub questions: Vec<Question>,
}

impl Test {
    pub fn duration_secs(&self) -> u32 {
        self.duration_minutes * 60
    }

    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    /// Shape rules the `Validate` derive cannot express: MCQ questions need at
    /// least two options, the other types must not carry any.
    pub fn check_shape(&self) -> Result<(), String> {
        for q in &self.questions {
            if q.is_mcq() {
                if q.options.len() < 2 {
                    return Err(format!("MCQ question {} needs at least 2 options", q.id));
                }
            } else if !q.options.is_empty() {
                return Err(format!("Question {} is not MCQ but carries options", q.id));
            }
        }
        Ok(())
    }
}
