use crate::models::question::Answer;
use std::collections::BTreeMap;

/// Mutable record of the student's current answers for one attempt.
/// Overwrite-by-question-id; no correctness validation at this layer.
#[derive(Debug, Clone, Default)]
pub struct AnswerLedger {
    entries: BTreeMap<String, Answer>,
}

impl AnswerLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, question_id: impl Into<String>, answer: Answer) {
        self.entries.insert(question_id.into(), answer);
    }

    pub fn get(&self, question_id: &str) -> Option<&Answer> {
        self.entries.get(question_id)
    }

    /// Number of distinct questions with a recorded answer.
    pub fn answered_count(&self) -> usize {
        self.entries.len()
    }

    /// Immutable copy of the full mapping, taken at submission time to freeze
    /// it against further clock-driven mutation.
    pub fn snapshot(&self) -> BTreeMap<String, Answer> {
        self.entries.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answered_count_tracks_distinct_ids() {
        let mut ledger = AnswerLedger::new();
        assert_eq!(ledger.answered_count(), 0);

        ledger.set("q1", Answer::Selected(0));
        ledger.set("q2", Answer::Text("foo".into()));
        ledger.set("q1", Answer::Selected(3));
        ledger.set("q1", Answer::Selected(1));

        assert_eq!(ledger.answered_count(), 2);
        assert_eq!(ledger.get("q1"), Some(&Answer::Selected(1)));
    }

    #[test]
    fn get_returns_none_for_unanswered() {
        let ledger = AnswerLedger::new();
        assert!(ledger.get("q1").is_none());
    }

    #[test]
    fn snapshot_is_independent_of_later_writes() {
        let mut ledger = AnswerLedger::new();
        ledger.set("q1", Answer::Selected(2));
        let snap = ledger.snapshot();

        ledger.set("q1", Answer::Selected(0));
        ledger.set("q2", Answer::Text("late".into()));

        assert_eq!(snap.len(), 1);
        assert_eq!(snap.get("q1"), Some(&Answer::Selected(2)));
    }
}
