//! Learning-event payloads and the persistence sink interface.
//!
//! The orchestrator produces a [`LearningEventPayload`] per tutor turn; a
//! collaborator implementing [`EventSink`] owns it from there (database,
//! file, nothing).  Sink failures are logged and swallowed by the caller —
//! persistence must never break the conversation.

use serde::Serialize;

use crate::analysis::{truncate_chars, GrammarAnalysis, GrammarCategory};

/// Event kind recorded for every tutor exchange.
pub const EVENT_KIND_TUTOR_INTERACTION: &str = "tutor_interaction";

/// Maximum stored length of the learner's input, in characters.
const MAX_INPUT_CHARS: usize = 200;
/// Maximum stored length of the tutor reply, in characters.
const MAX_REPLY_CHARS: usize = 400;

// ---------------------------------------------------------------------------
// LearningEventPayload
// ---------------------------------------------------------------------------

/// Key learning signals from one tutor interaction.
#[derive(Debug, Clone, Serialize)]
pub struct LearningEventPayload {
    /// Learner input, truncated to 200 characters.
    pub last_input: String,
    /// Tutor reply, truncated to 400 characters.
    pub last_reply: String,
    /// Grammar categories from the analysis side channel, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grammar_categories: Option<Vec<GrammarCategory>>,
    /// Short analysis comment, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grammar_comment: Option<String>,
}

impl LearningEventPayload {
    /// Build a payload from the raw exchange plus an optional analysis.
    ///
    /// Empty analysis fields are omitted rather than stored as empty values.
    pub fn new(input: &str, reply: &str, analysis: Option<&GrammarAnalysis>) -> Self {
        let grammar_categories = analysis
            .map(|a| a.categories.clone())
            .filter(|c| !c.is_empty());
        let grammar_comment = analysis.and_then(|a| a.comment.clone());

        Self {
            last_input: truncate_chars(input, MAX_INPUT_CHARS).to_string(),
            last_reply: truncate_chars(reply, MAX_REPLY_CHARS).to_string(),
            grammar_categories,
            grammar_comment,
        }
    }
}

// ---------------------------------------------------------------------------
// EventSink
// ---------------------------------------------------------------------------

/// Persistence collaborator for learning events.
///
/// Implementors must be `Send + Sync`; the orchestrator holds the sink as
/// `Arc<dyn EventSink>` and calls it from whatever task runs the turn.
pub trait EventSink: Send + Sync {
    /// Record one event.  Returning `Err` is allowed; the orchestrator logs
    /// and continues.
    fn record(
        &self,
        kind: &str,
        payload: &LearningEventPayload,
        session_id: Option<i64>,
    ) -> anyhow::Result<()>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_truncates_input_and_reply() {
        let input = "x".repeat(500);
        let reply = "y".repeat(500);
        let payload = LearningEventPayload::new(&input, &reply, None);

        assert_eq!(payload.last_input.chars().count(), 200);
        assert_eq!(payload.last_reply.chars().count(), 400);
    }

    #[test]
    fn payload_keeps_short_text_unchanged() {
        let payload = LearningEventPayload::new("hi", "hello there", None);
        assert_eq!(payload.last_input, "hi");
        assert_eq!(payload.last_reply, "hello there");
    }

    #[test]
    fn absent_analysis_fields_are_skipped_in_json() {
        let payload = LearningEventPayload::new("a", "b", None);
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["last_input"], "a");
        assert!(json.get("grammar_categories").is_none());
        assert!(json.get("grammar_comment").is_none());
    }

    #[test]
    fn analysis_fields_serialize_as_snake_case_names() {
        let analysis = GrammarAnalysis {
            categories: vec![GrammarCategory::VerbTense, GrammarCategory::Spelling],
            comment: Some("Past tense needs review.".into()),
        };
        let payload = LearningEventPayload::new("a", "b", Some(&analysis));
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(
            json["grammar_categories"],
            serde_json::json!(["verb_tense", "spelling"])
        );
        assert_eq!(json["grammar_comment"], "Past tense needs review.");
    }

    #[test]
    fn empty_category_list_is_omitted() {
        let analysis = GrammarAnalysis {
            categories: Vec::new(),
            comment: None,
        };
        let payload = LearningEventPayload::new("a", "b", Some(&analysis));
        let json = serde_json::to_value(&payload).unwrap();

        assert!(json.get("grammar_categories").is_none());
    }
}
