//! Tutor orchestration layer.
//!
//! This module provides:
//! * [`TutorOrchestrator`] — the two public operations (`ask`,
//!   `check_grammar`) over failover, extraction and reconciliation.
//! * [`PromptBuilder`] — conversational, analysis and correction prompts.
//! * [`LearningEventPayload`] / [`EventSink`] — handoff to the persistence
//!   collaborator.
//! * [`ERROR_MARKER`] / [`is_error_reply`] — the reserved error-reply
//!   convention callers must honour.

pub mod events;
pub mod orchestrator;
pub mod prompt;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use events::{EventSink, LearningEventPayload, EVENT_KIND_TUTOR_INTERACTION};
pub use orchestrator::{is_error_reply, GrammarCheck, TutorOrchestrator, ERROR_MARKER};
pub use prompt::PromptBuilder;
