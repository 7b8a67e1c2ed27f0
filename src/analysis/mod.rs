//! Structured-analysis layer: turning unreliable model output into
//! validated, renderable data.
//!
//! This module provides:
//! * [`extract`](extract::extract) / [`GrammarAnalysis`] — category-schema
//!   extraction from free-form replies.
//! * [`parse_correction_report`] / [`CorrectionReport`] — correction-schema
//!   parsing.
//! * [`reconcile`] / [`CorrectionSpan`] — anchoring claimed errors to the
//!   real input text as non-overlapping spans.

pub mod correction;
pub mod extract;
pub mod reconcile;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use correction::{parse_correction_report, ClaimedError, CorrectionReport};
pub use extract::{extract, strip_code_fence, ExtractError, GrammarAnalysis, GrammarCategory};
pub use reconcile::{reconcile, CorrectionSpan};

/// Truncate to at most `max_chars` characters, on a `char` boundary.
pub(crate) fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
