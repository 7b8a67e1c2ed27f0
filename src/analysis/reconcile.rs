//! Reconciliation of claimed grammar errors against the real input text.
//!
//! The correction model reports each error with a literal token and numeric
//! bounds, but the bounds are the least reliable part of generative output:
//! off by an offset, stale from a previous reply, or missing entirely.  The
//! literal error text, by contrast, is usually reproduced faithfully — so
//! token-first matching is the core design decision here, with the claimed
//! offsets only as a clamped fallback.
//!
//! The output is always safe to render: spans are in-bounds, sorted by
//! start, non-overlapping, and anchored to the actual substring of the
//! input (original casing preserved).

use serde::Serialize;

use super::correction::ClaimedError;

// ---------------------------------------------------------------------------
// CorrectionSpan
// ---------------------------------------------------------------------------

/// A renderable error span: a half-open byte interval `[start, end)` into
/// the original text, on `char` boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorrectionSpan {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive); always greater than `start`.
    pub end: usize,
    /// The verbatim substring of the original text in `[start, end)`.
    pub token: String,
    /// Replacement text offered by the model.
    pub suggestion: String,
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// Resolve claimed errors into a sorted, non-overlapping span set.
///
/// Per claimed error, in the order provided:
/// 1. A non-empty claimed token is searched for (ASCII-case-insensitively)
///    starting at a monotonically advancing cursor, so repeated tokens
///    resolve to successive occurrences in left-to-right order.
/// 2. Otherwise the claimed offsets are clamped into range and repaired;
///    degenerate ranges are discarded rather than emitted as zero-length
///    highlights.
///
/// The final pass sorts by start and drops any span overlapping a
/// previously kept one (first wins).  An empty result means "render the
/// text unannotated" — it is never an error.
pub fn reconcile(text: &str, claimed: &[ClaimedError]) -> Vec<CorrectionSpan> {
    let mut spans: Vec<CorrectionSpan> = Vec::with_capacity(claimed.len());
    let mut search_cursor = 0usize;

    for error in claimed {
        let token = error
            .original
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());

        let range = match token.and_then(|t| find_ignore_ascii_case(text, t, search_cursor)) {
            Some((start, end)) => {
                search_cursor = end;
                Some((start, end))
            }
            None => clamp_claimed_range(text, error.start, error.end),
        };

        if let Some((start, end)) = range {
            spans.push(CorrectionSpan {
                start,
                end,
                token: text[start..end].to_string(),
                suggestion: error.suggestion.clone(),
            });
        }
    }

    spans.sort_by_key(|s| s.start);

    // First-wins overlap removal over the sorted list.
    let mut last_end = 0usize;
    spans.retain(|span| {
        if span.start >= last_end {
            last_end = span.end;
            true
        } else {
            false
        }
    });

    spans
}

/// ASCII-case-insensitive substring search starting at `from`.
///
/// Matching is byte-wise with `eq_ignore_ascii_case`, so non-ASCII bytes
/// must match exactly and any hit starts and ends on `char` boundaries.
fn find_ignore_ascii_case(haystack: &str, needle: &str, from: usize) -> Option<(usize, usize)> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() || from > h.len() || h.len() - from < n.len() {
        return None;
    }

    for i in from..=(h.len() - n.len()) {
        if haystack.is_char_boundary(i) && h[i..i + n.len()].eq_ignore_ascii_case(n) {
            return Some((i, i + n.len()));
        }
    }
    None
}

/// Clamp and repair a claimed offset range.
///
/// Both offsets are clamped to `[0, len]` and snapped to `char` boundaries
/// (start down, end up).  An inverted range collapses to empty and, like an
/// explicitly empty range, is extended by one character when possible as a
/// last-resort non-empty span.  Returns `None` when no usable range remains
/// or when neither offset was claimed at all.
fn clamp_claimed_range(text: &str, start: Option<i64>, end: Option<i64>) -> Option<(usize, usize)> {
    if start.is_none() && end.is_none() {
        return None;
    }

    let len = text.len();
    let raw_start = start.unwrap_or(0).clamp(0, len as i64) as usize;
    // A missing end defaults to the claimed start (empty range, repaired below).
    let raw_end = end.unwrap_or(raw_start as i64).clamp(0, len as i64) as usize;

    let mut start = raw_start;
    while start > 0 && !text.is_char_boundary(start) {
        start -= 1;
    }

    let mut end = raw_end.max(start);
    while end < len && !text.is_char_boundary(end) {
        end += 1;
    }

    if end == start && start < len {
        // Extend by exactly one character.
        end = start + 1;
        while end < len && !text.is_char_boundary(end) {
            end += 1;
        }
    }

    if start < end {
        Some((start, end))
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
