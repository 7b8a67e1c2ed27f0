//! Parsing of grammar-correction replies (the correction schema).
//!
//! The correction prompt asks for
//! `{original_sentence, corrected_sentence, errors:[{original, suggestion,
//! start, end}]}`.  Every field is tolerated as missing: the claimed offsets
//! in particular come from a generative model and may be absent, negative,
//! or plain wrong — they are reconciled against the real text later.

use serde::Deserialize;

use super::extract::{strip_code_fence, ExtractError};

/// One claimed grammar error, exactly as reported by the model.
///
/// Nothing in here is trusted: `original` may not occur in the sentence and
/// `start`/`end` are frequently stale or off by an offset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClaimedError {
    /// The literal text the model says is wrong.
    #[serde(default, alias = "original_token")]
    pub original: Option<String>,
    /// Replacement text offered by the model.
    #[serde(default)]
    pub suggestion: String,
    /// Claimed start offset into the original sentence.
    #[serde(default)]
    pub start: Option<i64>,
    /// Claimed end offset (exclusive).
    #[serde(default)]
    pub end: Option<i64>,
}

/// A parsed correction reply.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorrectionReport {
    /// Echo of the sentence the model was given.
    #[serde(default)]
    pub original_sentence: Option<String>,
    /// The model's corrected rendition.
    #[serde(default)]
    pub corrected_sentence: Option<String>,
    /// Claimed errors, in the order the model reported them.
    #[serde(default)]
    pub errors: Vec<ClaimedError>,
}

/// Parse a raw correction reply into a [`CorrectionReport`].
///
/// Strips a wrapping code fence first.  Any parse failure is returned as a
/// value; callers degrade to "no corrections found".
pub fn parse_correction_report(raw: &str) -> Result<CorrectionReport, ExtractError> {
    let cleaned = strip_code_fence(raw);
    serde_json::from_str(&cleaned).map_err(|e| ExtractError::MalformedJson(e.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_report() {
        let raw = r#"{
            "original_sentence": "I goed to school",
            "corrected_sentence": "I went to school",
            "errors": [
                {"original": "goed", "suggestion": "went", "start": 2, "end": 6}
            ]
        }"#;

        let report = parse_correction_report(raw).unwrap();
        assert_eq!(report.corrected_sentence.as_deref(), Some("I went to school"));
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].original.as_deref(), Some("goed"));
        assert_eq!(report.errors[0].suggestion, "went");
        assert_eq!(report.errors[0].start, Some(2));
        assert_eq!(report.errors[0].end, Some(6));
    }

    #[test]
    fn fenced_report_parses() {
        let raw = "```json\n{\"corrected_sentence\": \"Fine.\", \"errors\": []}\n```";
        let report = parse_correction_report(raw).unwrap();
        assert_eq!(report.corrected_sentence.as_deref(), Some("Fine."));
        assert!(report.errors.is_empty());
    }

    #[test]
    fn missing_fields_default() {
        let report = parse_correction_report("{}").unwrap();
        assert_eq!(report.original_sentence, None);
        assert_eq!(report.corrected_sentence, None);
        assert!(report.errors.is_empty());

        let report = parse_correction_report(r#"{"errors": [{}]}"#).unwrap();
        assert_eq!(report.errors[0].original, None);
        assert_eq!(report.errors[0].suggestion, "");
        assert_eq!(report.errors[0].start, None);
    }

    #[test]
    fn original_token_alias_is_accepted() {
        let raw = r#"{"errors": [{"original_token": "teh", "suggestion": "the"}]}"#;
        let report = parse_correction_report(raw).unwrap();
        assert_eq!(report.errors[0].original.as_deref(), Some("teh"));
    }

    #[test]
    fn negative_offsets_survive_parsing() {
        // Range repair happens in the reconciler, not here.
        let raw = r#"{"errors": [{"original": "x", "start": -3, "end": -1}]}"#;
        let report = parse_correction_report(raw).unwrap();
        assert_eq!(report.errors[0].start, Some(-3));
        assert_eq!(report.errors[0].end, Some(-1));
    }

    #[test]
    fn garbage_is_an_error_value() {
        assert!(parse_correction_report("I cannot help with that.").is_err());
    }
}
