//! Structured extraction of grammar analysis from free-form model output.
//!
//! Providers are asked to answer with a bare JSON object, but in practice
//! wrap it in a Markdown code fence, mis-case category names, or return
//! something that is not JSON at all.  [`extract`] tolerates all of that:
//! every failure becomes a value the caller maps to "no analysis", because
//! this sits on a best-effort side channel that must never break the main
//! conversational flow.

use serde::Serialize;
use thiserror::Error;

use super::truncate_chars;

/// Maximum length of a validated `short_comment`, in characters.
const MAX_COMMENT_CHARS: usize = 120;

// ---------------------------------------------------------------------------
// GrammarCategory
// ---------------------------------------------------------------------------

/// Closed vocabulary of grammar/vocabulary areas the tutor tracks.
///
/// Model output is normalized (lower-cased, spaces to underscores) and
/// matched against this list; anything else is dropped silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GrammarCategory {
    VerbTense,
    SubjectVerbAgreement,
    Articles,
    Prepositions,
    WordOrder,
    PluralSingular,
    Pronouns,
    VocabularyChoice,
    Spelling,
    Punctuation,
    Other,
}

impl GrammarCategory {
    /// Every category, in the order presented to the model.
    pub const ALL: [GrammarCategory; 11] = [
        GrammarCategory::VerbTense,
        GrammarCategory::SubjectVerbAgreement,
        GrammarCategory::Articles,
        GrammarCategory::Prepositions,
        GrammarCategory::WordOrder,
        GrammarCategory::PluralSingular,
        GrammarCategory::Pronouns,
        GrammarCategory::VocabularyChoice,
        GrammarCategory::Spelling,
        GrammarCategory::Punctuation,
        GrammarCategory::Other,
    ];

    /// Stable snake_case name, as used in prompts and event payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            GrammarCategory::VerbTense => "verb_tense",
            GrammarCategory::SubjectVerbAgreement => "subject_verb_agreement",
            GrammarCategory::Articles => "articles",
            GrammarCategory::Prepositions => "prepositions",
            GrammarCategory::WordOrder => "word_order",
            GrammarCategory::PluralSingular => "plural_singular",
            GrammarCategory::Pronouns => "pronouns",
            GrammarCategory::VocabularyChoice => "vocabulary_choice",
            GrammarCategory::Spelling => "spelling",
            GrammarCategory::Punctuation => "punctuation",
            GrammarCategory::Other => "other",
        }
    }

    /// Parse an already-normalized (snake_case) name.
    fn parse_normalized(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == s)
    }
}

impl std::fmt::Display for GrammarCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// GrammarAnalysis / ExtractError
// ---------------------------------------------------------------------------

/// Validated grammar analysis for one learner turn.
///
/// Either field may be absent; an analysis with neither is a valid
/// "no signal" result, not a failure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GrammarAnalysis {
    /// Relevant categories, de-duplicated, in first-seen order.
    pub categories: Vec<GrammarCategory>,
    /// Short free-text comment, trimmed, at most 120 characters.
    pub comment: Option<String>,
}

impl GrammarAnalysis {
    /// `true` when the model produced no usable signal at all.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.comment.is_none()
    }
}

/// Why a raw reply yielded no analysis.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The (de-fenced) reply was not valid JSON.
    #[error("reply is not valid JSON: {0}")]
    MalformedJson(String),

    /// The reply parsed, but the top-level value is not an object.
    #[error("reply JSON is not an object")]
    NotAnObject,
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Strip a single wrapping Markdown code fence, if present.
///
/// Removes the first line when it starts with ``` (including a language tag
/// like ```` ```json ````) and the last line when it starts with ```, keeping
/// the interior as-is.  Text without a leading fence is returned unchanged
/// apart from trimming.
pub fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }

    let mut lines: Vec<&str> = trimmed.lines().collect();
    if lines.len() >= 2 && lines[0].starts_with("```") {
        lines.remove(0);
    }
    if lines.last().is_some_and(|l| l.starts_with("```")) {
        lines.pop();
    }
    lines.join("\n").trim().to_string()
}

/// Parse and validate a grammar-analysis reply.
///
/// Both `grammar_categories` (string or array of strings) and
/// `short_comment` are optional; whatever validates is kept, the rest is
/// dropped without error.
pub fn extract(raw: &str) -> Result<GrammarAnalysis, ExtractError> {
    let cleaned = strip_code_fence(raw);
    let value: serde_json::Value =
        serde_json::from_str(&cleaned).map_err(|e| ExtractError::MalformedJson(e.to_string()))?;
    let obj = value.as_object().ok_or(ExtractError::NotAnObject)?;

    let categories = normalize_categories(obj.get("grammar_categories"));

    let comment = obj
        .get("short_comment")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| truncate_chars(s, MAX_COMMENT_CHARS).to_string());

    Ok(GrammarAnalysis {
        categories,
        comment,
    })
}

/// Normalize the `grammar_categories` field.
///
/// Accepts a single string or a list of strings; lower-cases, converts
/// spaces to underscores, keeps only known category names, and de-duplicates
/// while preserving first-seen order.
fn normalize_categories(value: Option<&serde_json::Value>) -> Vec<GrammarCategory> {
    let raw: Vec<&str> = match value {
        Some(serde_json::Value::String(s)) => vec![s.as_str()],
        Some(serde_json::Value::Array(items)) => {
            items.iter().filter_map(|v| v.as_str()).collect()
        }
        _ => Vec::new(),
    };

    let mut out = Vec::new();
    for name in raw {
        let normalized = name.trim().to_lowercase().replace(' ', "_");
        if let Some(category) = GrammarCategory::parse_normalized(&normalized) {
            if !out.contains(&category) {
                out.push(category);
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_and_unfenced_json_extract_identically() {
        let bare = r#"{"grammar_categories":["verb_tense"],"short_comment":"ok"}"#;
        let fenced = format!("```json\n{bare}\n```");

        let from_bare = extract(bare).unwrap();
        let from_fenced = extract(&fenced).unwrap();

        assert_eq!(from_bare, from_fenced);
        assert_eq!(from_bare.categories, vec![GrammarCategory::VerbTense]);
        assert_eq!(from_bare.comment.as_deref(), Some("ok"));
    }

    #[test]
    fn fence_without_language_tag_is_stripped() {
        let raw = "```\n{\"short_comment\": \"fine\"}\n```";
        let analysis = extract(raw).unwrap();
        assert_eq!(analysis.comment.as_deref(), Some("fine"));
    }

    #[test]
    fn non_json_garbage_is_an_error_not_a_panic() {
        assert!(matches!(
            extract("Sure! Here is my analysis of your sentence…"),
            Err(ExtractError::MalformedJson(_))
        ));
        assert!(matches!(extract(""), Err(ExtractError::MalformedJson(_))));
    }

    #[test]
    fn top_level_array_is_rejected() {
        assert!(matches!(
            extract(r#"["verb_tense"]"#),
            Err(ExtractError::NotAnObject)
        ));
    }

    #[test]
    fn single_string_category_is_accepted() {
        let analysis = extract(r#"{"grammar_categories": "spelling"}"#).unwrap();
        assert_eq!(analysis.categories, vec![GrammarCategory::Spelling]);
        assert_eq!(analysis.comment, None);
    }

    #[test]
    fn categories_are_case_and_space_normalized() {
        let analysis = extract(
            r#"{"grammar_categories": ["Verb Tense", "SUBJECT VERB AGREEMENT", " articles "]}"#,
        )
        .unwrap();
        assert_eq!(
            analysis.categories,
            vec![
                GrammarCategory::VerbTense,
                GrammarCategory::SubjectVerbAgreement,
                GrammarCategory::Articles,
            ]
        );
    }

    #[test]
    fn unknown_categories_are_dropped_silently() {
        let analysis = extract(
            r#"{"grammar_categories": ["verb_tense", "emoji_usage", 42, "prepositions"]}"#,
        )
        .unwrap();
        assert_eq!(
            analysis.categories,
            vec![GrammarCategory::VerbTense, GrammarCategory::Prepositions]
        );
    }

    #[test]
    fn duplicates_keep_first_seen_order() {
        let analysis = extract(
            r#"{"grammar_categories": ["spelling", "verb_tense", "spelling", "verb tense"]}"#,
        )
        .unwrap();
        assert_eq!(
            analysis.categories,
            vec![GrammarCategory::Spelling, GrammarCategory::VerbTense]
        );
    }

    #[test]
    fn comment_is_trimmed_and_truncated_at_char_boundaries() {
        let long = "é".repeat(200);
        let raw = format!(r#"{{"short_comment": "  {long}  "}}"#);
        let analysis = extract(&raw).unwrap();
        let comment = analysis.comment.unwrap();
        assert_eq!(comment.chars().count(), 120);
        assert!(comment.chars().all(|c| c == 'é'));
    }

    #[test]
    fn blank_comment_is_dropped() {
        let analysis = extract(r#"{"short_comment": "   "}"#).unwrap();
        assert_eq!(analysis.comment, None);

        let analysis = extract(r#"{"short_comment": 7}"#).unwrap();
        assert_eq!(analysis.comment, None);
    }

    #[test]
    fn empty_object_is_a_valid_no_signal_result() {
        let analysis = extract("{}").unwrap();
        assert!(analysis.is_empty());
    }

    #[test]
    fn category_serializes_as_snake_case() {
        let json = serde_json::to_string(&GrammarCategory::SubjectVerbAgreement).unwrap();
        assert_eq!(json, "\"subject_verb_agreement\"");
    }
}
