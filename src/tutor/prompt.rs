//! Prompt builder for the tutor conversation and its side channels.
//!
//! [`PromptBuilder`] constructs three kinds of prompts:
//! * **Tutor** (`tutor_prompt`) — the main conversational turn, optionally
//!   seeded with recent learner sentences for retrieval practice.
//! * **Analysis** (`analysis_prompt`) — asks for the category-schema JSON
//!   (`grammar_categories` + `short_comment`).
//! * **Correction** (`correction_prompt`) — asks for the correction-schema
//!   JSON (`corrected_sentence` + `errors`).

use crate::analysis::GrammarCategory;

// ---------------------------------------------------------------------------
// System instructions
// ---------------------------------------------------------------------------

/// Used when no learning context is available (fresh learner).
const TUTOR_INSTRUCTION_FRESH: &str = "\
You are an AI language tutor. \
Explain grammar and vocabulary clearly, give examples, \
and keep a friendly, encouraging tone.";

const TUTOR_CONTEXT_HEADER: &str = "\
You are an AI language tutor having an ongoing relationship with the learner.
Previously, the user produced sentences like:";

const TUTOR_CONTEXT_FOOTER: &str = "\
When answering now, do the following:
- Re-use similar vocabulary or grammar structures occasionally to create retrieval practice.
- Briefly remind important rules if the current message is related.
- Keep the tone supportive and help the learner build long-term memory.";

// ---------------------------------------------------------------------------
// PromptBuilder
// ---------------------------------------------------------------------------

/// Builds tutor, analysis and correction prompts.
///
/// # Example
/// ```rust
/// use lingo_tutor::tutor::PromptBuilder;
///
/// let builder = PromptBuilder::new();
/// let prompt = builder.tutor_prompt(&[], "How do I use articles?");
/// assert!(prompt.contains("Current user message:"));
/// ```
#[derive(Debug, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build the main conversational prompt.
    ///
    /// `context` holds recent learner sentences supplied by the memory
    /// collaborator; duplicates and blank entries are dropped.  With no
    /// usable context the fresh-learner instruction is used instead.
    pub fn tutor_prompt(&self, context: &[String], text: &str) -> String {
        let mut sentences: Vec<&str> = Vec::new();
        for sentence in context {
            let s = sentence.trim();
            if !s.is_empty() && !sentences.contains(&s) {
                sentences.push(s);
            }
        }

        let mut prompt = String::with_capacity(1024);
        if sentences.is_empty() {
            prompt.push_str(TUTOR_INSTRUCTION_FRESH);
        } else {
            prompt.push_str(TUTOR_CONTEXT_HEADER);
            prompt.push('\n');
            for sentence in &sentences {
                prompt.push_str("- ");
                prompt.push_str(sentence);
                prompt.push('\n');
            }
            prompt.push('\n');
            prompt.push_str(TUTOR_CONTEXT_FOOTER);
        }

        prompt.push_str("\n\nCurrent user message:\n");
        prompt.push_str(text);
        prompt
    }

    /// Build the grammar-category analysis prompt (category schema).
    pub fn analysis_prompt(&self, text: &str) -> String {
        let categories = GrammarCategory::ALL
            .iter()
            .map(|c| format!("\"{c}\""))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "You are an English teacher.\n\
             Analyse the learner sentence below and decide which grammar/vocabulary areas \
             are most relevant.\n\n\
             Learner sentence: \"{text}\"\n\n\
             Return ONLY a JSON object with two keys:\n\
             \u{20}\u{20}\"grammar_categories\": an array of 1-3 items chosen ONLY from this list:\n\
             [{categories}]\n\
             \u{20}\u{20}\"short_comment\": a very short English comment (max 80 characters) about the main issue.\n\n\
             Example JSON:\n\
             {{\"grammar_categories\": [\"verb_tense\", \"prepositions\"], \
             \"short_comment\": \"Past tense and preposition choice need review.\"}}"
        )
    }

    /// Build the grammar-correction prompt (correction schema).
    pub fn correction_prompt(&self, text: &str) -> String {
        format!(
            "You are an English grammar checker.\n\
             Check the learner sentence below and correct it if needed.\n\n\
             Sentence: \"{text}\"\n\n\
             Return ONLY a JSON object with three keys:\n\
             \u{20}\u{20}\"original_sentence\": the sentence exactly as given.\n\
             \u{20}\u{20}\"corrected_sentence\": the corrected sentence (the original if already correct).\n\
             \u{20}\u{20}\"errors\": an array with one item per mistake, each containing:\n\
             \u{20}\u{20}\u{20}\u{20}\"original\": the exact wrong words copied verbatim from the sentence,\n\
             \u{20}\u{20}\u{20}\u{20}\"suggestion\": the replacement text,\n\
             \u{20}\u{20}\u{20}\u{20}\"start\" and \"end\": character offsets of the wrong words.\n\n\
             If the sentence is already correct, return an empty errors array."
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
