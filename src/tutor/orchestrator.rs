//! Tutor orchestrator — composes failover, extraction and reconciliation.
//!
//! [`TutorOrchestrator`] exposes the two operations the rest of the
//! application consumes:
//!
//! * [`ask`](TutorOrchestrator::ask) — one conversational turn, plus the
//!   best-effort grammar-analysis side channel and a learning event.
//! * [`check_grammar`](TutorOrchestrator::check_grammar) — turn a learner
//!   sentence into a corrected rendition with renderable error spans.
//!
//! Nothing here is fatal: the worst-case outcome of any failure is a plain,
//! unannotated reply.  Callers are responsible for off-thread invocation;
//! both operations only block on the providers' own timeouts.

use std::sync::Arc;
use std::time::Duration;

use crate::analysis::{extract, parse_correction_report, reconcile, CorrectionSpan, GrammarAnalysis};
use crate::config::TutorConfig;
use crate::provider::FailoverController;
use crate::tutor::events::{EventSink, LearningEventPayload, EVENT_KIND_TUTOR_INTERACTION};
use crate::tutor::prompt::PromptBuilder;

// ---------------------------------------------------------------------------
// Error-marker convention
// ---------------------------------------------------------------------------

/// Reserved prefix marking a reply that is an error report, not tutor
/// content.  Callers must detect it with [`is_error_reply`] and must not
/// persist or render it as a normal reply.
pub const ERROR_MARKER: &str = "[tutor-error]";

/// `true` when `reply` is an error report produced by this orchestrator.
pub fn is_error_reply(reply: &str) -> bool {
    reply.starts_with(ERROR_MARKER)
}

// ---------------------------------------------------------------------------
// GrammarCheck
// ---------------------------------------------------------------------------

/// Result of a grammar check, ready to render.
///
/// `spans` index into `original` and are sorted and non-overlapping; an
/// empty list means "render the text unannotated".
#[derive(Debug, Clone)]
pub struct GrammarCheck {
    /// The learner sentence, unchanged.
    pub original: String,
    /// The model's corrected rendition, or `original` when unavailable.
    pub corrected: String,
    /// Reconciled error spans into `original`.
    pub spans: Vec<CorrectionSpan>,
}

impl GrammarCheck {
    /// The degraded "no corrections found" result for `text`.
    fn unannotated(text: &str) -> Self {
        Self {
            original: text.to_string(),
            corrected: text.to_string(),
            spans: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// TutorOrchestrator
// ---------------------------------------------------------------------------

/// Composes the provider layer and the analysis layer into the tutor API.
pub struct TutorOrchestrator {
    failover: FailoverController,
    prompts: PromptBuilder,
    sink: Option<Arc<dyn EventSink>>,
    chat_timeout: Duration,
    analysis_timeout: Duration,
}

impl TutorOrchestrator {
    /// Create an orchestrator over an already-built failover controller.
    pub fn new(
        failover: FailoverController,
        chat_timeout: Duration,
        analysis_timeout: Duration,
    ) -> Self {
        Self {
            failover,
            prompts: PromptBuilder::new(),
            sink: None,
            chat_timeout,
            analysis_timeout,
        }
    }

    /// Build providers, limiter and timeouts from config.
    pub fn from_config(config: &TutorConfig) -> Self {
        Self::new(
            FailoverController::from_config(config),
            Duration::from_secs(config.timeouts.chat_secs),
            Duration::from_secs(config.timeouts.analysis_secs),
        )
    }

    /// Attach a persistence sink for learning events.
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// One conversational turn.
    ///
    /// `context` holds recent learner sentences from the memory
    /// collaborator.  On provider failure the returned string starts with
    /// [`ERROR_MARKER`]; otherwise it is the tutor reply.  The grammar
    /// analysis and the learning event are best-effort and never affect the
    /// returned reply.
    pub async fn ask(&self, text: &str, context: &[String], session_id: Option<i64>) -> String {
        let prompt = self.prompts.tutor_prompt(context, text);

        let reply = match self.failover.call(&prompt, self.chat_timeout).await {
            Ok(generation) => {
                log::debug!("tutor reply from '{}'", generation.provider_used);
                generation.text
            }
            Err(e) => {
                log::warn!("tutor call failed: {e}");
                format!("{ERROR_MARKER} {e}")
            }
        };

        let analysis = if is_error_reply(&reply) {
            None
        } else {
            self.analyse_grammar(text).await
        };

        self.emit_event(text, &reply, analysis.as_ref(), session_id);
        reply
    }

    /// Grammar-check one learner sentence.
    ///
    /// On any failure at any stage — provider, JSON parse, reconciliation —
    /// this degrades to `{original: text, corrected: text, spans: []}`
    /// rather than surfacing an error to the UI.
    pub async fn check_grammar(&self, text: &str) -> GrammarCheck {
        let prompt = self.prompts.correction_prompt(text);

        let generation = match self.failover.call(&prompt, self.analysis_timeout).await {
            Ok(generation) => generation,
            Err(e) => {
                log::warn!("grammar check call failed: {e}");
                return GrammarCheck::unannotated(text);
            }
        };

        let report = match parse_correction_report(&generation.text) {
            Ok(report) => report,
            Err(e) => {
                log::debug!("unusable correction reply: {e}");
                return GrammarCheck::unannotated(text);
            }
        };

        let corrected = report
            .corrected_sentence
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| text.to_string());

        GrammarCheck {
            original: text.to_string(),
            corrected,
            spans: reconcile(text, &report.errors),
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// The grammar-analysis side channel.  Every failure collapses to `None`.
    async fn analyse_grammar(&self, text: &str) -> Option<GrammarAnalysis> {
        let prompt = self.prompts.analysis_prompt(text);
        let generation = self
            .failover
            .call(&prompt, self.analysis_timeout)
            .await
            .ok()?;

        match extract(&generation.text) {
            Ok(analysis) if !analysis.is_empty() => Some(analysis),
            Ok(_) => None,
            Err(e) => {
                log::debug!("no grammar analysis: {e}");
                None
            }
        }
    }

    fn emit_event(
        &self,
        input: &str,
        reply: &str,
        analysis: Option<&GrammarAnalysis>,
        session_id: Option<i64>,
    ) {
        let Some(sink) = &self.sink else {
            return;
        };
        let payload = LearningEventPayload::new(input, reply, analysis);
        if let Err(e) = sink.record(EVENT_KIND_TUTOR_INTERACTION, &payload, session_id) {
            log::warn!("failed to record learning event: {e}");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
