//! Lingo Tutor — resilient text-generation orchestration for language
//! tutoring.
//!
//! This crate brokers conversations between a learner and one or more
//! remote text-generation providers, and turns their free-form output into
//! structured learning signals:
//!
//! * [`provider`] — interchangeable backend adapters behind one
//!   [`TextProvider`](provider::TextProvider) trait, a shared
//!   [`RateLimiter`](provider::RateLimiter), and a
//!   [`FailoverController`](provider::FailoverController) that demotes
//!   failing backends and promotes them back on success.
//! * [`analysis`] — tolerant extraction of the grammar-category and
//!   correction JSON schemas, plus span reconciliation that anchors
//!   unreliable model-claimed offsets to the real input text.
//! * [`tutor`] — the [`TutorOrchestrator`](tutor::TutorOrchestrator)
//!   composing it all into `ask` and `check_grammar`.
//! * [`config`] — TOML settings with the provider list in priority order.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use lingo_tutor::config::TutorConfig;
//! use lingo_tutor::tutor::{is_error_reply, TutorOrchestrator};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = TutorConfig::load().unwrap();
//!     let tutor = TutorOrchestrator::from_config(&config);
//!
//!     let reply = tutor.ask("I goed to school", &[], None).await;
//!     if !is_error_reply(&reply) {
//!         println!("{reply}");
//!     }
//!
//!     let check = tutor.check_grammar("I goed to school").await;
//!     for span in &check.spans {
//!         println!("{} -> {}", span.token, span.suggestion);
//!     }
//! }
//! ```

pub mod analysis;
pub mod config;
pub mod provider;
pub mod tutor;
