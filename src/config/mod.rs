//! Configuration module for Lingo Tutor.
//!
//! Provides `TutorConfig` (top-level settings), per-provider entries in
//! priority order, `AppPaths` for cross-platform data directories, and TOML
//! persistence via `TutorConfig::load` / `TutorConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{FailoverConfig, ProviderConfig, ProviderKind, TimeoutConfig, TutorConfig};
