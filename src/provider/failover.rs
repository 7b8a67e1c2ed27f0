//! Provider failover controller.
//!
//! [`FailoverController`] owns the ordered provider list and per-provider
//! consecutive-failure counters.  Selection is strictly priority-ordered
//! (primary-first, never round-robin): the highest-priority provider whose
//! counter is below the configured threshold handles the next call.  A
//! failed call increments the counter and fails over **at most one hop** to
//! the next healthy provider, bounding the latency of a single user-facing
//! call.  Any success resets the provider's counter to zero.
//!
//! Health is process-lifetime state; it is never persisted across restarts.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use thiserror::Error;

use crate::config::TutorConfig;
use crate::provider::client::{build_provider, ProviderError, TextProvider};
use crate::provider::limiter::RateLimiter;

// ---------------------------------------------------------------------------
// Generation / FailoverError
// ---------------------------------------------------------------------------

/// A successful provider reply, tagged with the backend that produced it.
#[derive(Debug, Clone)]
pub struct Generation {
    /// Reply text, as normalized by the provider adapter.
    pub text: String,
    /// Name of the provider that answered.
    pub provider_used: String,
}

/// Failure of a full failover call (both hops, or no candidate at all).
#[derive(Debug, Error)]
pub enum FailoverError {
    /// The provider list is empty.
    #[error("no providers configured")]
    NoProviders,

    /// Every provider is at or over the failure threshold.  The controller
    /// hard-fails instead of burning a timeout cycle on a known-bad backend.
    #[error("all providers are currently unhealthy")]
    AllProvidersUnhealthy,

    /// The last attempted provider failed.
    #[error("provider '{provider}' failed: {source}")]
    CallFailed {
        /// Name of the provider whose failure ended the call.
        provider: String,
        /// The underlying provider error.
        #[source]
        source: ProviderError,
    },
}

// ---------------------------------------------------------------------------
// FailoverController
// ---------------------------------------------------------------------------

/// Routes each call to the healthiest highest-priority provider.
pub struct FailoverController {
    providers: Vec<Arc<dyn TextProvider>>,
    failure_threshold: u32,
    limiter: RateLimiter,
    // Consecutive-failure counter per provider, same order as `providers`.
    // Locked only for the read-check-write, never across a network call.
    health: Mutex<Vec<u32>>,
}

impl FailoverController {
    /// Create a controller over `providers` in priority order (index 0 is
    /// the primary).
    pub fn new(
        providers: Vec<Arc<dyn TextProvider>>,
        failure_threshold: u32,
        limiter: RateLimiter,
    ) -> Self {
        let health = Mutex::new(vec![0; providers.len()]);
        Self {
            providers,
            failure_threshold,
            limiter,
            health,
        }
    }

    /// Build providers and policy from config.
    pub fn from_config(config: &TutorConfig) -> Self {
        let providers = config.providers.iter().map(|p| build_provider(p)).collect();
        let limiter = RateLimiter::new(Duration::from_millis(config.failover.min_interval_ms));
        Self::new(providers, config.failover.failure_threshold, limiter)
    }

    /// Send `prompt` to the current best provider, failing over once.
    pub async fn call(&self, prompt: &str, timeout: Duration) -> Result<Generation, FailoverError> {
        if self.providers.is_empty() {
            return Err(FailoverError::NoProviders);
        }
        let Some(first) = self.pick_candidate(None) else {
            return Err(FailoverError::AllProvidersUnhealthy);
        };

        let first_err = match self.attempt(first, prompt, timeout).await {
            Ok(generation) => return Ok(generation),
            Err(e) => e,
        };

        // One failover hop only: the next healthy provider, excluding the one
        // that just failed.  Cascading through the whole list would stack
        // timeouts into a single user-facing call.
        let Some(second) = self.pick_candidate(Some(first)) else {
            return Err(FailoverError::CallFailed {
                provider: self.providers[first].name().to_string(),
                source: first_err,
            });
        };

        log::warn!(
            "provider '{}' failed ({}), failing over to '{}'",
            self.providers[first].name(),
            first_err,
            self.providers[second].name()
        );

        match self.attempt(second, prompt, timeout).await {
            Ok(generation) => Ok(generation),
            Err(e) => Err(FailoverError::CallFailed {
                provider: self.providers[second].name().to_string(),
                source: e,
            }),
        }
    }

    /// Current consecutive-failure count for the named provider.
    ///
    /// Returns `None` when no provider has that name.
    pub fn consecutive_failures(&self, name: &str) -> Option<u32> {
        let health = self.health.lock().unwrap_or_else(PoisonError::into_inner);
        self.providers
            .iter()
            .position(|p| p.name() == name)
            .map(|idx| health[idx])
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Highest-priority provider below the failure threshold, skipping
    /// `exclude`.  `None` when every eligible provider is unhealthy.
    fn pick_candidate(&self, exclude: Option<usize>) -> Option<usize> {
        let health = self.health.lock().unwrap_or_else(PoisonError::into_inner);
        (0..self.providers.len())
            .find(|&idx| Some(idx) != exclude && health[idx] < self.failure_threshold)
    }

    async fn attempt(
        &self,
        idx: usize,
        prompt: &str,
        timeout: Duration,
    ) -> Result<Generation, ProviderError> {
        self.limiter.wait().await;

        let provider = &self.providers[idx];
        log::debug!("calling provider '{}'", provider.name());

        match provider.generate(prompt, timeout).await {
            Ok(text) => {
                self.record_success(idx);
                Ok(Generation {
                    text,
                    provider_used: provider.name().to_string(),
                })
            }
            Err(e) => {
                self.record_failure(idx);
                Err(e)
            }
        }
    }

    fn record_success(&self, idx: usize) {
        let mut health = self.health.lock().unwrap_or_else(PoisonError::into_inner);
        health[idx] = 0;
    }

    fn record_failure(&self, idx: usize) {
        let mut health = self.health.lock().unwrap_or_else(PoisonError::into_inner);
        health[idx] = health[idx].saturating_add(1);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Replays a script of results, counting calls.  Once the script is
    /// exhausted it keeps returning transport errors.
    struct ScriptedProvider {
        name: String,
        script: Mutex<VecDeque<Result<String, ()>>>,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn new(name: &str, script: Vec<Result<String, ()>>) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                script: Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn always_ok(name: &str, reply: &str) -> Arc<Self> {
            Self::new(name, vec![Ok(reply.to_string()); 16])
        }

        fn always_fails(name: &str) -> Arc<Self> {
            Self::new(name, vec![])
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextProvider for ScriptedProvider {
        fn name(&self) -> &str {
            &self.name
        }

        async fn generate(&self, _prompt: &str, _timeout: Duration) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.script.lock().unwrap().pop_front() {
                Some(Ok(text)) => Ok(text),
                _ => Err(ProviderError::Transport("connection refused".into())),
            }
        }
    }

    fn controller(
        providers: Vec<Arc<ScriptedProvider>>,
        threshold: u32,
    ) -> FailoverController {
        let providers = providers
            .into_iter()
            .map(|p| p as Arc<dyn TextProvider>)
            .collect();
        FailoverController::new(providers, threshold, RateLimiter::new(Duration::ZERO))
    }

    const TIMEOUT: Duration = Duration::from_secs(1);

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn primary_success_tags_provider_and_skips_secondary() {
        let primary = ScriptedProvider::always_ok("primary", "hello");
        let secondary = ScriptedProvider::always_ok("secondary", "unused");
        let ctrl = controller(vec![primary.clone(), secondary.clone()], 2);

        let generation = ctrl.call("hi", TIMEOUT).await.unwrap();
        assert_eq!(generation.text, "hello");
        assert_eq!(generation.provider_used, "primary");
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test]
    async fn single_failure_fails_over_without_demoting_primary() {
        let primary = ScriptedProvider::always_fails("primary");
        let secondary = ScriptedProvider::always_ok("secondary", "backup reply");
        let ctrl = controller(vec![primary.clone(), secondary.clone()], 2);

        let generation = ctrl.call("hi", TIMEOUT).await.unwrap();
        assert_eq!(generation.provider_used, "secondary");
        assert_eq!(primary.calls(), 1);
        // One failure is below the threshold of 2: primary is not yet demoted.
        assert_eq!(ctrl.consecutive_failures("primary"), Some(1));
        assert_eq!(ctrl.consecutive_failures("secondary"), Some(0));
    }

    #[tokio::test]
    async fn primary_is_skipped_after_threshold() {
        let primary = ScriptedProvider::always_fails("primary");
        let secondary = ScriptedProvider::always_ok("secondary", "backup");
        let ctrl = controller(vec![primary.clone(), secondary.clone()], 2);

        // Two calls, each failing over: primary reaches the threshold.
        ctrl.call("a", TIMEOUT).await.unwrap();
        ctrl.call("b", TIMEOUT).await.unwrap();
        assert_eq!(primary.calls(), 2);
        assert_eq!(ctrl.consecutive_failures("primary"), Some(2));

        // Third call must go straight to the secondary.
        let generation = ctrl.call("c", TIMEOUT).await.unwrap();
        assert_eq!(generation.provider_used, "secondary");
        assert_eq!(primary.calls(), 2);
    }

    #[tokio::test]
    async fn success_resets_failure_count() {
        let primary = ScriptedProvider::new(
            "primary",
            vec![Err(()), Ok("recovered".into())],
        );
        let secondary = ScriptedProvider::always_ok("secondary", "backup");
        let ctrl = controller(vec![primary.clone(), secondary], 3);

        ctrl.call("a", TIMEOUT).await.unwrap();
        assert_eq!(ctrl.consecutive_failures("primary"), Some(1));

        let generation = ctrl.call("b", TIMEOUT).await.unwrap();
        assert_eq!(generation.provider_used, "primary");
        assert_eq!(ctrl.consecutive_failures("primary"), Some(0));
    }

    #[tokio::test]
    async fn empty_provider_list_is_a_hard_failure() {
        let ctrl = FailoverController::new(vec![], 2, RateLimiter::new(Duration::ZERO));
        let err = ctrl.call("hi", TIMEOUT).await.unwrap_err();
        assert!(matches!(err, FailoverError::NoProviders));
    }

    #[tokio::test]
    async fn exhausted_providers_hard_fail_without_a_network_call() {
        let only = ScriptedProvider::always_fails("only");
        let ctrl = controller(vec![only.clone()], 1);

        let err = ctrl.call("a", TIMEOUT).await.unwrap_err();
        assert!(matches!(err, FailoverError::CallFailed { .. }));
        assert_eq!(only.calls(), 1);

        // The single provider is now at the threshold: no further attempts.
        let err = ctrl.call("b", TIMEOUT).await.unwrap_err();
        assert!(matches!(err, FailoverError::AllProvidersUnhealthy));
        assert_eq!(only.calls(), 1);
    }

    #[tokio::test]
    async fn at_most_one_failover_hop_per_call() {
        let first = ScriptedProvider::always_fails("first");
        let second = ScriptedProvider::always_fails("second");
        let third = ScriptedProvider::always_ok("third", "never reached");
        let ctrl = controller(vec![first.clone(), second.clone(), third.clone()], 5);

        let err = ctrl.call("hi", TIMEOUT).await.unwrap_err();
        match err {
            FailoverError::CallFailed { provider, .. } => assert_eq!(provider, "second"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 1);
        assert_eq!(third.calls(), 0);
    }

    #[tokio::test]
    async fn lone_provider_failure_reports_its_name() {
        let only = ScriptedProvider::always_fails("only");
        let ctrl = controller(vec![only], 3);

        let err = ctrl.call("hi", TIMEOUT).await.unwrap_err();
        match err {
            FailoverError::CallFailed { provider, .. } => assert_eq!(provider, "only"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
