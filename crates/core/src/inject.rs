// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Prompt Injector (spec §4.6, component C8): send a prompt to a pane with
//! agent-specific enter cadence.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::agent::AgentType;
use crate::delay::DelayTracker;
use crate::mux::MuxDriver;
use crate::pane::PaneTarget;

#[derive(Debug, Clone)]
pub struct InjectorConfig {
    pub double_enter_delay: Duration,
    pub enter_delay: Duration,
    pub stagger_delay: Duration,
    /// When set, stagger between batch targets is taken from
    /// [`DelayTracker::optimal_delay`] for the target's provider instead of
    /// the fixed `stagger_delay` (spec §4.7).
    pub adaptive_stagger: bool,
}

impl Default for InjectorConfig {
    fn default() -> Self {
        Self {
            double_enter_delay: Duration::from_millis(500),
            enter_delay: Duration::from_millis(100),
            stagger_delay: Duration::from_millis(300),
            adaptive_stagger: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InjectResult {
    pub pane_target: PaneTarget,
    pub success: bool,
    pub duration: Duration,
    pub sent_at_epoch_ms: u64,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BatchInjectResult {
    pub results: Vec<InjectResult>,
    pub cancelled_before: Vec<PaneTarget>,
}

pub struct Injector<M: MuxDriver> {
    mux: Arc<M>,
    config: InjectorConfig,
    delay_tracker: Option<Arc<DelayTracker>>,
}

impl<M: MuxDriver> Injector<M> {
    pub fn new(mux: Arc<M>, config: InjectorConfig) -> Self {
        Self { mux, config, delay_tracker: None }
    }

    pub fn with_delay_tracker(mut self, tracker: Arc<DelayTracker>) -> Self {
        self.delay_tracker = Some(tracker);
        self
    }

    /// Send `prompt` to `target`. Claude gets the text plus a single enter;
    /// Codex and Gemini require a double enter separated by
    /// `double_enter_delay` to commit the message.
    pub async fn inject_one(&self, target: &PaneTarget, kind: AgentType, prompt: &str) -> InjectResult {
        let started = Instant::now();
        let outcome = self.send_with_cadence(target, kind, prompt).await;

        if outcome.is_ok() {
            if let (Some(tracker), Some(provider)) = (&self.delay_tracker, crate::provider::Provider::for_agent(kind)) {
                tracker.record_success(provider).await;
            }
        }

        InjectResult {
            pane_target: target.clone(),
            success: outcome.is_ok(),
            duration: started.elapsed(),
            sent_at_epoch_ms: now_epoch_ms(),
            error: outcome.err().map(|e| e.to_string()),
        }
    }

    async fn send_with_cadence(&self, target: &PaneTarget, kind: AgentType, prompt: &str) -> anyhow::Result<()> {
        self.mux.send_keys(target, prompt, false).await?;
        tokio::time::sleep(self.config.enter_delay).await;
        self.mux.send_keys(target, "", true).await?;

        if matches!(kind, AgentType::Codex | AgentType::Gemini) {
            tokio::time::sleep(self.config.double_enter_delay).await;
            self.mux.send_keys(target, "", true).await?;
        }

        Ok(())
    }

    /// Inject to each target in declared order. Cancellation stops before
    /// the next target; already-sent injections are not rolled back.
    pub async fn inject_batch(
        &self,
        targets: &[(PaneTarget, AgentType, String)],
        cancel: CancellationToken,
    ) -> BatchInjectResult {
        let mut results = Vec::with_capacity(targets.len());
        let mut cancelled_before = Vec::new();

        for (i, (target, kind, prompt)) in targets.iter().enumerate() {
            if cancel.is_cancelled() {
                cancelled_before.extend(targets[i..].iter().map(|(t, _, _)| t.clone()));
                break;
            }

            if i > 0 {
                let stagger = self.stagger_for(*kind).await;
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        cancelled_before.extend(targets[i..].iter().map(|(t, _, _)| t.clone()));
                        break;
                    }
                    _ = tokio::time::sleep(stagger) => {}
                }
            }

            results.push(self.inject_one(target, *kind, prompt).await);
        }

        BatchInjectResult { results, cancelled_before }
    }

    async fn stagger_for(&self, kind: AgentType) -> Duration {
        if self.config.adaptive_stagger {
            if let (Some(tracker), Some(provider)) = (&self.delay_tracker, crate::provider::Provider::for_agent(kind)) {
                return tracker.optimal_delay(provider).await;
            }
        }
        self.config.stagger_delay
    }
}

fn now_epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "inject_tests.rs"]
mod tests;
