// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Adaptive Delay Tracker (spec §4.7, component C12): per-provider
//! success/limit history, exposing a recommended inter-send delay.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::provider::Provider;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProviderState {
    pub current_delay_ms: u64,
    pub min_delay_ms: u64,
    pub consecutive_successes: u32,
    pub total_successes: u64,
    pub total_rate_limits: u64,
}

impl ProviderState {
    fn new(default_delay_ms: u64, min_delay_ms: u64) -> Self {
        Self { current_delay_ms: default_delay_ms, min_delay_ms, consecutive_successes: 0, total_successes: 0, total_rate_limits: 0 }
    }

    pub fn current_delay(&self) -> Duration {
        Duration::from_millis(self.current_delay_ms)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ProviderDefaults {
    pub default_delay_ms: u64,
    pub min_delay_ms: u64,
}

#[derive(Debug, Clone)]
pub struct DelayTrackerConfig {
    pub decay_after_consecutive_successes: u32,
    pub defaults: HashMap<Provider, ProviderDefaults>,
}

impl Default for DelayTrackerConfig {
    fn default() -> Self {
        let mut defaults = HashMap::new();
        defaults.insert(Provider::Anthropic, ProviderDefaults { default_delay_ms: 15_000, min_delay_ms: 5_000 });
        defaults.insert(Provider::OpenAi, ProviderDefaults { default_delay_ms: 10_000, min_delay_ms: 3_000 });
        defaults.insert(Provider::Google, ProviderDefaults { default_delay_ms: 8_000, min_delay_ms: 2_000 });
        Self { decay_after_consecutive_successes: 10, defaults }
    }
}

pub struct DelayTracker {
    config: DelayTrackerConfig,
    state: RwLock<HashMap<Provider, ProviderState>>,
}

impl DelayTracker {
    pub fn new(config: DelayTrackerConfig) -> Self {
        Self { config, state: RwLock::new(HashMap::new()) }
    }

    async fn state_for(&self, provider: Provider) -> ProviderState {
        if let Some(state) = self.state.read().await.get(&provider) {
            return *state;
        }
        let defaults = self.config.defaults.get(&provider).copied().unwrap_or(ProviderDefaults { default_delay_ms: 10_000, min_delay_ms: 3_000 });
        let state = ProviderState::new(defaults.default_delay_ms, defaults.min_delay_ms);
        self.state.write().await.insert(provider, state);
        state
    }

    pub async fn record_success(&self, provider: Provider) {
        let mut state = self.state_for(provider).await;
        state.total_successes += 1;
        state.consecutive_successes += 1;

        if state.consecutive_successes >= self.config.decay_after_consecutive_successes {
            let decayed = (state.current_delay_ms as f64 * 0.9) as u64;
            state.current_delay_ms = decayed.max(state.min_delay_ms);
            state.consecutive_successes = 0;
        }

        self.state.write().await.insert(provider, state);
    }

    pub async fn record_rate_limit(&self, provider: Provider) {
        let mut state = self.state_for(provider).await;
        state.total_rate_limits += 1;
        state.current_delay_ms = ((state.current_delay_ms as f64) * 1.5) as u64;
        state.consecutive_successes = 0;
        self.state.write().await.insert(provider, state);
    }

    pub async fn optimal_delay(&self, provider: Provider) -> Duration {
        self.state_for(provider).await.current_delay()
    }

    pub async fn snapshot(&self, provider: Provider) -> ProviderState {
        self.state_for(provider).await
    }

    /// All known provider states, for persistence.
    pub async fn all_states(&self) -> HashMap<Provider, ProviderState> {
        self.state.read().await.clone()
    }

    /// Seed the tracker from previously persisted state (e.g. on startup).
    pub async fn restore(&self, states: HashMap<Provider, ProviderState>) {
        *self.state.write().await = states;
    }
}

#[cfg(test)]
#[path = "delay_tests.rs"]
mod tests;
