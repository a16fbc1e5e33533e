// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic on-disk persistence for the Adaptive Delay Tracker's per-provider
//! state, `{dataDir}/.ntm/rate_limits.json` (spec §6): `{ state: {
//! <provider>: ProviderState }, history: { <provider>: [RateLimitEvent] } }`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use ntm_core::delay::ProviderState;
use ntm_core::provider::Provider;

/// One recorded rate-limit episode, kept for the persisted history list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitEvent {
    pub detected_at_epoch_ms: u64,
    pub delay_before_ms: u64,
    pub delay_after_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistedDelayState {
    #[serde(default)]
    pub state: HashMap<Provider, ProviderState>,
    #[serde(default)]
    pub history: HashMap<Provider, Vec<RateLimitEvent>>,
}

impl PersistedDelayState {
    pub fn record_rate_limit(&mut self, provider: Provider, event: RateLimitEvent) {
        self.history.entry(provider).or_default().push(event);
    }
}

/// Loads persisted delay state from `path`. A missing file is not an error:
/// callers start from `PersistedDelayState::default()`.
pub fn load(path: &Path) -> anyhow::Result<PersistedDelayState> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(serde_json::from_str(&contents)?),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(PersistedDelayState::default()),
        Err(err) => Err(err.into()),
    }
}

/// Saves persisted delay state atomically: write to a sibling temp file,
/// then rename over `path`.
pub fn save(path: &Path, state: &PersistedDelayState) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    let tmp_path = tmp_path_for(path);
    std::fs::write(&tmp_path, json)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

#[cfg(test)]
#[path = "delay_store_tests.rs"]
mod tests;
