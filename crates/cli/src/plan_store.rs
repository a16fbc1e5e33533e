// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic on-disk persistence of the most recently produced [`SwarmPlan`],
//! so `swarm launch`/`swarm stop` can act on `swarm plan`'s output without
//! re-scanning.

use std::path::Path;

use ntm_core::error::NtmError;
use ntm_core::plan::SwarmPlan;

/// Loads the persisted plan. Returns an error (not a default) when absent,
/// since `launch`/`stop` without a prior `plan` is a usage error.
pub fn load(path: &Path) -> anyhow::Result<SwarmPlan> {
    let contents = std::fs::read_to_string(path).map_err(|err| NtmError::FatalConfig {
        detail: format!("no plan found at {} (run `ntm swarm plan` first): {err}", path.display()),
    })?;
    Ok(serde_json::from_str(&contents)?)
}

/// Saves the plan atomically: write a sibling temp file, then rename over
/// `path`.
pub fn save(path: &Path, plan: &SwarmPlan) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(plan)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
#[path = "plan_store_tests.rs"]
mod tests;
