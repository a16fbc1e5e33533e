// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concrete [`BeadCounter`] backed by the external `bd` CLI: `bd list
//! --status open --json`, working directory set to the project (spec §6).

use std::path::Path;
use std::time::Duration;

use ntm_core::bead::{BeadCount, BeadCounter};
use ntm_core::error::NtmError;
use ntm_core::mux::BoxFuture;

pub struct BeadCliCounter {
    timeout: Duration,
}

impl BeadCliCounter {
    pub fn new() -> Self {
        Self { timeout: Duration::from_secs(5) }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for BeadCliCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl BeadCounter for BeadCliCounter {
    fn count_open<'a>(&'a self, project_dir: &'a Path) -> BoxFuture<'a, anyhow::Result<BeadCount>> {
        Box::pin(async move {
            let mut cmd = tokio::process::Command::new("bd");
            cmd.args(["list", "--status", "open", "--json"]).current_dir(project_dir);

            let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
                Ok(Ok(output)) => output,
                Ok(Err(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                    tracing::debug!("bd CLI not found on PATH; treating as 0 open beads");
                    return Ok(BeadCount::zero());
                }
                Ok(Err(err)) => return Err(err.into()),
                Err(_elapsed) => {
                    return Err(NtmError::TransientExternal { component: "bd", detail: "bd list timed out".to_owned() }.into())
                }
            };

            if !output.status.success() {
                tracing::debug!(project = %project_dir.display(), "bd list exited non-zero; treating as 0");
                return Ok(BeadCount::zero());
            }

            Ok(parse_count(&output.stdout))
        })
    }
}

fn parse_count(stdout: &[u8]) -> BeadCount {
    let text = String::from_utf8_lossy(stdout);
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return BeadCount::zero();
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Array(items)) => BeadCount::ok(items.len() as u64),
        Ok(serde_json::Value::Null) => BeadCount::zero(),
        Ok(_) | Err(_) => BeadCount::malformed(),
    }
}

#[cfg(test)]
#[path = "bead_cli_tests.rs"]
mod tests;
