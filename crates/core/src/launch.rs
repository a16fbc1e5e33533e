// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Launch Command Builder (spec §2, component C6): produce the shell
//! command that starts a given agent type.

use std::collections::HashMap;
use std::path::Path;

use crate::agent::AgentType;
use crate::mux::MuxDriver;

#[derive(Debug, Clone)]
pub struct LaunchConfig {
    /// Per-agent-type launch command override; falls back to the agent's
    /// launch token (`cc`, `cod`, `gmi`) when absent.
    pub command_overrides: HashMap<AgentType, String>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self { command_overrides: HashMap::new() }
    }
}

pub struct LaunchCommandBuilder<M: MuxDriver> {
    mux: std::sync::Arc<M>,
    config: LaunchConfig,
}

impl<M: MuxDriver> LaunchCommandBuilder<M> {
    pub fn new(mux: std::sync::Arc<M>, config: LaunchConfig) -> Self {
        Self { mux, config }
    }

    pub fn build(&self, project_dir: &Path, agent_type: AgentType) -> anyhow::Result<String> {
        let command = self.config.command_overrides.get(&agent_type).map(String::as_str).unwrap_or_else(|| agent_type.token());
        self.mux.build_pane_command(project_dir, command)
    }
}

#[cfg(test)]
#[path = "launch_tests.rs"]
mod tests;
