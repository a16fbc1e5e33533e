// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pane Lifecycle Controller (spec §4.8, component C7): sequence `cd` +
//! launch per pane, respecting stagger.

use std::sync::Arc;
use std::time::Duration;

use crate::launch::LaunchCommandBuilder;
use crate::mux::MuxDriver;
use crate::pane::PaneTarget;
use crate::plan::{PaneSpec, SessionSpec, SwarmPlan};

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub cd_delay: Duration,
    pub stagger_delay: Duration,
    pub validate_paths: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self { cd_delay: Duration::from_millis(100), stagger_delay: Duration::from_millis(300), validate_paths: true }
    }
}

#[derive(Debug, Clone)]
pub struct LaunchOutcome {
    pub pane_target: PaneTarget,
    pub success: bool,
    pub error: Option<String>,
}

pub struct Controller<M: MuxDriver> {
    mux: Arc<M>,
    launcher: LaunchCommandBuilder<M>,
    config: ControllerConfig,
}

impl<M: MuxDriver> Controller<M> {
    pub fn new(mux: Arc<M>, launcher: LaunchCommandBuilder<M>, config: ControllerConfig) -> Self {
        Self { mux, launcher, config }
    }

    /// Launch one pane: `cd "{project}"` + enter, wait `cd_delay`, then the
    /// agent's launch command. Path validation (if enabled) aborts only
    /// this pane with a clear error.
    pub async fn launch_pane(&self, session: &str, pane: &PaneSpec) -> LaunchOutcome {
        let target = PaneTarget::new(session, pane.index);

        if self.config.validate_paths && !pane.project_path.is_dir() {
            return LaunchOutcome {
                pane_target: target,
                success: false,
                error: Some(format!("project path does not exist: {}", pane.project_path.display())),
            };
        }

        let result = self.launch_pane_inner(&target, pane).await;
        LaunchOutcome { pane_target: target, success: result.is_ok(), error: result.err().map(|e| e.to_string()) }
    }

    async fn launch_pane_inner(&self, target: &PaneTarget, pane: &PaneSpec) -> anyhow::Result<()> {
        let cd_command = format!("cd {:?}", pane.project_path);
        self.mux.send_keys(target, &cd_command, true).await?;
        tokio::time::sleep(self.config.cd_delay).await;

        let launch_command = self.launcher.build(&pane.project_path, pane.agent_type)?;
        self.mux.send_keys(target, &launch_command, true).await?;
        Ok(())
    }

    /// Launch every pane in `session` in index order, separated by the
    /// configured stagger.
    pub async fn launch_session(&self, session: &SessionSpec) -> Vec<LaunchOutcome> {
        let mut outcomes = Vec::with_capacity(session.panes.len());
        for (i, pane) in session.panes.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.config.stagger_delay).await;
            }
            outcomes.push(self.launch_pane(&session.name, pane).await);
        }
        outcomes
    }

    /// Launch every session in the plan, in declared order.
    pub async fn launch_swarm(&self, plan: &SwarmPlan) -> Vec<LaunchOutcome> {
        let mut outcomes = Vec::new();
        for session in &plan.sessions {
            outcomes.extend(self.launch_session(session).await);
        }
        outcomes
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
