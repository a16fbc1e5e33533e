// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Top-level command dispatch — shared by `main` and integration tests.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use ntm_core::controller::{Controller, ControllerConfig};
use ntm_core::credential::CredentialRotator;
use ntm_core::delay::{DelayTracker, DelayTrackerConfig};
use ntm_core::error::NtmError;
use ntm_core::inject::{Injector, InjectorConfig};
use ntm_core::launch::{LaunchCommandBuilder, LaunchConfig};
use ntm_core::limit::{spawn_watchers, DetectorConfig};
use ntm_core::pane::PaneTarget;
use ntm_core::parser::ParserConfig;
use ntm_core::plan::{build_plan, PlannerConfig, SwarmPlan};
use ntm_core::provider::Provider;
use ntm_core::respawn::{Respawner, RespawnerConfig};
use ntm_core::scan::{Scanner, ScannerConfig};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::bead_cli::BeadCliCounter;
use crate::config::{config_dir, Cli, Commands, SwarmAction};
use crate::cred_cli::CredCli;
use crate::delay_store;
use crate::plan_store;
use crate::tmux_driver::TmuxDriver;

fn data_dir() -> PathBuf {
    config_dir().join("..").join("ntm-data")
}

fn last_plan_path() -> PathBuf {
    config_dir().join("last_plan.json")
}

fn rate_limits_path() -> PathBuf {
    data_dir().join(".ntm").join("rate_limits.json")
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Swarm { action } => run_swarm(action).await,
        Commands::Rotate { session, pane } => run_rotate(session, *pane).await,
    }
}

async fn run_swarm(action: &SwarmAction) -> anyhow::Result<()> {
    match action {
        SwarmAction::Plan { scan_dir } => run_plan(scan_dir.clone()).await,
        SwarmAction::Launch { stagger_ms } => run_launch(*stagger_ms).await,
        SwarmAction::Stop => run_stop().await,
    }
}

async fn run_plan(scan_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let base_dir = scan_dir.unwrap_or_else(|| PathBuf::from("."));

    let counter = Arc::new(BeadCliCounter::new());
    let scanner = Scanner::new(counter, ScannerConfig::default());
    let cancel = CancellationToken::new();

    let scan_result = scanner.scan(&base_dir, &[], cancel).await?;
    for error in &scan_result.errors {
        tracing::warn!(project = %error.project.display(), error = %error.error, "scan error");
    }
    info!(projects = scan_result.projects.len(), total_beads = scan_result.totals, "scan complete");

    let plan = build_plan(base_dir, scan_result.projects, &PlannerConfig::default())?;
    println!("{}", serde_json::to_string_pretty(&plan)?);
    plan_store::save(&last_plan_path(), &plan)?;
    Ok(())
}

/// Every `(PaneTarget, AgentType)` in a plan, for watcher fan-out, plus a
/// lookup from pane target back to its project directory for the
/// respawner's relaunch step.
fn pane_inventory(plan: &SwarmPlan) -> (Vec<(PaneTarget, ntm_core::agent::AgentType)>, HashMap<PaneTarget, PathBuf>) {
    let mut panes = Vec::new();
    let mut project_dirs = HashMap::new();
    for session in &plan.sessions {
        for pane in &session.panes {
            let target = PaneTarget::new(&session.name, pane.index);
            panes.push((target.clone(), pane.agent_type));
            project_dirs.insert(target, pane.project_path.clone());
        }
    }
    (panes, project_dirs)
}

async fn run_launch(stagger_ms: u64) -> anyhow::Result<()> {
    let plan = plan_store::load(&last_plan_path())?;

    let mux = Arc::new(TmuxDriver::new());
    let launcher = LaunchCommandBuilder::new(Arc::clone(&mux), LaunchConfig::default());
    let controller_config =
        ControllerConfig { stagger_delay: std::time::Duration::from_millis(stagger_ms), ..ControllerConfig::default() };
    let controller = Controller::new(Arc::clone(&mux), launcher, controller_config);

    let outcomes = controller.launch_swarm(&plan).await;
    let failed: Vec<_> = outcomes.iter().filter(|o| !o.success).collect();
    for outcome in &failed {
        tracing::error!(pane = %outcome.pane_target, error = ?outcome.error, "pane launch failed");
    }
    info!(launched = outcomes.len(), failed = failed.len(), "swarm launch complete");

    if !failed.is_empty() {
        return Err(NtmError::TransientExternal {
            component: "tmux",
            detail: format!("{} of {} panes failed to launch", failed.len(), outcomes.len()),
        }
        .into());
    }

    supervise(mux, &plan).await
}

/// Watches every launched pane for limit episodes and drives the
/// auto-respawner until interrupted (Ctrl-C or `ntm swarm stop` killing the
/// sessions out from under it).
async fn supervise(mux: Arc<TmuxDriver>, plan: &SwarmPlan) -> anyhow::Result<()> {
    let delay_tracker = Arc::new(DelayTracker::new(DelayTrackerConfig::default()));
    if let Ok(persisted) = delay_store::load(&rate_limits_path()) {
        delay_tracker.restore(persisted.state).await;
    }

    let cancel = CancellationToken::new();
    let (panes, project_dirs) = pane_inventory(plan);

    let limit_rx = spawn_watchers(Arc::clone(&mux), panes, Arc::new(ParserConfig::default()), DetectorConfig::default(), cancel.clone());

    let injector = Arc::new(
        Injector::new(Arc::clone(&mux), InjectorConfig::default()).with_delay_tracker(Arc::clone(&delay_tracker)),
    );
    let launcher = LaunchCommandBuilder::new(Arc::clone(&mux), LaunchConfig::default());
    let cred = Arc::new(CredCli::new());
    let respawner = Arc::new(
        Respawner::new(Arc::clone(&mux), Some(cred), injector, launcher, RespawnerConfig::default())
            .with_delay_tracker(Arc::clone(&delay_tracker)),
    );

    let (respawn_tx, mut respawn_rx) = mpsc::channel(100);
    let (rejection_tx, mut rejection_rx) = mpsc::channel(100);

    let respawner_handle = {
        let respawner = Arc::clone(&respawner);
        let cancel = cancel.clone();
        tokio::spawn(async move {
            respawner
                .run(limit_rx, respawn_tx, rejection_tx, move |target| project_dirs.get(target).cloned().unwrap_or_default(), cancel)
                .await;
        })
    };

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!("shutdown signal received; stopping watchers");
                cancel.cancel();
                break;
            }
            Some(event) = respawn_rx.recv() => {
                info!(pane = %event.pane_target, success = event.success, "pane respawned");
            }
            Some(rejection) = rejection_rx.recv() => {
                tracing::error!(pane = %rejection.pane_target, count = rejection.respawn_count, "retry budget exhausted; pane left dormant");
            }
            else => break,
        }
    }

    let _ = respawner_handle.await;

    let mut persisted = delay_store::PersistedDelayState::default();
    persisted.state = delay_tracker.all_states().await;
    delay_store::save(&rate_limits_path(), &persisted)?;

    Ok(())
}

async fn run_stop() -> anyhow::Result<()> {
    let plan = plan_store::load(&last_plan_path())?;
    let driver = TmuxDriver::new();

    let mut last_error = None;
    for session in &plan.sessions {
        if let Err(err) = driver.kill_session(&session.name).await {
            tracing::warn!(session = %session.name, error = %err, "failed to stop session");
            last_error = Some(err);
        } else {
            info!(session = %session.name, "session stopped");
        }
    }

    match last_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// The provider to rotate for `(session, pane_index)` in `plan`, pulled out
/// as plain logic so it is testable without a credential subprocess.
fn resolve_rotation_target(plan: &SwarmPlan, session: &str, pane_index: u32) -> anyhow::Result<Provider> {
    let session_spec = plan
        .sessions
        .iter()
        .find(|s| s.name == session)
        .ok_or_else(|| NtmError::FatalConfig { detail: format!("no session named {session} in the last plan") })?;
    let pane_spec = session_spec
        .panes
        .iter()
        .find(|p| p.index == pane_index)
        .ok_or_else(|| NtmError::FatalConfig { detail: format!("no pane {pane_index} in session {session}") })?;

    Provider::for_agent(pane_spec.agent_type).ok_or_else(|| {
        NtmError::FatalConfig { detail: format!("pane {pane_index} has no rotatable provider (unknown agent type)") }.into()
    })
}

async fn run_rotate(session: &str, pane_index: u32) -> anyhow::Result<()> {
    let plan = plan_store::load(&last_plan_path())?;
    let provider = resolve_rotation_target(&plan, session, pane_index)?;

    let cred = CredCli::new();
    cred.switch_next(provider).await?;
    info!(%session, pane = pane_index, %provider, "credential rotated");
    Ok(())
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
