// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Auto-Respawner (spec §4.5, component C11): consumes [`LimitEvent`]s and
//! performs the full recovery sequence for one pane.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::agent::AgentType;
use crate::credential::CredentialRotator;
use crate::delay::DelayTracker;
use crate::inject::Injector;
use crate::launch::LaunchCommandBuilder;
use crate::limit::LimitEvent;
use crate::mux::MuxDriver;
use crate::pane::PaneTarget;
use crate::provider::Provider;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneRuntimeState {
    pub respawn_count: u32,
    pub reset_at_epoch_ms: u64,
    pub last_event_at_epoch_ms: u64,
}

impl PaneRuntimeState {
    fn fresh(now_ms: u64) -> Self {
        Self { respawn_count: 0, reset_at_epoch_ms: now_ms, last_event_at_epoch_ms: now_ms }
    }
}

#[derive(Debug, Clone)]
pub struct RespawnerConfig {
    pub max_retries_per_pane: u32,
    pub reset_window: Duration,
    pub exit_poll_interval: Duration,
    pub exit_wait_timeout: Duration,
    pub graceful_exit_delay: Duration,
    pub clear_pane_delay: Duration,
    pub agent_ready_delay: Duration,
    pub rotate_credentials: bool,
    pub default_prompt: String,
    pub channel_capacity: usize,
}

impl Default for RespawnerConfig {
    fn default() -> Self {
        Self {
            max_retries_per_pane: 3,
            reset_window: Duration::from_secs(3600),
            exit_poll_interval: Duration::from_millis(500),
            exit_wait_timeout: Duration::from_secs(5),
            graceful_exit_delay: Duration::from_secs(2),
            clear_pane_delay: Duration::from_millis(100),
            agent_ready_delay: Duration::from_secs(5),
            rotate_credentials: false,
            default_prompt: "Continue with the next unit of work.".to_owned(),
            channel_capacity: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RespawnStage {
    Killing,
    AwaitingExit,
    Rotating,
    Clearing,
    Relaunching,
    AwaitingReady,
    Injecting,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RespawnEvent {
    pub pane_target: PaneTarget,
    pub agent_kind: AgentType,
    pub success: bool,
    pub rotated_credential: bool,
    pub injected_prompt: bool,
    pub completed_at_epoch_ms: u64,
}

/// Surfaced when the retry gate trips (spec §4.5 step 1, §7
/// `PolicyRejection`). No further automatic action is taken for the pane.
#[derive(Debug, Clone)]
pub struct RetryExhausted {
    pub pane_target: PaneTarget,
    pub respawn_count: u32,
}

struct KillStep {
    keys: &'static str,
    append_enter: bool,
    wait_after: Duration,
}

fn kill_sequence(kind: AgentType) -> Vec<KillStep> {
    match kind {
        AgentType::Claude | AgentType::Unknown => vec![
            KillStep { keys: "\x03", append_enter: false, wait_after: Duration::from_millis(100) },
            KillStep { keys: "\x03", append_enter: false, wait_after: Duration::ZERO },
        ],
        AgentType::Codex => vec![KillStep { keys: "/exit", append_enter: true, wait_after: Duration::ZERO }],
        AgentType::Gemini => vec![
            KillStep { keys: "\x1b", append_enter: false, wait_after: Duration::from_millis(50) },
            KillStep { keys: "\x03", append_enter: false, wait_after: Duration::ZERO },
        ],
    }
}

const SHELL_PROMPT_TERMINATORS: &[&str] = &["$", "%", ">", "#", "❯"];

fn last_non_blank_line_is_prompt(text: &str) -> bool {
    text.lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .map(|line| {
            let trimmed = line.trim_end();
            SHELL_PROMPT_TERMINATORS.iter().any(|t| trimmed.ends_with(t))
        })
        .unwrap_or(false)
}

pub struct Respawner<M: MuxDriver, R: CredentialRotator> {
    mux: Arc<M>,
    credential_rotator: Option<Arc<R>>,
    injector: Arc<Injector<M>>,
    launcher: LaunchCommandBuilder<M>,
    config: RespawnerConfig,
    pane_states: Mutex<HashMap<PaneTarget, PaneRuntimeState>>,
    delay_tracker: Option<Arc<DelayTracker>>,
}

impl<M: MuxDriver + 'static, R: CredentialRotator + 'static> Respawner<M, R> {
    pub fn new(
        mux: Arc<M>,
        credential_rotator: Option<Arc<R>>,
        injector: Arc<Injector<M>>,
        launcher: LaunchCommandBuilder<M>,
        config: RespawnerConfig,
    ) -> Self {
        Self {
            mux,
            credential_rotator,
            injector,
            launcher,
            config,
            pane_states: Mutex::new(HashMap::new()),
            delay_tracker: None,
        }
    }

    /// Feed every consumed [`LimitEvent`] into the adaptive delay tracker
    /// (spec §4.7: "On every LimitEvent mapped to a provider,
    /// RecordRateLimit(provider, action)").
    pub fn with_delay_tracker(mut self, tracker: Arc<DelayTracker>) -> Self {
        self.delay_tracker = Some(tracker);
        self
    }

    /// Drive the respawner's consume loop: read events until the channel
    /// closes or `cancel` fires, emitting [`RespawnEvent`]s and
    /// [`RetryExhausted`] notices on the provided channels.
    pub async fn run(
        &self,
        mut events: mpsc::Receiver<LimitEvent>,
        out: mpsc::Sender<RespawnEvent>,
        rejections: mpsc::Sender<RetryExhausted>,
        project_dir_for: impl Fn(&PaneTarget) -> std::path::PathBuf,
        cancel: CancellationToken,
    ) {
        loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                event = events.recv() => event,
            };

            let Some(event) = event else { return };
            let project_dir = project_dir_for(&event.pane_target);

            match self.handle_event(event, &project_dir, &cancel).await {
                Ok(Some(respawn_event)) => {
                    if out.send(respawn_event).await.is_err() {
                        return;
                    }
                }
                Ok(None) => {}
                Err(rejection) => {
                    if rejections.send(rejection).await.is_err() {
                        return;
                    }
                }
            }
        }
    }

    /// Perform the recovery sequence for one event. Returns `Ok(None)` if
    /// cancelled mid-sequence, `Err` if the retry gate tripped.
    async fn handle_event(
        &self,
        event: LimitEvent,
        project_dir: &std::path::Path,
        cancel: &CancellationToken,
    ) -> Result<Option<RespawnEvent>, RetryExhausted> {
        let target = event.pane_target.clone();

        if !self.check_and_record_retry_gate(&target) {
            let count = self.pane_states.lock().get(&target).map(|s| s.respawn_count).unwrap_or(0);
            tracing::warn!(pane = %target, count, "retry gate tripped; pane left dormant");
            return Err(RetryExhausted { pane_target: target, respawn_count: count });
        }

        if cancel.is_cancelled() {
            return Ok(None);
        }

        if let (Some(tracker), Some(provider)) = (&self.delay_tracker, Provider::for_agent(event.agent_kind)) {
            tracker.record_rate_limit(provider).await;
        }

        if let Err(err) = self
            .mux
            .display_message(&target.session, &format!("NTM: respawning {target} ({})", event.matched_pattern), 5000)
            .await
        {
            tracing::warn!(pane = %target, error = %err, "status-line display failed; non-fatal");
        }

        self.run_kill_sequence(&target, event.agent_kind).await;

        if cancel.is_cancelled() {
            return Ok(None);
        }

        self.verify_exit(&target).await;

        let mut rotated = false;
        if self.config.rotate_credentials {
            rotated = self.rotate_credential(event.agent_kind).await;
        }

        self.clear_pane(&target).await;
        self.relaunch(&target, event.agent_kind, project_dir).await;

        tokio::time::sleep(self.config.agent_ready_delay).await;

        let injected = self.inject_marching_orders(&target, event.agent_kind).await;

        Ok(Some(RespawnEvent {
            pane_target: target,
            agent_kind: event.agent_kind,
            success: true,
            rotated_credential: rotated,
            injected_prompt: injected,
            completed_at_epoch_ms: now_epoch_ms(),
        }))
    }

    fn check_and_record_retry_gate(&self, target: &PaneTarget) -> bool {
        let now = now_epoch_ms();
        let mut states = self.pane_states.lock();
        let state = states.entry(target.clone()).or_insert_with(|| PaneRuntimeState::fresh(now));

        if now.saturating_sub(state.reset_at_epoch_ms) > self.config.reset_window.as_millis() as u64 {
            state.respawn_count = 0;
            state.reset_at_epoch_ms = now;
        }

        if state.respawn_count >= self.config.max_retries_per_pane {
            return false;
        }

        state.respawn_count += 1;
        state.last_event_at_epoch_ms = now;
        true
    }

    async fn run_kill_sequence(&self, target: &PaneTarget, kind: AgentType) {
        for step in kill_sequence(kind) {
            if let Err(err) = self.mux.send_keys(target, step.keys, step.append_enter).await {
                tracing::warn!(pane = %target, error = %err, "kill keystroke failed");
            }
            if !step.wait_after.is_zero() {
                tokio::time::sleep(step.wait_after).await;
            }
        }
    }

    async fn verify_exit(&self, target: &PaneTarget) {
        let started = Instant::now();
        loop {
            match self.mux.capture_pane_output(target, 5).await {
                Ok(text) if last_non_blank_line_is_prompt(&text) => return,
                Ok(_) => {}
                Err(err) => tracing::debug!(pane = %target, error = %err, "exit-verification capture failed"),
            }

            if started.elapsed() >= self.config.exit_wait_timeout {
                tokio::time::sleep(self.config.graceful_exit_delay).await;
                return;
            }

            tokio::time::sleep(self.config.exit_poll_interval).await;
        }
    }

    async fn rotate_credential(&self, kind: AgentType) -> bool {
        let Some(rotator) = &self.credential_rotator else { return false };
        let Some(provider) = Provider::for_agent(kind) else { return false };

        let before = rotator.status(provider).await;
        if let Err(err) = before {
            tracing::warn!(provider = %provider, error = %err, "credential status query failed; non-fatal");
            return false;
        }

        if let Err(err) = rotator.switch_next(provider).await {
            tracing::warn!(provider = %provider, error = %err, "credential rotation failed; non-fatal");
            return false;
        }

        if let Err(err) = rotator.status(provider).await {
            tracing::warn!(provider = %provider, error = %err, "post-rotation status query failed; non-fatal");
        }

        true
    }

    async fn clear_pane(&self, target: &PaneTarget) {
        if let Err(err) = self.mux.send_keys(target, "clear", true).await {
            tracing::warn!(pane = %target, error = %err, "clear-pane keystroke failed");
        }
        tokio::time::sleep(self.config.clear_pane_delay).await;
    }

    async fn relaunch(&self, target: &PaneTarget, kind: AgentType, project_dir: &std::path::Path) {
        let command = match self.launcher.build(project_dir, kind) {
            Ok(command) => command,
            Err(err) => {
                tracing::warn!(pane = %target, error = %err, "failed to build relaunch command");
                return;
            }
        };
        if let Err(err) = self.mux.send_keys(target, &command, true).await {
            tracing::warn!(pane = %target, error = %err, "relaunch keystroke failed");
        }
    }

    async fn inject_marching_orders(&self, target: &PaneTarget, kind: AgentType) -> bool {
        let result = self.injector.inject_one(target, kind, &self.config.default_prompt).await;
        if !result.success {
            tracing::warn!(pane = %target, "marching-orders injection failed; non-fatal");
        }
        result.success
    }
}

fn now_epoch_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

#[cfg(test)]
#[path = "respawn_tests.rs"]
mod tests;
