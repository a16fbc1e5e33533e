// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Limit Detector (spec §4.4, component C10): poll panes, match provider-
//! specific limit patterns, emit [`LimitEvent`]s on a shared bounded channel.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::agent::AgentType;
use crate::mux::MuxDriver;
use crate::pane::PaneTarget;
use crate::parser::{ansi, config::ParserConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitEvent {
    pub pane_target: PaneTarget,
    pub agent_kind: AgentType,
    pub matched_pattern: String,
    pub raw_sample: String,
    pub detected_at_epoch_ms: u64,
}

#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub check_interval: Duration,
    pub capture_lines: u32,
    /// Minimum quiet window (pane observed not-limited) before a new
    /// episode may be emitted for the same pane.
    pub quiet_window: Duration,
    pub channel_capacity: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(5),
            capture_lines: 50,
            quiet_window: Duration::from_secs(5),
            channel_capacity: 100,
        }
    }
}

#[derive(Default)]
struct PaneCooldown {
    limited_episode_active: bool,
    last_non_limited_at: Option<std::time::Instant>,
}

/// Spawns one watcher task per `(PaneTarget, AgentType)` pair and returns
/// the shared receiver for emitted events. `cancel` terminates every
/// watcher; the channel closes once all watcher tasks have exited.
pub fn spawn_watchers<M: MuxDriver + 'static>(
    mux: Arc<M>,
    panes: Vec<(PaneTarget, AgentType)>,
    parser_config: Arc<ParserConfig>,
    detector_config: DetectorConfig,
    cancel: CancellationToken,
) -> mpsc::Receiver<LimitEvent> {
    let (tx, rx) = mpsc::channel(detector_config.channel_capacity.max(1));

    for (target, kind) in panes {
        let mux = Arc::clone(&mux);
        let parser_config = Arc::clone(&parser_config);
        let detector_config = detector_config.clone();
        let cancel = cancel.clone();
        let tx = tx.clone();

        tokio::spawn(async move {
            watch_pane(mux, target, kind, parser_config, detector_config, cancel, tx).await;
        });
    }

    rx
}

async fn watch_pane<M: MuxDriver + 'static>(
    mux: Arc<M>,
    target: PaneTarget,
    kind: AgentType,
    parser_config: Arc<ParserConfig>,
    config: DetectorConfig,
    cancel: CancellationToken,
    tx: mpsc::Sender<LimitEvent>,
) {
    let cooldown = Mutex::new(PaneCooldown::default());

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(config.check_interval) => {}
        }

        if cancel.is_cancelled() {
            return;
        }

        let captured = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            result = mux.capture_pane_output(&target, config.capture_lines) => result,
        };

        let text = match captured {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(pane = %target, error = %err, "pane capture failed; watcher continues");
                continue;
            }
        };

        let stripped = ansi::strip_ansi(&text);
        let lower = stripped.to_ascii_lowercase();
        let matched = parser_config
            .limit_phrases_for(kind)
            .into_iter()
            .find(|phrase| lower.contains(&phrase.to_ascii_lowercase()));

        let mut guard = cooldown.lock();
        match matched {
            Some(phrase) => {
                let should_emit = !guard.limited_episode_active
                    || guard
                        .last_non_limited_at
                        .map(|at| at.elapsed() >= config.quiet_window)
                        .unwrap_or(false);
                guard.limited_episode_active = true;
                guard.last_non_limited_at = None;
                drop(guard);

                if should_emit {
                    let event = LimitEvent {
                        pane_target: target.clone(),
                        agent_kind: kind,
                        matched_pattern: phrase.to_owned(),
                        raw_sample: ansi::tail_chars(&stripped, parser_config.raw_sample_chars),
                        detected_at_epoch_ms: now_epoch_ms(),
                    };
                    if tx.try_send(event).is_err() {
                        tracing::warn!(pane = %target, "limit event channel full; dropping event");
                    }
                }
            }
            None => {
                guard.limited_episode_active = false;
                guard.last_non_limited_at = Some(std::time::Instant::now());
            }
        }
    }
}

fn now_epoch_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

#[cfg(test)]
#[path = "limit_tests.rs"]
mod tests;
