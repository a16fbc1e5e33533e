// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end exercise of limit detection feeding the auto-respawner,
//! using the in-memory fakes the way the long-running `swarm launch`
//! supervision loop wires the real collaborators.

use std::sync::Arc;
use std::time::Duration;

use ntm_core::agent::AgentType;
use ntm_core::inject::{Injector, InjectorConfig};
use ntm_core::launch::{LaunchCommandBuilder, LaunchConfig};
use ntm_core::limit::{spawn_watchers, DetectorConfig};
use ntm_core::pane::PaneTarget;
use ntm_core::parser::ParserConfig;
use ntm_core::respawn::{Respawner, RespawnerConfig};
use ntm_core::test_support::{FakeCredentialRotator, FakeMuxDriver};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn rate_limited_pane_triggers_a_respawn_event() {
    let mux = Arc::new(FakeMuxDriver::new());
    let target = PaneTarget::new("cc_agents_1", 1);
    mux.set_capture(target.clone(), "Error: usage limit reached, please try again later");

    let detector_config = DetectorConfig { check_interval: Duration::from_millis(20), ..DetectorConfig::default() };
    let cancel = CancellationToken::new();

    let limit_rx = spawn_watchers(
        Arc::clone(&mux),
        vec![(target.clone(), AgentType::Claude)],
        Arc::new(ParserConfig::default()),
        detector_config,
        cancel.clone(),
    );

    let injector = Arc::new(Injector::new(Arc::clone(&mux), InjectorConfig::default()));
    let launcher = LaunchCommandBuilder::new(Arc::clone(&mux), LaunchConfig::default());
    let credentials = Arc::new(FakeCredentialRotator::new());
    let respawner = Arc::new(Respawner::new(
        Arc::clone(&mux),
        Some(credentials),
        injector,
        launcher,
        RespawnerConfig {
            exit_wait_timeout: Duration::from_millis(50),
            exit_poll_interval: Duration::from_millis(10),
            graceful_exit_delay: Duration::from_millis(10),
            clear_pane_delay: Duration::from_millis(5),
            agent_ready_delay: Duration::from_millis(5),
            ..RespawnerConfig::default()
        },
    ));

    let (respawn_tx, mut respawn_rx) = mpsc::channel(10);
    let (rejection_tx, _rejection_rx) = mpsc::channel(10);

    let project_dir = std::env::temp_dir();
    let run_cancel = cancel.clone();
    let run_handle = tokio::spawn(async move {
        respawner.run(limit_rx, respawn_tx, rejection_tx, move |_| project_dir.clone(), run_cancel).await;
    });

    let event = tokio::time::timeout(Duration::from_secs(2), respawn_rx.recv())
        .await
        .expect("respawn event within timeout")
        .expect("channel open");

    assert_eq!(event.pane_target, target);
    assert!(event.success);

    cancel.cancel();
    let _ = run_handle.await;
}
