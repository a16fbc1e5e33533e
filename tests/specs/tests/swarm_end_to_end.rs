// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end exercise of the scan -> plan -> controller launch pipeline
//! using the in-memory fakes, wired the way `ntm-cli`'s `run.rs` wires the
//! real collaborators.

use std::path::PathBuf;
use std::sync::Arc;

use ntm_core::controller::{Controller, ControllerConfig};
use ntm_core::launch::{LaunchCommandBuilder, LaunchConfig};
use ntm_core::plan::{build_plan, PlannerConfig};
use ntm_core::scan::{Scanner, ScannerConfig};
use ntm_core::test_support::{FakeBeadCounter, FakeMuxDriver, MuxCall};
use tokio_util::sync::CancellationToken;

fn make_project(base: &std::path::Path, name: &str) -> PathBuf {
    let dir = base.join(name);
    std::fs::create_dir_all(dir.join(".git")).unwrap();
    dir
}

#[tokio::test]
async fn scan_plan_launch_round_trip() {
    let base = tempfile::tempdir().unwrap();

    let heavy = make_project(base.path(), "heavy-project");
    let light = make_project(base.path(), "light-project");

    let beads = Arc::new(FakeBeadCounter::new());
    beads.set(heavy.clone(), 500);
    beads.set(light.clone(), 10);

    let scanner = Scanner::new(Arc::clone(&beads), ScannerConfig::default());
    let scan_result = scanner.scan(base.path(), &[], CancellationToken::new()).await.unwrap();

    assert_eq!(scan_result.projects.len(), 2);
    assert_eq!(scan_result.totals, 510);
    assert!(scan_result.errors.is_empty());

    let plan = build_plan(base.path().to_path_buf(), scan_result.projects, &PlannerConfig::default()).unwrap();

    // heavy-project (500 beads) lands in tier 1 (4/4/2); light-project (10
    // beads) lands in tier 3 (1/1/1).
    let heavy_alloc = plan.allocations.iter().find(|a| a.project_path == heavy).unwrap();
    let light_alloc = plan.allocations.iter().find(|a| a.project_path == light).unwrap();
    assert_eq!(heavy_alloc.allocation.total(), 10);
    assert_eq!(light_alloc.allocation.total(), 3);

    let mux = Arc::new(FakeMuxDriver::new());
    let launcher = LaunchCommandBuilder::new(Arc::clone(&mux), LaunchConfig::default());
    let controller = Controller::new(Arc::clone(&mux), launcher, ControllerConfig::default());

    let outcomes = controller.launch_swarm(&plan).await;
    assert!(outcomes.iter().all(|o| o.success), "{outcomes:?}");

    let calls = mux.calls();
    let send_keys_count = calls.iter().filter(|c| matches!(c, MuxCall::SendKeys { .. })).count();
    // Every pane gets a `cd` send-keys plus a launch-command send-keys.
    assert_eq!(send_keys_count, outcomes.len() * 2);
}

#[tokio::test]
async fn missing_scan_dir_fails_the_whole_pipeline() {
    let beads = Arc::new(FakeBeadCounter::new());
    let scanner = Scanner::new(beads, ScannerConfig::default());
    let result = scanner.scan(std::path::Path::new("/nonexistent/ntm-test-path"), &[], CancellationToken::new()).await;
    assert!(result.is_err());
}
