use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::delay::{DelayTracker, DelayTrackerConfig};
use crate::inject::InjectorConfig;
use crate::launch::LaunchConfig;
use crate::provider::Provider;
use crate::test_support::{FakeCredentialRotator, FakeMuxDriver, MuxCall};

fn fast_config() -> RespawnerConfig {
    RespawnerConfig {
        exit_poll_interval: Duration::from_millis(1),
        exit_wait_timeout: Duration::from_millis(50),
        graceful_exit_delay: Duration::from_millis(1),
        clear_pane_delay: Duration::from_millis(1),
        agent_ready_delay: Duration::from_millis(1),
        ..RespawnerConfig::default()
    }
}

fn make_respawner(
    mux: Arc<FakeMuxDriver>,
    config: RespawnerConfig,
) -> Respawner<FakeMuxDriver, FakeCredentialRotator> {
    let injector = Arc::new(Injector::new(
        Arc::clone(&mux),
        InjectorConfig { double_enter_delay: Duration::from_millis(1), enter_delay: Duration::from_millis(1), stagger_delay: Duration::from_millis(1), adaptive_stagger: false },
    ));
    let launcher = LaunchCommandBuilder::new(Arc::clone(&mux), LaunchConfig::default());
    Respawner::new(mux, None, injector, launcher, config)
}

/// Spec §8 scenario 4: Claude kill sequence.
#[tokio::test]
async fn claude_kill_sequence_matches_literal_scenario() {
    let mux = Arc::new(FakeMuxDriver::new());
    let target = PaneTarget::new("cc_agents_1", 1);
    mux.set_capture(target.clone(), "done\n$ ");

    let respawner = make_respawner(Arc::clone(&mux), fast_config());
    let event = LimitEvent {
        pane_target: target.clone(),
        agent_kind: AgentType::Claude,
        matched_pattern: "rate limit".into(),
        raw_sample: String::new(),
        detected_at_epoch_ms: 0,
    };

    let project_dir = tempfile::tempdir().unwrap();
    let outcome = respawner.handle_event(event, project_dir.path(), &CancellationToken::new()).await;
    assert!(outcome.is_ok());

    let calls = mux.calls();
    assert!(matches!(calls[0], MuxCall::DisplayMessage { .. }));
    assert_eq!(calls[1], MuxCall::SendKeys { target: target.clone(), text: "\x03".into(), append_enter: false });
    assert_eq!(calls[2], MuxCall::SendKeys { target: target.clone(), text: "\x03".into(), append_enter: false });
}

#[tokio::test]
async fn codex_kill_sequence_sends_exit_command() {
    let mux = Arc::new(FakeMuxDriver::new());
    let target = PaneTarget::new("cod_agents_1", 1);
    mux.set_capture(target.clone(), "$ ");

    let respawner = make_respawner(Arc::clone(&mux), fast_config());
    let event = LimitEvent {
        pane_target: target.clone(),
        agent_kind: AgentType::Codex,
        matched_pattern: "usage limit".into(),
        raw_sample: String::new(),
        detected_at_epoch_ms: 0,
    };

    let project_dir = tempfile::tempdir().unwrap();
    respawner.handle_event(event, project_dir.path(), &CancellationToken::new()).await.unwrap();

    let calls = mux.calls();
    assert!(matches!(calls[0], MuxCall::DisplayMessage { .. }));
    assert_eq!(calls[1], MuxCall::SendKeys { target, text: "/exit".into(), append_enter: true });
}

/// Spec §8 quantified invariant: retry bound.
#[tokio::test]
async fn retry_gate_trips_after_max_retries_per_pane() {
    let mux = Arc::new(FakeMuxDriver::new());
    let target = PaneTarget::new("cc_agents_1", 1);
    mux.set_capture(target.clone(), "$ ");

    let mut config = fast_config();
    config.max_retries_per_pane = 3;
    let respawner = make_respawner(Arc::clone(&mux), config);
    let project_dir = tempfile::tempdir().unwrap();

    let make_event = || LimitEvent {
        pane_target: target.clone(),
        agent_kind: AgentType::Claude,
        matched_pattern: "rate limit".into(),
        raw_sample: String::new(),
        detected_at_epoch_ms: 0,
    };

    for _ in 0..3 {
        let outcome = respawner.handle_event(make_event(), project_dir.path(), &CancellationToken::new()).await;
        assert!(outcome.is_ok());
    }

    let outcome = respawner.handle_event(make_event(), project_dir.path(), &CancellationToken::new()).await;
    assert!(outcome.is_err());
    let rejection = outcome.unwrap_err();
    assert_eq!(rejection.respawn_count, 3);
}

#[tokio::test]
async fn credential_rotation_failure_is_non_fatal() {
    let mux = Arc::new(FakeMuxDriver::new());
    let target = PaneTarget::new("cc_agents_1", 1);
    mux.set_capture(target.clone(), "$ ");

    let mut config = fast_config();
    config.rotate_credentials = true;

    let injector = Arc::new(Injector::new(
        Arc::clone(&mux),
        InjectorConfig { double_enter_delay: Duration::from_millis(1), enter_delay: Duration::from_millis(1), stagger_delay: Duration::from_millis(1), adaptive_stagger: false },
    ));
    let launcher = LaunchCommandBuilder::new(Arc::clone(&mux), LaunchConfig::default());
    // No accounts configured: switch_next will fail, rotation should be
    // recorded as non-fatal and the sequence should still complete.
    let rotator = Arc::new(FakeCredentialRotator::new());
    let respawner = Respawner::new(mux, Some(rotator), injector, launcher, config);

    let event = LimitEvent {
        pane_target: target,
        agent_kind: AgentType::Claude,
        matched_pattern: "rate limit".into(),
        raw_sample: String::new(),
        detected_at_epoch_ms: 0,
    };

    let project_dir = tempfile::tempdir().unwrap();
    let outcome = respawner.handle_event(event, project_dir.path(), &CancellationToken::new()).await.unwrap();
    let respawn_event = outcome.unwrap();
    assert!(respawn_event.success);
    assert!(!respawn_event.rotated_credential);
}

#[tokio::test]
async fn consumed_limit_event_feeds_the_delay_tracker() {
    let mux = Arc::new(FakeMuxDriver::new());
    let target = PaneTarget::new("cc_agents_1", 1);
    mux.set_capture(target.clone(), "$ ");

    let injector = Arc::new(Injector::new(
        Arc::clone(&mux),
        InjectorConfig { double_enter_delay: Duration::from_millis(1), enter_delay: Duration::from_millis(1), stagger_delay: Duration::from_millis(1), adaptive_stagger: false },
    ));
    let launcher = LaunchCommandBuilder::new(Arc::clone(&mux), LaunchConfig::default());
    let tracker = Arc::new(DelayTracker::new(DelayTrackerConfig::default()));
    let respawner: Respawner<FakeMuxDriver, FakeCredentialRotator> =
        Respawner::new(mux, None, injector, launcher, fast_config()).with_delay_tracker(Arc::clone(&tracker));

    let event = LimitEvent {
        pane_target: target,
        agent_kind: AgentType::Claude,
        matched_pattern: "rate limit".into(),
        raw_sample: String::new(),
        detected_at_epoch_ms: 0,
    };

    let project_dir = tempfile::tempdir().unwrap();
    respawner.handle_event(event, project_dir.path(), &CancellationToken::new()).await.unwrap();

    let state = tracker.snapshot(Provider::Anthropic).await;
    assert_eq!(state.total_rate_limits, 1);
}

#[tokio::test]
async fn respawn_sequence_shows_a_status_line_before_the_kill_sequence() {
    let mux = Arc::new(FakeMuxDriver::new());
    let target = PaneTarget::new("cc_agents_1", 1);
    mux.set_capture(target.clone(), "$ ");

    let respawner = make_respawner(Arc::clone(&mux), fast_config());
    let event = LimitEvent {
        pane_target: target.clone(),
        agent_kind: AgentType::Claude,
        matched_pattern: "rate limit".into(),
        raw_sample: String::new(),
        detected_at_epoch_ms: 0,
    };

    let project_dir = tempfile::tempdir().unwrap();
    respawner.handle_event(event, project_dir.path(), &CancellationToken::new()).await.unwrap();

    let calls = mux.calls();
    assert_eq!(calls[0], MuxCall::DisplayMessage { session: target.session.clone(), text: format!("NTM: respawning {target} (rate limit)") });
}

#[test]
fn prompt_terminator_detection_checks_last_non_blank_line() {
    assert!(last_non_blank_line_is_prompt("history\n\n$ "));
    assert!(last_non_blank_line_is_prompt("codex> "));
    assert!(!last_non_blank_line_is_prompt("still writing output"));
}
