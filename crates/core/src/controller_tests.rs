use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::agent::AgentType;
use crate::launch::LaunchConfig;
use crate::test_support::FakeMuxDriver;

fn fast_config() -> ControllerConfig {
    ControllerConfig { cd_delay: Duration::from_millis(1), stagger_delay: Duration::from_millis(1), validate_paths: true }
}

#[tokio::test]
async fn launch_pane_aborts_on_missing_path_without_aborting_caller() {
    let mux = Arc::new(FakeMuxDriver::new());
    let launcher = LaunchCommandBuilder::new(Arc::clone(&mux), LaunchConfig::default());
    let controller = Controller::new(Arc::clone(&mux), launcher, fast_config());

    let pane = PaneSpec {
        index: 1,
        project_path: PathBuf::from("/definitely/not/a/real/path"),
        agent_type: AgentType::Claude,
        project_ordinal: 1,
        launch_token: "cc".into(),
    };

    let outcome = controller.launch_pane("cc_agents_1", &pane).await;
    assert!(!outcome.success);
    assert!(outcome.error.is_some());
}

#[tokio::test]
async fn launch_pane_sends_cd_then_launch_command() {
    let mux = Arc::new(FakeMuxDriver::new());
    let launcher = LaunchCommandBuilder::new(Arc::clone(&mux), LaunchConfig::default());
    let controller = Controller::new(Arc::clone(&mux), launcher, ControllerConfig { validate_paths: false, ..fast_config() });

    let pane = PaneSpec {
        index: 1,
        project_path: PathBuf::from("/tmp"),
        agent_type: AgentType::Claude,
        project_ordinal: 1,
        launch_token: "cc".into(),
    };

    let outcome = controller.launch_pane("cc_agents_1", &pane).await;
    assert!(outcome.success);
    assert_eq!(mux.calls().len(), 2);
}

#[tokio::test]
async fn launch_session_launches_every_pane_in_index_order() {
    let mux = Arc::new(FakeMuxDriver::new());
    let launcher = LaunchCommandBuilder::new(Arc::clone(&mux), LaunchConfig::default());
    let controller = Controller::new(Arc::clone(&mux), launcher, ControllerConfig { validate_paths: false, ..fast_config() });

    let session = SessionSpec {
        name: "cc_agents_1".into(),
        agent_type: AgentType::Claude,
        panes: vec![
            PaneSpec { index: 1, project_path: PathBuf::from("/tmp"), agent_type: AgentType::Claude, project_ordinal: 1, launch_token: "cc".into() },
            PaneSpec { index: 2, project_path: PathBuf::from("/tmp"), agent_type: AgentType::Claude, project_ordinal: 2, launch_token: "cc".into() },
        ],
    };

    let outcomes = controller.launch_session(&session).await;
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.success));
}
