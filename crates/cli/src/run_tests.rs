use super::*;

use ntm_core::agent::AgentType;
use ntm_core::error::NtmError;
use ntm_core::plan::{AllocationSpec, PaneSpec, ProjectAllocation, SessionSpec, Tier};

fn sample_plan() -> SwarmPlan {
    let pane = PaneSpec {
        index: 1,
        project_path: PathBuf::from("/home/user/projects/widget"),
        agent_type: AgentType::Claude,
        project_ordinal: 1,
        launch_token: "cc".to_owned(),
    };
    SwarmPlan {
        created_at_epoch_ms: 1,
        scan_base: PathBuf::from("/home/user/projects"),
        allocations: vec![ProjectAllocation {
            project_path: PathBuf::from("/home/user/projects/widget"),
            bead_count: 500,
            tier: Tier::One,
            allocation: AllocationSpec { cc: 1, cod: 0, gmi: 0 },
        }],
        totals: AllocationSpec { cc: 1, cod: 0, gmi: 0 },
        sessions: vec![SessionSpec { name: "cc_agents_1".to_owned(), agent_type: AgentType::Claude, panes: vec![pane] }],
    }
}

#[test]
fn resolves_provider_for_known_session_and_pane() {
    let plan = sample_plan();
    let provider = resolve_rotation_target(&plan, "cc_agents_1", 1).unwrap();
    assert_eq!(provider, Provider::Anthropic);
}

#[test]
fn unknown_session_is_an_error() {
    let plan = sample_plan();
    let err = resolve_rotation_target(&plan, "nonexistent", 1).unwrap_err();
    assert!(matches!(err.downcast_ref::<NtmError>(), Some(NtmError::FatalConfig { .. })));
}

#[test]
fn unknown_pane_index_is_an_error() {
    let plan = sample_plan();
    let err = resolve_rotation_target(&plan, "cc_agents_1", 99).unwrap_err();
    assert!(matches!(err.downcast_ref::<NtmError>(), Some(NtmError::FatalConfig { .. })));
}

#[test]
fn pane_inventory_lists_every_pane_with_its_project_dir() {
    let plan = sample_plan();
    let (panes, project_dirs) = pane_inventory(&plan);

    assert_eq!(panes.len(), 1);
    let (target, kind) = &panes[0];
    assert_eq!(target.session, "cc_agents_1");
    assert_eq!(target.pane_index, 1);
    assert_eq!(*kind, AgentType::Claude);
    assert_eq!(project_dirs.get(target), Some(&PathBuf::from("/home/user/projects/widget")));
}

#[test]
fn last_plan_path_is_nested_under_config_dir() {
    std::env::set_var("XDG_CONFIG_HOME", "/tmp/ntm-config-test");
    assert_eq!(last_plan_path(), PathBuf::from("/tmp/ntm-config-test/ntm/last_plan.json"));
    std::env::remove_var("XDG_CONFIG_HOME");
}
