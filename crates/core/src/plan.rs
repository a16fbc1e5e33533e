// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Allocation Planner (spec §4.2, component C5): map bead counts to tiered
//! agent allocation, then to a session/pane layout.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::agent::AgentType;
use crate::error::NtmError;
use crate::project::Project;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    One,
    Two,
    Three,
}

/// Per-project (or per-tier) agent counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AllocationSpec {
    pub cc: u32,
    pub cod: u32,
    pub gmi: u32,
}

impl AllocationSpec {
    pub fn total(&self) -> u32 {
        self.cc + self.cod + self.gmi
    }

    pub fn for_agent(&self, agent: AgentType) -> u32 {
        match agent {
            AgentType::Claude => self.cc,
            AgentType::Codex => self.cod,
            AgentType::Gemini => self.gmi,
            AgentType::Unknown => 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub tier1_threshold: u64,
    pub tier2_threshold: u64,
    pub tier1_spec: AllocationSpec,
    pub tier2_spec: AllocationSpec,
    pub tier3_spec: AllocationSpec,
    pub sessions_per_type: u32,
    /// Operator override for panes-per-session; `None` derives it from the
    /// grand totals and `sessions_per_type`.
    pub panes_per_session_override: Option<u32>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            tier1_threshold: 400,
            tier2_threshold: 100,
            tier1_spec: AllocationSpec { cc: 4, cod: 4, gmi: 2 },
            tier2_spec: AllocationSpec { cc: 3, cod: 3, gmi: 2 },
            tier3_spec: AllocationSpec { cc: 1, cod: 1, gmi: 1 },
            sessions_per_type: 3,
            panes_per_session_override: None,
        }
    }
}

impl PlannerConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.tier1_threshold > self.tier2_threshold && self.tier2_threshold > 0) {
            return Err(NtmError::FatalConfig { detail: "tier thresholds must satisfy T1 > T2 > 0".to_owned() }.into());
        }
        for (label, spec) in [("tier1", self.tier1_spec), ("tier2", self.tier2_spec), ("tier3", self.tier3_spec)] {
            if spec.total() < 1 {
                return Err(NtmError::FatalConfig { detail: format!("{label} allocation total must be >= 1") }.into());
            }
        }
        if self.sessions_per_type == 0 {
            return Err(NtmError::FatalConfig { detail: "sessions_per_type must be >= 1".to_owned() }.into());
        }
        Ok(())
    }

    pub fn tier_for(&self, bead_count: u64) -> Tier {
        if bead_count >= self.tier1_threshold {
            Tier::One
        } else if bead_count >= self.tier2_threshold {
            Tier::Two
        } else {
            Tier::Three
        }
    }

    pub fn spec_for_tier(&self, tier: Tier) -> AllocationSpec {
        match tier {
            Tier::One => self.tier1_spec,
            Tier::Two => self.tier2_spec,
            Tier::Three => self.tier3_spec,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaneSpec {
    /// 1-based index within its owning session.
    pub index: u32,
    pub project_path: PathBuf,
    pub agent_type: AgentType,
    /// 1-based ordinal of this pane among all panes of this agent type for
    /// this project.
    pub project_ordinal: u32,
    pub launch_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSpec {
    pub name: String,
    pub agent_type: AgentType,
    pub panes: Vec<PaneSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectAllocation {
    pub project_path: PathBuf,
    pub bead_count: u64,
    pub tier: Tier,
    pub allocation: AllocationSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwarmPlan {
    pub created_at_epoch_ms: u64,
    pub scan_base: PathBuf,
    pub allocations: Vec<ProjectAllocation>,
    pub totals: AllocationSpec,
    pub sessions: Vec<SessionSpec>,
}

/// Build a [`SwarmPlan`] from scanned projects.
pub fn build_plan(scan_base: PathBuf, mut projects: Vec<Project>, config: &PlannerConfig) -> anyhow::Result<SwarmPlan> {
    config.validate()?;

    // Descending bead count, lexicographic tiebreak on path (spec §3, §4.2).
    projects.sort_by(|a, b| b.bead_count.cmp(&a.bead_count).then_with(|| a.path.cmp(&b.path)));

    let mut allocations = Vec::with_capacity(projects.len());
    let mut totals = AllocationSpec::default();

    for project in &projects {
        let tier = config.tier_for(project.bead_count);
        let allocation = config.spec_for_tier(tier);
        totals.cc += allocation.cc;
        totals.cod += allocation.cod;
        totals.gmi += allocation.gmi;
        allocations.push(ProjectAllocation {
            project_path: project.path.clone(),
            bead_count: project.bead_count,
            tier,
            allocation,
        });
    }

    let panes_per_session = config.panes_per_session_override.unwrap_or_else(|| {
        let max_total = totals.cc.max(totals.cod).max(totals.gmi);
        ceil_div(max_total, config.sessions_per_type)
    });

    let mut sessions = Vec::new();
    for agent_type in [AgentType::Claude, AgentType::Codex, AgentType::Gemini] {
        sessions.extend(build_sessions_for_type(agent_type, &allocations, config.sessions_per_type, panes_per_session));
    }

    Ok(SwarmPlan {
        created_at_epoch_ms: now_epoch_ms(),
        scan_base,
        allocations,
        totals,
        sessions,
    })
}

fn build_sessions_for_type(
    agent_type: AgentType,
    allocations: &[ProjectAllocation],
    sessions_per_type: u32,
    panes_per_session: u32,
) -> Vec<SessionSpec> {
    let mut flat_panes = Vec::new();
    let mut project_ordinal_counter: std::collections::HashMap<PathBuf, u32> = std::collections::HashMap::new();

    for alloc in allocations {
        let count = alloc.allocation.for_agent(agent_type);
        for _ in 0..count {
            let ordinal = project_ordinal_counter.entry(alloc.project_path.clone()).or_insert(0);
            *ordinal += 1;
            flat_panes.push(PaneSpec {
                index: 0,
                project_path: alloc.project_path.clone(),
                agent_type,
                project_ordinal: *ordinal,
                launch_token: agent_type.token().to_owned(),
            });
        }
    }

    let mut sessions = Vec::new();
    if panes_per_session == 0 {
        return sessions;
    }

    for n in 1..=sessions_per_type {
        let start = ((n - 1) * panes_per_session) as usize;
        let end = (start + panes_per_session as usize).min(flat_panes.len());
        if start >= flat_panes.len() {
            break;
        }
        let mut panes: Vec<PaneSpec> = flat_panes[start..end].to_vec();
        for (i, pane) in panes.iter_mut().enumerate() {
            pane.index = (i + 1) as u32;
        }
        if panes.is_empty() {
            continue;
        }
        sessions.push(SessionSpec {
            name: format!("{}_agents_{}", agent_type.token(), n),
            agent_type,
            panes,
        });
    }

    sessions
}

fn ceil_div(a: u32, b: u32) -> u32 {
    if b == 0 {
        0
    } else {
        (a + b - 1) / b
    }
}

fn now_epoch_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod tests;
