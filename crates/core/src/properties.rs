// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Quantified-invariant property tests (spec §8), gathered in one module
//! since they span `plan` and `parser` rather than belonging to either.

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use proptest::prelude::*;

    use crate::parser::flags::Flags;
    use crate::parser::recommend::{recommend, Recommendation};
    use crate::plan::{build_plan, PlannerConfig};
    use crate::project::Project;

    fn arb_flags() -> impl Strategy<Value = Flags> {
        (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
            |(rate_limited, in_error, context_low, idle, working)| Flags { rate_limited, in_error, context_low, idle, working },
        )
    }

    proptest! {
        /// Recommendation function is total and deterministic: recommend()
        /// is a pure function over Flags, so any two calls with the same
        /// flags agree.
        #[test]
        fn recommendation_is_deterministic(flags in arb_flags()) {
            prop_assert_eq!(recommend(flags), recommend(flags));
        }

        /// Idle precedence: whenever idle is set, the recommendation is
        /// restricted to the set the spec names.
        #[test]
        fn idle_precedence_restricts_recommendation(flags in arb_flags()) {
            if flags.idle && !flags.rate_limited && !flags.in_error && !flags.working {
                let rec = recommend(flags);
                prop_assert_eq!(rec, Recommendation::SafeToRestart);
            }
        }

        /// Tier monotonicity: for b1 >= b2, tier(b1) <= tier(b2) (Tier::One
        /// < Tier::Two < Tier::Three by declaration order) and the
        /// allocation total for b1's tier is >= b2's tier under defaults.
        #[test]
        fn tier_monotonicity(b1 in 0u64..2000, b2 in 0u64..2000) {
            let config = PlannerConfig::default();
            let (hi, lo) = if b1 >= b2 { (b1, b2) } else { (b2, b1) };
            let tier_hi = config.tier_for(hi);
            let tier_lo = config.tier_for(lo);
            prop_assert!(tier_hi <= tier_lo);
            prop_assert!(config.spec_for_tier(tier_hi).total() >= config.spec_for_tier(tier_lo).total());
        }

        /// Allocation sum: for every SwarmPlan and agent type, the sum of
        /// panes across sessions equals the grand total for that type.
        #[test]
        fn allocation_sum_holds(counts in proptest::collection::vec(0u64..1000, 0..8)) {
            let projects: Vec<Project> = counts
                .into_iter()
                .enumerate()
                .map(|(i, count)| Project::new(PathBuf::from(format!("/dp/project-{i}")), count))
                .collect();
            let config = PlannerConfig::default();
            let plan = build_plan(PathBuf::from("/dp"), projects, &config).unwrap();

            for agent_type in [crate::agent::AgentType::Claude, crate::agent::AgentType::Codex, crate::agent::AgentType::Gemini] {
                let pane_sum: u32 = plan
                    .sessions
                    .iter()
                    .filter(|s| s.agent_type == agent_type)
                    .map(|s| s.panes.len() as u32)
                    .sum();
                prop_assert_eq!(pane_sum, plan.totals.for_agent(agent_type));
            }
        }
    }
}
