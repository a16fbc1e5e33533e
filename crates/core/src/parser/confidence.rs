// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Confidence scoring (spec §4.3 "Confidence").

use crate::agent::AgentType;

use super::flags::Flags;

pub struct ConfidenceInputs {
    pub kind: AgentType,
    pub has_explicit_percentage: bool,
    pub has_explicit_rate_limit_phrase: bool,
    pub has_explicit_prompt_token: bool,
    pub flags: Flags,
}

/// Base score by kind (0 for unknown, ~0.4 on a bare banner match for a
/// known kind), plus increments for each corroborating signal, capped at
/// 1.0. `unknown` kind forces confidence <= 0.3 regardless of corroboration
/// (spec §3 invariant).
pub fn score(inputs: &ConfidenceInputs) -> f64 {
    if inputs.kind == AgentType::Unknown {
        let mut total = 0.0;
        if inputs.has_explicit_prompt_token {
            total += 0.2;
        }
        if inputs.flags.working {
            total += 0.1;
        }
        return total.min(0.3);
    }

    let mut total = 0.4;
    if inputs.has_explicit_percentage {
        total += 0.3;
    }
    if inputs.has_explicit_rate_limit_phrase {
        total += 0.3;
    }
    if inputs.has_explicit_prompt_token {
        total += 0.2;
    }
    if inputs.flags.working {
        total += 0.1;
    }
    total.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kind_is_capped_at_point_three() {
        let inputs = ConfidenceInputs {
            kind: AgentType::Unknown,
            has_explicit_percentage: true,
            has_explicit_rate_limit_phrase: true,
            has_explicit_prompt_token: true,
            flags: Flags { working: true, ..Flags::default() },
        };
        assert!(score(&inputs) <= 0.3);
    }

    /// Spec §8 scenario 2: Codex idle with 47% context, confidence >= 0.7.
    #[test]
    fn known_kind_with_percentage_and_prompt_token_exceeds_point_seven() {
        let inputs = ConfidenceInputs {
            kind: AgentType::Codex,
            has_explicit_percentage: true,
            has_explicit_rate_limit_phrase: false,
            has_explicit_prompt_token: true,
            flags: Flags { idle: true, ..Flags::default() },
        };
        assert!(score(&inputs) >= 0.7);
    }

    #[test]
    fn bare_banner_match_is_about_point_four() {
        let inputs = ConfidenceInputs {
            kind: AgentType::Claude,
            has_explicit_percentage: false,
            has_explicit_rate_limit_phrase: false,
            has_explicit_prompt_token: false,
            flags: Flags::default(),
        };
        assert_eq!(score(&inputs), 0.4);
    }

    #[test]
    fn score_never_exceeds_one() {
        let inputs = ConfidenceInputs {
            kind: AgentType::Claude,
            has_explicit_percentage: true,
            has_explicit_rate_limit_phrase: true,
            has_explicit_prompt_token: true,
            flags: Flags { working: true, ..Flags::default() },
        };
        assert_eq!(score(&inputs), 1.0);
    }
}
