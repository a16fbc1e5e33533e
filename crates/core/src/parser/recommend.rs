// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recommendation derivation (spec §4.3 "Recommendation rule").

use serde::{Deserialize, Serialize};

use super::flags::Flags;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    Wait,
    ErrorState,
    ContinueThenRestart,
    DoNotInterrupt,
    SafeToRestart,
    Unknown,
}

/// Derive exactly one recommendation from flags, in priority order. Total
/// and deterministic: every input yields exactly one outcome.
pub fn recommend(flags: Flags) -> Recommendation {
    if flags.rate_limited {
        Recommendation::Wait
    } else if flags.in_error {
        Recommendation::ErrorState
    } else if flags.working && flags.context_low {
        Recommendation::ContinueThenRestart
    } else if flags.working {
        Recommendation::DoNotInterrupt
    } else if flags.idle {
        Recommendation::SafeToRestart
    } else {
        Recommendation::Unknown
    }
}
