// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy shared across all NTM subsystems.
//!
//! Mirrors the categories of spec §7: transient external failures are
//! logged and retried by the surrounding policy, protocol errors collapse
//! to an empty/unavailable result, policy rejections are terminal for the
//! current operation but not for the process, and fatal config errors abort
//! startup.

use std::fmt;

/// A typed error category, attached to `anyhow::Error` as context so a
/// caller can branch on category without downcasting a specific error type.
#[derive(Debug, Clone)]
pub enum NtmError {
    /// A CLI invocation, capture, or send timed out or the external process
    /// was unavailable. Logged and retried by the surrounding policy.
    TransientExternal { component: &'static str, detail: String },
    /// An external CLI returned output that could not be parsed in the
    /// expected shape. Treated as an empty/unavailable result, not a hard
    /// failure.
    Protocol { component: &'static str, detail: String },
    /// A bounded-retry or cooldown policy rejected the operation (e.g. the
    /// respawn retry gate). No further automatic action is taken.
    PolicyRejection { reason: String },
    /// Invalid configuration discovered at startup (bad tier thresholds,
    /// an unparsable regex). Fails the whole process.
    FatalConfig { detail: String },
}

impl fmt::Display for NtmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TransientExternal { component, detail } => {
                write!(f, "transient error in {component}: {detail}")
            }
            Self::Protocol { component, detail } => {
                write!(f, "protocol error from {component}: {detail}")
            }
            Self::PolicyRejection { reason } => write!(f, "policy rejection: {reason}"),
            Self::FatalConfig { detail } => write!(f, "invalid configuration: {detail}"),
        }
    }
}

impl std::error::Error for NtmError {}

impl NtmError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientExternal { .. })
    }

    pub fn is_policy_rejection(&self) -> bool {
        matches!(self, Self::PolicyRejection { .. })
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
