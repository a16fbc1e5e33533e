// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

use ntm_core::error::NtmError;

/// Process exit codes for the `ntm` binary, mirroring the core error
/// taxonomy so callers can script against stable codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    TransientFailure,
    PolicyRejection,
    ConfigError,
    Internal,
}

impl ExitCode {
    pub fn code(&self) -> i32 {
        match self {
            Self::Success => 0,
            Self::TransientFailure => 10,
            Self::PolicyRejection => 20,
            Self::ConfigError => 30,
            Self::Internal => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::TransientFailure => "TRANSIENT_FAILURE",
            Self::PolicyRejection => "POLICY_REJECTION",
            Self::ConfigError => "CONFIG_ERROR",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn exit_code_for(error: &anyhow::Error) -> ExitCode {
    match error.downcast_ref::<NtmError>() {
        Some(NtmError::TransientExternal { .. }) => ExitCode::TransientFailure,
        Some(NtmError::Protocol { .. }) => ExitCode::TransientFailure,
        Some(NtmError::PolicyRejection { .. }) => ExitCode::PolicyRejection,
        Some(NtmError::FatalConfig { .. }) => ExitCode::ConfigError,
        None => ExitCode::Internal,
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
