// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Logical credential/rate-limit provider identity and normalization
//! (spec §3 "ProviderState", §6 provider normalization table).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::agent::AgentType;

/// A logical provider backing one or more agent CLIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Anthropic,
    OpenAi,
    Google,
}

impl Provider {
    /// Normalize a free-form provider/agent alias string, per spec §6:
    /// `{cc, claude, claude-code} → claude`; `{cod, codex} → openai`;
    /// `{gmi, gemini} → google`.
    pub fn normalize(alias: &str) -> Option<Self> {
        match alias.to_ascii_lowercase().as_str() {
            "cc" | "claude" | "claude-code" | "anthropic" => Some(Self::Anthropic),
            "cod" | "codex" | "openai" => Some(Self::OpenAi),
            "gmi" | "gemini" | "google" => Some(Self::Google),
            _ => None,
        }
    }

    /// The provider backing a given agent type. `AgentType::Unknown` has no
    /// provider.
    pub fn for_agent(agent: AgentType) -> Option<Self> {
        match agent {
            AgentType::Claude => Some(Self::Anthropic),
            AgentType::Codex => Some(Self::OpenAi),
            AgentType::Gemini => Some(Self::Google),
            AgentType::Unknown => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenAi => "openai",
            Self::Google => "google",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
