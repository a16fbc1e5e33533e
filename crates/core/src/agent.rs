// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent type identity shared across the allocation, launch, parser, and
//! respawn subsystems.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Known agent CLI types (spec glossary: "Agent").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentType {
    /// Claude Code (`cc`).
    Claude,
    /// Codex (`cod`).
    Codex,
    /// Gemini (`gmi`).
    Gemini,
    /// Unclassified pane contents.
    Unknown,
}

impl AgentType {
    /// The short launch token used in pane commands and CLI args (`cc`,
    /// `cod`, `gmi`).
    pub fn token(&self) -> &'static str {
        match self {
            Self::Claude => "cc",
            Self::Codex => "cod",
            Self::Gemini => "gmi",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
