// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pane addressing (spec §3 "PaneTarget", §6).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A string address uniquely identifying one pane to the multiplexer
/// driver: `"{session}:1.{pane_index}"`, 1-based pane indices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaneTarget {
    pub session: String,
    pub pane_index: u32,
}

impl PaneTarget {
    pub fn new(session: impl Into<String>, pane_index: u32) -> Self {
        Self { session: session.into(), pane_index }
    }
}

impl fmt::Display for PaneTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:1.{}", self.session, self.pane_index)
    }
}
