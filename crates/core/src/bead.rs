// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bead CLI contract (spec §6, component C2).

use std::path::Path;

use crate::mux::BoxFuture;

/// The external bead-tracker CLI: counts open work items for a project.
///
/// Per spec §4.1: a non-zero exit, an unavailable binary, or a well-formed
/// empty/`null` payload all mean a count of 0 — never an error. Only
/// malformed (non-empty, non-JSON) output is a `Protocol` error, and even
/// that collapses to a count of 0 at the scanner level; the distinction
/// exists so the scanner can log it as malformed rather than silently.
pub trait BeadCounter: Send + Sync {
    /// Count open work items for the project rooted at `project_dir`.
    fn count_open<'a>(&'a self, project_dir: &'a Path) -> BoxFuture<'a, anyhow::Result<BeadCount>>;
}

/// Result of one bead-count invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeadCount {
    pub count: u64,
    /// True when the underlying CLI output could not be parsed as the
    /// expected JSON sequence (still yields `count == 0`, per spec §4.1).
    pub malformed: bool,
}

impl BeadCount {
    pub fn zero() -> Self {
        Self { count: 0, malformed: false }
    }

    pub fn ok(count: u64) -> Self {
        Self { count, malformed: false }
    }

    pub fn malformed() -> Self {
        Self { count: 0, malformed: true }
    }
}
