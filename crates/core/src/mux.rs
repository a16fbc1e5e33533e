// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Multiplexer driver contract (spec §6, component C1).
//!
//! The multiplexer itself (its `send-keys`/`capture-pane`/`display-message`
//! semantics) is an external collaborator; NTM only depends on this trait.
//! Object-safe and boxed-future-based, matching the teacher's
//! `Detector`/`Backend` trait shape rather than `async-trait`.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::time::Duration;

use crate::pane::PaneTarget;

/// Default per-call timeout for multiplexer send/capture operations (spec
/// §5: "Multiplexer send/capture: 5 s default").
pub const DEFAULT_MUX_TIMEOUT: Duration = Duration::from_secs(5);

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The external terminal-multiplexer driver: send keystrokes, capture pane
/// output, build a launch command, and display a status line.
pub trait MuxDriver: Send + Sync {
    /// Send `text` to the pane. If `append_enter`, follow with a literal
    /// Enter keypress.
    fn send_keys<'a>(&'a self, target: &'a PaneTarget, text: &'a str, append_enter: bool) -> BoxFuture<'a, anyhow::Result<()>>;

    /// Capture the last `last_n_lines` lines of the pane, ANSI escape
    /// sequences included.
    fn capture_pane_output<'a>(&'a self, target: &'a PaneTarget, last_n_lines: u32) -> BoxFuture<'a, anyhow::Result<String>>;

    /// Validate and safely quote `command` for execution in `project_dir`,
    /// returning the shell command string to launch.
    fn build_pane_command<'a>(&'a self, project_dir: &'a Path, command: &'a str) -> anyhow::Result<String>;

    /// Show a transient status message in the given session.
    fn display_message<'a>(&'a self, session: &'a str, text: &'a str, duration_ms: u64) -> BoxFuture<'a, anyhow::Result<()>>;
}

#[cfg(test)]
#[path = "mux_tests.rs"]
mod tests;
