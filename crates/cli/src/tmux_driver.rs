// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concrete [`MuxDriver`] backed by the `tmux` binary.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use ntm_core::error::NtmError;
use ntm_core::mux::{BoxFuture, MuxDriver};
use ntm_core::pane::PaneTarget;

pub struct TmuxDriver {
    socket: Option<String>,
    timeout: Duration,
}

impl TmuxDriver {
    pub fn new() -> Self {
        Self { socket: None, timeout: ntm_core::mux::DEFAULT_MUX_TIMEOUT }
    }

    pub fn with_socket(mut self, socket: impl Into<String>) -> Self {
        self.socket = Some(socket.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn command(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new("tmux");
        if let Some(ref socket) = self.socket {
            cmd.arg("-S").arg(socket);
        }
        cmd
    }

    async fn run(&self, args: &[&str]) -> anyhow::Result<std::process::Output> {
        let mut cmd = self.command();
        cmd.args(args).stdout(Stdio::piped()).stderr(Stdio::piped());
        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| NtmError::TransientExternal { component: "tmux", detail: format!("{} timed out", args.join(" ")) })??;
        Ok(output)
    }
}

impl Default for TmuxDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MuxDriver for TmuxDriver {
    fn send_keys<'a>(&'a self, target: &'a PaneTarget, text: &'a str, append_enter: bool) -> BoxFuture<'a, anyhow::Result<()>> {
        Box::pin(async move {
            let target_arg = target.to_string();
            let args: Vec<&str> = if append_enter {
                vec!["send-keys", "-t", &target_arg, text, "Enter"]
            } else {
                vec!["send-keys", "-l", "-t", &target_arg, text]
            };
            let output = self.run(&args).await?;
            if !output.status.success() {
                return Err(NtmError::TransientExternal {
                    component: "tmux",
                    detail: format!("send-keys failed: {}", String::from_utf8_lossy(&output.stderr)),
                }
                .into());
            }
            Ok(())
        })
    }

    fn capture_pane_output<'a>(&'a self, target: &'a PaneTarget, last_n_lines: u32) -> BoxFuture<'a, anyhow::Result<String>> {
        Box::pin(async move {
            let target_arg = target.to_string();
            let start = format!("-{last_n_lines}");
            let output = self.run(&["capture-pane", "-p", "-e", "-t", &target_arg, "-S", &start]).await?;
            if !output.status.success() {
                return Err(NtmError::TransientExternal {
                    component: "tmux",
                    detail: format!("capture-pane failed: {}", String::from_utf8_lossy(&output.stderr)),
                }
                .into());
            }
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        })
    }

    fn build_pane_command<'a>(&'a self, project_dir: &'a Path, command: &'a str) -> anyhow::Result<String> {
        if command.trim().is_empty() {
            return Err(NtmError::FatalConfig { detail: "launch command cannot be empty".to_owned() }.into());
        }
        Ok(format!("cd {:?} && {command}", project_dir))
    }

    fn display_message<'a>(&'a self, session: &'a str, text: &'a str, duration_ms: u64) -> BoxFuture<'a, anyhow::Result<()>> {
        Box::pin(async move {
            let duration_arg = duration_ms.to_string();
            let output = self.run(&["display-message", "-t", session, "-d", &duration_arg, text]).await?;
            if !output.status.success() {
                return Err(NtmError::TransientExternal {
                    component: "tmux",
                    detail: format!("display-message failed: {}", String::from_utf8_lossy(&output.stderr)),
                }
                .into());
            }
            Ok(())
        })
    }
}

impl TmuxDriver {
    /// Tears down a named session. Not part of [`MuxDriver`]: the core's
    /// narrow interface has no use for it, but the `swarm stop` command
    /// does (spec §6).
    pub async fn kill_session(&self, session: &str) -> anyhow::Result<()> {
        let output = self.run(&["kill-session", "-t", session]).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("can't find session") {
                return Ok(());
            }
            return Err(NtmError::TransientExternal { component: "tmux", detail: format!("kill-session failed: {stderr}") }.into());
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tmux_driver_tests.rs"]
mod tests;
