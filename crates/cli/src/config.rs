// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI surface of the core host binary (spec §6): `ntm swarm
//! plan|launch|stop`, `ntm rotate`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ntm_core::error::NtmError;

/// Swarm supervisor for AI coding agents running in multiplexer panes.
#[derive(Debug, Parser)]
#[command(name = "ntm", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Local-LLM HTTP adapter host.
    #[arg(long, env = "NTM_OLLAMA_HOST", global = true)]
    pub ollama_host: Option<String>,

    /// Proficiency tier hint (1-3). Values outside this range are ignored.
    #[arg(long, env = "NTM_PROFICIENCY_TIER", global = true)]
    pub proficiency_tier: Option<i64>,

    /// Log format (json or text).
    #[arg(long, env = "NTM_LOG_FORMAT", default_value = "json", global = true)]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "NTM_LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan, plan, or launch a swarm across eligible projects.
    Swarm {
        #[command(subcommand)]
        action: SwarmAction,
    },
    /// Rotate the credential active in one pane.
    Rotate {
        /// Target session name.
        session: String,
        /// Target pane index within the session.
        #[arg(long)]
        pane: u32,
    },
}

#[derive(Debug, Subcommand)]
pub enum SwarmAction {
    /// Scan eligible projects and produce an allocation plan.
    Plan {
        #[arg(long)]
        scan_dir: Option<PathBuf>,
    },
    /// Launch panes for the most recently produced plan.
    Launch {
        #[arg(long, default_value = "300")]
        stagger_ms: u64,
    },
    /// Tear down a running swarm.
    Stop,
}

impl Cli {
    /// Validates cross-field constraints not expressible via `clap` alone.
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Commands::Rotate { session, .. } = &self.command {
            if session.trim().is_empty() {
                return Err(NtmError::FatalConfig { detail: "rotate requires a non-empty session name".to_owned() }.into());
            }
        }
        Ok(())
    }

    /// The proficiency tier to use, honoring the "out of range is ignored"
    /// rule from §6: only 1, 2, or 3 are accepted.
    pub fn effective_proficiency_tier(&self) -> Option<u8> {
        self.proficiency_tier.and_then(|raw| match raw {
            1..=3 => Some(raw as u8),
            _ => None,
        })
    }
}

/// Resolves the config directory, honoring `XDG_CONFIG_HOME` when set and
/// falling back to `~/.config/ntm`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.is_empty() {
            return PathBuf::from(xdg).join("ntm");
        }
    }
    dirs_home().join(".config").join("ntm")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("/"))
}

/// Initializes tracing from the parsed CLI config. Uses `try_init` so it is
/// safe to call more than once (e.g. from tests).
pub fn init_tracing(cli: &Cli) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = if std::env::var("RUST_LOG").is_err() {
        EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let result = match cli.log_format.as_str() {
        "json" => fmt::fmt().with_env_filter(filter).json().try_init(),
        _ => fmt::fmt().with_env_filter(filter).try_init(),
    };
    drop(result);
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
