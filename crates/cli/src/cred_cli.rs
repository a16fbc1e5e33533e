// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concrete [`CredentialRotator`] backed by an external credential-rotation
//! CLI (spec §6): `status --provider <p> --json`, `list --provider <p>
//! --json`, `switch --provider <p> --next|--account <name>`.

use std::time::Duration;

use serde::Deserialize;

use ntm_core::credential::{AccountEntry, CredentialRotator, CredentialStatus};
use ntm_core::error::NtmError;
use ntm_core::mux::BoxFuture;
use ntm_core::provider::Provider;

pub struct CredCli {
    binary: String,
    timeout: Duration,
}

impl CredCli {
    pub fn new() -> Self {
        Self { binary: "ntm-cred".to_owned(), timeout: Duration::from_secs(5) }
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    async fn run(&self, args: &[&str]) -> anyhow::Result<std::process::Output> {
        let mut cmd = tokio::process::Command::new(&self.binary);
        cmd.args(args);
        let output = tokio::time::timeout(self.timeout, cmd.output()).await.map_err(|_| NtmError::TransientExternal {
            component: "cred",
            detail: format!("{} {} timed out", self.binary, args.join(" ")),
        })??;
        Ok(output)
    }
}

impl Default for CredCli {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct RawStatus {
    provider: String,
    active_account: Option<String>,
    account_count: u32,
}

#[derive(Debug, Deserialize)]
struct RawAccount {
    name: String,
    active: bool,
}

impl CredentialRotator for CredCli {
    fn status<'a>(&'a self, provider: Provider) -> BoxFuture<'a, anyhow::Result<CredentialStatus>> {
        Box::pin(async move {
            let provider_arg = provider.as_str();
            let output = self.run(&["status", "--provider", provider_arg, "--json"]).await?;
            if !output.status.success() {
                return Err(NtmError::TransientExternal {
                    component: "cred",
                    detail: format!("status failed: {}", String::from_utf8_lossy(&output.stderr)),
                }
                .into());
            }
            let raw: RawStatus = serde_json::from_slice(&output.stdout)?;
            Ok(CredentialStatus { provider, active_account: raw.active_account, account_count: raw.account_count })
        })
    }

    fn list<'a>(&'a self, provider: Provider) -> BoxFuture<'a, anyhow::Result<Vec<AccountEntry>>> {
        Box::pin(async move {
            let provider_arg = provider.as_str();
            let output = self.run(&["list", "--provider", provider_arg, "--json"]).await?;
            if !output.status.success() {
                return Err(NtmError::TransientExternal {
                    component: "cred",
                    detail: format!("list failed: {}", String::from_utf8_lossy(&output.stderr)),
                }
                .into());
            }
            let raw: Vec<RawAccount> = serde_json::from_slice(&output.stdout)?;
            Ok(raw.into_iter().map(|a| AccountEntry { name: a.name, active: a.active }).collect())
        })
    }

    fn switch_next<'a>(&'a self, provider: Provider) -> BoxFuture<'a, anyhow::Result<()>> {
        Box::pin(async move {
            let provider_arg = provider.as_str();
            let output = self.run(&["switch", "--provider", provider_arg, "--next"]).await?;
            if !output.status.success() {
                return Err(NtmError::TransientExternal {
                    component: "cred",
                    detail: format!("switch failed: {}", String::from_utf8_lossy(&output.stderr)),
                }
                .into());
            }
            Ok(())
        })
    }

    fn switch_to<'a>(&'a self, provider: Provider, account: &'a str) -> BoxFuture<'a, anyhow::Result<()>> {
        Box::pin(async move {
            let provider_arg = provider.as_str();
            let output = self.run(&["switch", "--provider", provider_arg, "--account", account]).await?;
            if !output.status.success() {
                return Err(NtmError::TransientExternal {
                    component: "cred",
                    detail: format!("switch failed: {}", String::from_utf8_lossy(&output.stderr)),
                }
                .into());
            }
            Ok(())
        })
    }
}

#[cfg(test)]
#[path = "cred_cli_tests.rs"]
mod tests;
