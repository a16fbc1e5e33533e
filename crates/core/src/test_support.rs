// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory fakes for the three external collaborators (mux, bead CLI,
//! credential CLI), used by unit and integration tests throughout the
//! workspace. Mirrors the teacher's `test_support.rs` convention of
//! keeping test doubles alongside the production trait definitions.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::bead::{BeadCount, BeadCounter};
use crate::credential::{AccountEntry, CredentialRotator, CredentialStatus};
use crate::mux::{BoxFuture, MuxDriver};
use crate::pane::PaneTarget;
use crate::provider::Provider;

/// One recorded call against a `FakeMuxDriver`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MuxCall {
    SendKeys { target: PaneTarget, text: String, append_enter: bool },
    CapturePane { target: PaneTarget },
    DisplayMessage { session: String, text: String },
}

/// A fully in-memory `MuxDriver`: records every call, and returns
/// pre-programmed capture output per pane target.
#[derive(Default)]
pub struct FakeMuxDriver {
    pub calls: Mutex<Vec<MuxCall>>,
    pub captures: Mutex<HashMap<PaneTarget, String>>,
    pub fail_send: Mutex<bool>,
}

impl FakeMuxDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Program the text that `capture_pane_output` returns for `target`.
    pub fn set_capture(&self, target: PaneTarget, text: impl Into<String>) {
        self.captures.lock().insert(target, text.into());
    }

    pub fn calls(&self) -> Vec<MuxCall> {
        self.calls.lock().clone()
    }
}

impl MuxDriver for FakeMuxDriver {
    fn send_keys<'a>(
        &'a self,
        target: &'a PaneTarget,
        text: &'a str,
        append_enter: bool,
    ) -> BoxFuture<'a, anyhow::Result<()>> {
        Box::pin(async move {
            self.calls.lock().push(MuxCall::SendKeys {
                target: target.clone(),
                text: text.to_owned(),
                append_enter,
            });
            if *self.fail_send.lock() {
                anyhow::bail!("simulated send-keys failure");
            }
            Ok(())
        })
    }

    fn capture_pane_output<'a>(
        &'a self,
        target: &'a PaneTarget,
        _last_n_lines: u32,
    ) -> BoxFuture<'a, anyhow::Result<String>> {
        Box::pin(async move {
            self.calls.lock().push(MuxCall::CapturePane { target: target.clone() });
            Ok(self.captures.lock().get(target).cloned().unwrap_or_default())
        })
    }

    fn build_pane_command<'a>(&'a self, project_dir: &'a Path, command: &'a str) -> anyhow::Result<String> {
        Ok(format!("cd {:?} && {command}", project_dir))
    }

    fn display_message<'a>(
        &'a self,
        session: &'a str,
        text: &'a str,
        _duration_ms: u64,
    ) -> BoxFuture<'a, anyhow::Result<()>> {
        Box::pin(async move {
            self.calls
                .lock()
                .push(MuxCall::DisplayMessage { session: session.to_owned(), text: text.to_owned() });
            Ok(())
        })
    }
}

/// A `BeadCounter` backed by an in-memory map of project path to count.
/// Missing entries resolve to 0, matching the degraded-scan contract.
#[derive(Default)]
pub struct FakeBeadCounter {
    pub counts: Mutex<HashMap<PathBuf, u64>>,
}

impl FakeBeadCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, project_dir: impl Into<PathBuf>, count: u64) {
        self.counts.lock().insert(project_dir.into(), count);
    }
}

impl BeadCounter for FakeBeadCounter {
    fn count_open<'a>(&'a self, project_dir: &'a Path) -> BoxFuture<'a, anyhow::Result<BeadCount>> {
        Box::pin(async move {
            let count = self.counts.lock().get(project_dir).copied().unwrap_or(0);
            Ok(BeadCount::ok(count))
        })
    }
}

/// A `CredentialRotator` backed by an in-memory per-provider rotation list.
pub struct FakeCredentialRotator {
    pub accounts: Mutex<HashMap<Provider, Vec<String>>>,
    pub active_index: Mutex<HashMap<Provider, usize>>,
}

impl Default for FakeCredentialRotator {
    fn default() -> Self {
        Self { accounts: Mutex::new(HashMap::new()), active_index: Mutex::new(HashMap::new()) }
    }
}

impl FakeCredentialRotator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accounts(provider: Provider, names: Vec<String>) -> Self {
        let rotator = Self::new();
        rotator.accounts.lock().insert(provider, names);
        rotator.active_index.lock().insert(provider, 0);
        rotator
    }
}

impl CredentialRotator for FakeCredentialRotator {
    fn status<'a>(&'a self, provider: Provider) -> BoxFuture<'a, anyhow::Result<CredentialStatus>> {
        Box::pin(async move {
            let accounts = self.accounts.lock();
            let names = accounts.get(&provider).cloned().unwrap_or_default();
            let idx = *self.active_index.lock().get(&provider).unwrap_or(&0);
            Ok(CredentialStatus {
                provider,
                active_account: names.get(idx).cloned(),
                account_count: names.len() as u32,
            })
        })
    }

    fn list<'a>(&'a self, provider: Provider) -> BoxFuture<'a, anyhow::Result<Vec<AccountEntry>>> {
        Box::pin(async move {
            let accounts = self.accounts.lock();
            let names = accounts.get(&provider).cloned().unwrap_or_default();
            let idx = *self.active_index.lock().get(&provider).unwrap_or(&0);
            Ok(names
                .into_iter()
                .enumerate()
                .map(|(i, name)| AccountEntry { name, active: i == idx })
                .collect())
        })
    }

    fn switch_next<'a>(&'a self, provider: Provider) -> BoxFuture<'a, anyhow::Result<()>> {
        Box::pin(async move {
            let len = self.accounts.lock().get(&provider).map(|v| v.len()).unwrap_or(0);
            if len == 0 {
                anyhow::bail!("no accounts configured for {provider}");
            }
            let mut idx_map = self.active_index.lock();
            let idx = idx_map.entry(provider).or_insert(0);
            *idx = (*idx + 1) % len;
            Ok(())
        })
    }

    fn switch_to<'a>(&'a self, provider: Provider, account: &'a str) -> BoxFuture<'a, anyhow::Result<()>> {
        Box::pin(async move {
            let accounts = self.accounts.lock();
            let names = accounts.get(&provider).cloned().unwrap_or_default();
            let pos = names.iter().position(|n| n == account);
            drop(accounts);
            match pos {
                Some(idx) => {
                    self.active_index.lock().insert(provider, idx);
                    Ok(())
                }
                None => anyhow::bail!("unknown account {account} for {provider}"),
            }
        })
    }
}

/// Shared handle bundle for tests that need all three fakes wired together.
pub struct FakeWorld {
    pub mux: Arc<FakeMuxDriver>,
    pub beads: Arc<FakeBeadCounter>,
    pub credentials: Arc<FakeCredentialRotator>,
}

impl Default for FakeWorld {
    fn default() -> Self {
        Self {
            mux: Arc::new(FakeMuxDriver::new()),
            beads: Arc::new(FakeBeadCounter::new()),
            credentials: Arc::new(FakeCredentialRotator::new()),
        }
    }
}

impl FakeWorld {
    pub fn new() -> Self {
        Self::default()
    }
}
