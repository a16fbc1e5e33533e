// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential-rotation CLI contract (spec §6, component C3).

use serde::{Deserialize, Serialize};

use crate::mux::BoxFuture;
use crate::provider::Provider;

/// Status of credential accounts for one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialStatus {
    pub provider: Provider,
    pub active_account: Option<String>,
    pub account_count: u32,
}

/// A single named account, with whether it is currently active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountEntry {
    pub name: String,
    pub active: bool,
}

/// The external credential-rotation CLI: list/switch/query accounts per
/// provider.
pub trait CredentialRotator: Send + Sync {
    fn status<'a>(&'a self, provider: Provider) -> BoxFuture<'a, anyhow::Result<CredentialStatus>>;

    fn list<'a>(&'a self, provider: Provider) -> BoxFuture<'a, anyhow::Result<Vec<AccountEntry>>>;

    /// Switch to the next account in rotation.
    fn switch_next<'a>(&'a self, provider: Provider) -> BoxFuture<'a, anyhow::Result<()>>;

    /// Switch to a specifically named account.
    fn switch_to<'a>(&'a self, provider: Provider, account: &'a str) -> BoxFuture<'a, anyhow::Result<()>>;
}
