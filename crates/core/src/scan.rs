// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bead Scanner (spec §4.1, component C4): discover eligible projects under
//! a base directory and fan out open-item counts through [`BeadCounter`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::bead::BeadCounter;
use crate::error::NtmError;
use crate::project::{is_eligible_project, Project};

/// Per-project scan failure. Only populated for truly unexpected errors;
/// the bead CLI's normal "no count" outcomes never land here (spec §4.1).
#[derive(Debug, Clone)]
pub struct ScanError {
    pub project: PathBuf,
    pub error: String,
}

/// Result of a completed (or cancelled) scan.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub projects: Vec<Project>,
    pub totals: u64,
    pub duration: Duration,
    pub errors: Vec<ScanError>,
}

#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub worker_count: usize,
    pub bead_cli_timeout: Duration,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self { worker_count: 4, bead_cli_timeout: Duration::from_secs(5) }
    }
}

pub struct Scanner<C: BeadCounter> {
    counter: Arc<C>,
    config: ScannerConfig,
}

impl<C: BeadCounter + 'static> Scanner<C> {
    pub fn new(counter: Arc<C>, config: ScannerConfig) -> Self {
        Self { counter, config }
    }

    /// Discover and count projects under `base_dir`. If `explicit_projects`
    /// is non-empty, only those paths are considered (each still checked
    /// for eligibility via [`is_eligible_project`]).
    pub async fn scan(
        &self,
        base_dir: &Path,
        explicit_projects: &[PathBuf],
        cancel: CancellationToken,
    ) -> anyhow::Result<ScanResult> {
        let started = Instant::now();

        if !base_dir.is_dir() {
            return Err(NtmError::FatalConfig {
                detail: format!("scan base directory does not exist: {}", base_dir.display()),
            }
            .into());
        }

        let candidates = if explicit_projects.is_empty() {
            discover_candidates(base_dir)?
        } else {
            explicit_projects.to_vec()
        };

        let eligible: Vec<PathBuf> = candidates.into_iter().filter(|p| is_eligible_project(p)).collect();

        let semaphore = Arc::new(Semaphore::new(self.config.worker_count.max(1)));
        let mut join_set = tokio::task::JoinSet::new();

        for path in eligible {
            let counter = Arc::clone(&self.counter);
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();
            let timeout = self.config.bead_cli_timeout;

            join_set.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return None;
                };
                if cancel.is_cancelled() {
                    return None;
                }

                let outcome = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return None,
                    result = tokio::time::timeout(timeout, counter.count_open(&path)) => result,
                };

                match outcome {
                    Ok(Ok(count)) => {
                        if count.malformed {
                            tracing::warn!(project = %path.display(), "bead CLI returned malformed output; treating as 0");
                        }
                        Some(Ok((path, count.count)))
                    }
                    Ok(Err(err)) => {
                        tracing::warn!(project = %path.display(), error = %err, "bead CLI invocation failed; treating as 0");
                        Some(Ok((path, 0)))
                    }
                    Err(_elapsed) => {
                        Some(Err(ScanError { project: path, error: "bead CLI timed out".to_owned() }))
                    }
                }
            });
        }

        let mut projects = Vec::new();
        let mut errors = Vec::new();

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(Some(Ok((path, count)))) => projects.push(Project::new(path, count)),
                Ok(Some(Err(scan_error))) => errors.push(scan_error),
                Ok(None) => {}
                Err(join_error) => {
                    tracing::error!(error = %join_error, "scanner worker task panicked");
                }
            }
        }

        let totals = projects.iter().map(|p| p.bead_count).sum();

        Ok(ScanResult { projects, totals, duration: started.elapsed(), errors })
    }
}

fn discover_candidates(base_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in std::fs::read_dir(base_dir)? {
        let entry = entry?;
        out.push(entry.path());
    }
    Ok(out)
}

#[cfg(test)]
#[path = "scan_tests.rs"]
mod tests;
