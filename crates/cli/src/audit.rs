// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only JSONL hash-chain reader + verifier for the audit log NTM never
//! writes to itself (spec §6): `~/.local/share/ntm/audit/{session}-{date}.jsonl`.
//!
//! `sequence_num` is treated as scoped to a single log file (one
//! session+date); the reader does not assume continuity across the day
//! rollover that the filename scheme already encodes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Command,
    Spawn,
    Send,
    Response,
    Error,
    StateChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Actor {
    User,
    Agent,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: String,
    pub session_id: String,
    pub event_type: EventType,
    pub actor: Actor,
    pub target: String,
    pub payload: serde_json::Value,
    pub metadata: serde_json::Value,
    pub prev_hash: String,
    pub checksum: String,
    pub sequence_num: u64,
}

impl AuditEntry {
    /// SHA-256 hex digest of the record as it would appear on the wire with
    /// `checksum` blanked, matching how the writer computes it.
    fn computed_checksum(&self) -> String {
        let mut blanked = self.clone();
        blanked.checksum = String::new();
        let bytes = serde_json::to_vec(&blanked).unwrap_or_default();
        let digest = Sha256::digest(&bytes);
        hex_encode(&digest)
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

/// Parses the minimal subset of RFC3339 the audit log emits
/// (`YYYY-MM-DDTHH:MM:SS(.fff)?Z`) into epoch-millisecond. Returns `None` on
/// any deviation rather than attempting general RFC3339 parsing.
pub fn parse_rfc3339_to_epoch_ms(timestamp: &str) -> Option<u64> {
    let ts = timestamp.strip_suffix('Z')?;
    let (date, time) = ts.split_once('T')?;

    let mut date_parts = date.split('-');
    let year: i64 = date_parts.next()?.parse().ok()?;
    let month: u32 = date_parts.next()?.parse().ok()?;
    let day: u32 = date_parts.next()?.parse().ok()?;
    if date_parts.next().is_some() {
        return None;
    }

    let (hms, millis) = match time.split_once('.') {
        Some((hms, frac)) => (hms, frac.parse::<u64>().ok()?),
        None => (time, 0),
    };
    let mut time_parts = hms.split(':');
    let hour: u32 = time_parts.next()?.parse().ok()?;
    let minute: u32 = time_parts.next()?.parse().ok()?;
    let second: u32 = time_parts.next()?.parse().ok()?;
    if time_parts.next().is_some() {
        return None;
    }

    let days_since_epoch = days_from_civil(year, month, day)?;
    let seconds = days_since_epoch * 86_400
        + i64::from(hour) * 3600
        + i64::from(minute) * 60
        + i64::from(second);
    let millis_total = seconds.checked_mul(1000)? + millis as i64;
    u64::try_from(millis_total).ok()
}

/// Howard Hinnant's civil-from-days algorithm, inverted: days since the Unix
/// epoch for a given proleptic-Gregorian calendar date.
fn days_from_civil(year: i64, month: u32, day: u32) -> Option<i64> {
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    let y = if month <= 2 { year - 1 } else { year };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = (y - era * 400) as i64;
    let mp = (i64::from(month) + 9) % 12;
    let doy = (153 * mp + 2) / 5 + i64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    Some(era * 146_097 + doe - 719_468)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainViolation {
    PrevHashMismatch { sequence_num: u64 },
    ChecksumMismatch { sequence_num: u64 },
    SequenceNotMonotonic { expected: u64, found: u64 },
}

#[derive(Debug, Clone, Default)]
pub struct VerifyReport {
    pub entry_count: usize,
    pub violations: Vec<ChainViolation>,
}

impl VerifyReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

pub struct AuditReader {
    audit_dir: PathBuf,
}

impl AuditReader {
    pub fn new(audit_dir: impl Into<PathBuf>) -> Self {
        Self { audit_dir: audit_dir.into() }
    }

    /// Extracts the `YYYY-MM-DD` suffix from a log filename of the form
    /// `{session}-{YYYY-MM-DD}.jsonl`.
    pub fn date_suffix_from_filename(filename: &str) -> Option<&str> {
        let stem = filename.strip_suffix(".jsonl")?;
        let (_, date) = stem.rsplit_once('-')?;
        let parts: Vec<&str> = date.split('-').collect();
        if parts.len() == 3 && parts[0].len() == 4 {
            Some(date)
        } else {
            None
        }
    }

    pub fn log_path(&self, session_id: &str, date: &str) -> PathBuf {
        self.audit_dir.join(format!("{session_id}-{date}.jsonl"))
    }

    /// Reads and parses every well-formed line of the given log file.
    /// Malformed lines are skipped, not fatal.
    pub fn read_entries(&self, path: &Path) -> anyhow::Result<Vec<AuditEntry>> {
        let contents = std::fs::read_to_string(path)?;
        Ok(contents.lines().filter_map(|line| serde_json::from_str(line).ok()).collect())
    }

    /// Verifies `prev_hash`/`checksum` chaining and `sequence_num` strict
    /// monotonicity starting at 1, within this file only.
    pub fn verify(&self, entries: &[AuditEntry]) -> VerifyReport {
        let mut report = VerifyReport { entry_count: entries.len(), violations: Vec::new() };
        let mut prior_checksum: Option<&str> = None;
        let mut expected_seq = 1u64;

        for entry in entries {
            if entry.sequence_num != expected_seq {
                report.violations.push(ChainViolation::SequenceNotMonotonic {
                    expected: expected_seq,
                    found: entry.sequence_num,
                });
            }
            expected_seq = entry.sequence_num + 1;

            match prior_checksum {
                Some(prev) if prev != entry.prev_hash => {
                    report.violations.push(ChainViolation::PrevHashMismatch { sequence_num: entry.sequence_num });
                }
                _ => {}
            }

            if entry.computed_checksum() != entry.checksum {
                report.violations.push(ChainViolation::ChecksumMismatch { sequence_num: entry.sequence_num });
            }

            prior_checksum = Some(&entry.checksum);
        }

        report
    }

    /// Reads and verifies one session+date log file in one step.
    pub fn read_and_verify(&self, session_id: &str, date: &str) -> anyhow::Result<VerifyReport> {
        let path = self.log_path(session_id, date);
        let entries = self.read_entries(&path)?;
        Ok(self.verify(&entries))
    }
}

#[cfg(test)]
#[path = "audit_tests.rs"]
mod tests;
