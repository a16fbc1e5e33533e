// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provider fingerprint detection (spec §4.3 "Kind detection").

use regex::Regex;
use std::sync::OnceLock;

use crate::agent::AgentType;

struct Fingerprints {
    codex: Regex,
    gemini: Regex,
    claude: Regex,
}

// Patterns are fixed string literals checked at authoring time; the
// panic path is unreachable in practice, not a runtime failure mode.
#[allow(clippy::expect_used)]
fn fingerprints() -> &'static Fingerprints {
    static FINGERPRINTS: OnceLock<Fingerprints> = OnceLock::new();
    FINGERPRINTS.get_or_init(|| Fingerprints {
        codex: Regex::new(r"(?i)(\d+(\.\d+)?% context left|OpenAI Codex CLI|codex>)").expect("valid regex"),
        gemini: Regex::new(r"(?i)(gemini[- ]?\d|YOLO mode|Gemini CLI)").expect("valid regex"),
        claude: Regex::new(r"(?i)(claude[- ]?(code|\d)|Anthropic Claude)").expect("valid regex"),
    })
}

/// Apply provider fingerprints in priority order: Codex, then Gemini, then
/// Claude. First match wins; otherwise `Unknown`.
pub fn detect_kind(stripped_text: &str) -> AgentType {
    let fp = fingerprints();
    if fp.codex.is_match(stripped_text) {
        AgentType::Codex
    } else if fp.gemini.is_match(stripped_text) {
        AgentType::Gemini
    } else if fp.claude.is_match(stripped_text) {
        AgentType::Claude
    } else {
        AgentType::Unknown
    }
}
