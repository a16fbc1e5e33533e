// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Qualitative flag derivation (spec §4.3 "Flag derivation").

use crate::agent::AgentType;

use super::config::ParserConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flags {
    pub rate_limited: bool,
    pub in_error: bool,
    pub context_low: bool,
    pub idle: bool,
    pub working: bool,
}

pub struct FlagInputs<'a> {
    pub stripped_text: &'a str,
    pub kind: AgentType,
    pub context_remaining: Option<f64>,
}

pub fn derive_flags(config: &ParserConfig, input: &FlagInputs<'_>) -> Flags {
    let lower = input.stripped_text.to_ascii_lowercase();

    let rate_limited = config.limit_phrases_for(input.kind).iter().any(|phrase| lower.contains(&phrase.to_ascii_lowercase()));
    let in_error = config.error_phrases.iter().any(|phrase| lower.contains(&phrase.to_ascii_lowercase()));
    let context_low = input.context_remaining.map(|pct| pct < config.context_low_threshold).unwrap_or(false);
    let idle = tail_ends_in_prompt_token(input.stripped_text, &config.prompt_tokens);
    let mut working = config.work_indicators.iter().any(|indicator| lower.contains(&indicator.to_ascii_lowercase()));

    // Precedence rule (spec §4.3, critical): idle forces working false. A
    // work indicator may still appear in recent history after the agent
    // returned to the prompt.
    if idle {
        working = false;
    }

    Flags { rate_limited, in_error, context_low, idle, working }
}

/// Hand-rolled tail scan for a shell/CLI prompt token, per the design notes
/// (the terminator set is tiny and the call is hot; a regex engine is
/// unwarranted overhead here).
fn tail_ends_in_prompt_token(text: &str, tokens: &[String]) -> bool {
    let trimmed = text.trim_end_matches(|c: char| c.is_whitespace());
    if trimmed.is_empty() {
        return false;
    }
    let Some(last_line) = trimmed.rsplit('\n').next() else {
        return false;
    };
    let last_line = last_line.trim_end();

    tokens.iter().any(|token| last_line.ends_with(token.as_str()))
}

#[cfg(test)]
#[path = "flags_tests.rs"]
mod tests;
