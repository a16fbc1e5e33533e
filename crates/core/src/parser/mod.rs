// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal-Output Parser (spec §4.3, component C9): turn a raw pane
//! buffer into a structured [`AgentState`].

pub mod ansi;
pub mod config;
pub mod confidence;
pub mod features;
pub mod flags;
pub mod kind;
pub mod recommend;

use serde::{Deserialize, Serialize};

use crate::agent::AgentType;

pub use config::ParserConfig;
pub use flags::Flags;
pub use recommend::Recommendation;

/// Parser output: identity, quantitative features, qualitative flags, the
/// derived recommendation, and scoring evidence (spec §3 "AgentState").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentState {
    pub kind: AgentType,
    pub parsed_at_epoch_ms: u64,
    pub context_remaining: Option<f64>,
    pub tokens_used: Option<u64>,
    pub memory_mb: Option<f64>,
    pub flags: Flags,
    pub raw_sample: String,
    pub recommendation: Recommendation,
    pub confidence: f64,
}

pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn parse(&self, raw_pane_output: &str, parsed_at_epoch_ms: u64) -> AgentState {
        let stripped = ansi::strip_ansi(raw_pane_output);
        let raw_sample = ansi::tail_chars(&stripped, self.config.raw_sample_chars);

        let kind = kind::detect_kind(&stripped);
        let context_remaining = features::extract_context_remaining(&stripped);
        let tokens_used = features::extract_tokens_used(&stripped);
        let memory_mb = features::extract_memory_mb(&stripped);

        let flag_inputs = flags::FlagInputs { stripped_text: &stripped, kind, context_remaining };
        let derived_flags = flags::derive_flags(&self.config, &flag_inputs);

        let has_explicit_rate_limit_phrase = self
            .config
            .limit_phrases_for(kind)
            .iter()
            .any(|phrase| stripped.to_ascii_lowercase().contains(&phrase.to_ascii_lowercase()));

        let confidence_inputs = confidence::ConfidenceInputs {
            kind,
            has_explicit_percentage: context_remaining.is_some(),
            has_explicit_rate_limit_phrase,
            has_explicit_prompt_token: derived_flags.idle,
            flags: derived_flags,
        };

        AgentState {
            kind,
            parsed_at_epoch_ms,
            context_remaining,
            tokens_used,
            memory_mb,
            flags: derived_flags,
            raw_sample,
            recommendation: recommend::recommend(derived_flags),
            confidence: confidence::score(&confidence_inputs),
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
