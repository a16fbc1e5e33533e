// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pattern tables and thresholds for the terminal-output parser. Table-
//! driven per the design notes: immutable startup-built tables keyed by
//! agent kind, not a class hierarchy.

use crate::agent::AgentType;

#[derive(Debug, Clone)]
pub struct ParserConfig {
    pub raw_sample_chars: usize,
    pub context_low_threshold: f64,
    pub limit_phrases_default: Vec<String>,
    pub limit_phrases_by_agent: Vec<(AgentType, Vec<String>)>,
    pub error_phrases: Vec<String>,
    pub work_indicators: Vec<String>,
    pub prompt_tokens: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            raw_sample_chars: 500,
            context_low_threshold: 20.0,
            limit_phrases_default: vec![
                "rate limit".to_owned(),
                "usage limit reached".to_owned(),
                "please try again later".to_owned(),
                "quota exceeded".to_owned(),
            ],
            limit_phrases_by_agent: vec![
                (AgentType::Claude, vec!["claude usage limit reached".to_owned()]),
                (AgentType::Codex, vec!["you've hit your usage limit".to_owned()]),
                (AgentType::Gemini, vec!["resource has been exhausted".to_owned()]),
            ],
            error_phrases: vec![
                "fatal error".to_owned(),
                "unhandled exception".to_owned(),
                "traceback (most recent call last)".to_owned(),
                "panicked at".to_owned(),
                "error:".to_owned(),
            ],
            work_indicators: vec![
                "```".to_owned(),
                "writing to".to_owned(),
                "reading".to_owned(),
                "created".to_owned(),
                "modified".to_owned(),
                "running".to_owned(),
                "testing".to_owned(),
            ],
            prompt_tokens: vec![
                "$".to_owned(),
                "%".to_owned(),
                ">".to_owned(),
                "#".to_owned(),
                "❯".to_owned(),
                "codex>".to_owned(),
                "Human:".to_owned(),
            ],
        }
    }
}

impl ParserConfig {
    pub fn limit_phrases_for(&self, kind: AgentType) -> Vec<&str> {
        let mut phrases: Vec<&str> = self.limit_phrases_default.iter().map(String::as_str).collect();
        if let Some((_, extra)) = self.limit_phrases_by_agent.iter().find(|(agent, _)| *agent == kind) {
            phrases.extend(extra.iter().map(String::as_str));
        }
        phrases
    }
}
