// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Quantitative feature extraction (spec §4.3 "Feature extraction").

use regex::Regex;
use std::sync::OnceLock;

struct FeaturePatterns {
    context_remaining: Regex,
    tokens_used: Regex,
    memory_mb: Regex,
}

// Patterns are fixed string literals checked at authoring time; the
// panic path is unreachable in practice, not a runtime failure mode.
#[allow(clippy::expect_used)]
fn patterns() -> &'static FeaturePatterns {
    static PATTERNS: OnceLock<FeaturePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| FeaturePatterns {
        context_remaining: Regex::new(r"(\d+(?:\.\d+)?)%\s*context left").expect("valid regex"),
        tokens_used: Regex::new(r"total=(\d+)").expect("valid regex"),
        memory_mb: Regex::new(r"(\d+\.\d+)\s*MB").expect("valid regex"),
    })
}

pub fn extract_context_remaining(text: &str) -> Option<f64> {
    patterns().context_remaining.captures(text)?.get(1)?.as_str().parse().ok()
}

pub fn extract_tokens_used(text: &str) -> Option<u64> {
    patterns().tokens_used.captures(text)?.get(1)?.as_str().parse().ok()
}

pub fn extract_memory_mb(text: &str) -> Option<f64> {
    patterns().memory_mb.captures(text)?.get(1)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_context_remaining_percent() {
        assert_eq!(extract_context_remaining("47% context left · ? for shortcuts"), Some(47.0));
    }

    #[test]
    fn extracts_tokens_used() {
        assert_eq!(extract_tokens_used("tokens: input=120 output=45 total=165"), Some(165));
    }

    #[test]
    fn extracts_memory_mb() {
        assert_eq!(extract_memory_mb("status: 512.3 MB resident"), Some(512.3));
    }

    #[test]
    fn missing_features_are_none() {
        assert_eq!(extract_context_remaining("nothing here"), None);
        assert_eq!(extract_tokens_used("nothing here"), None);
        assert_eq!(extract_memory_mb("nothing here"), None);
    }
}
