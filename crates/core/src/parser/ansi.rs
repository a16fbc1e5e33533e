// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ANSI escape-sequence stripping, applied before all pattern matching.

use regex::Regex;
use std::sync::OnceLock;

// The pattern is a fixed string literal checked at authoring time; the
// panic path is unreachable in practice, not a runtime failure mode.
#[allow(clippy::expect_used)]
fn ansi_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\x1b(\[[0-9;?]*[a-zA-Z]|\][^\x07]*\x07|[@-_])").expect("static ANSI pattern is valid")
    })
}

/// Remove ANSI color/cursor escape sequences from `raw`.
pub fn strip_ansi(raw: &str) -> String {
    ansi_pattern().replace_all(raw, "").into_owned()
}

/// Keep the last `n` characters of `text`, counted in Unicode scalar
/// values rather than bytes.
pub fn tail_chars(text: &str, n: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= n {
        return text.to_owned();
    }
    text.chars().skip(char_count - n).collect()
}
