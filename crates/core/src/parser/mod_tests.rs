use super::*;

/// Spec §8 scenario 2: Codex idle with 47% context.
#[test]
fn codex_idle_with_context_percentage() {
    let parser = Parser::new(ParserConfig::default());
    let state = parser.parse("47% context left · ? for shortcuts\ncodex> ", 0);

    assert_eq!(state.kind, AgentType::Codex);
    assert_eq!(state.context_remaining, Some(47.0));
    assert!(state.flags.idle);
    assert!(!state.flags.working);
    assert_eq!(state.recommendation, Recommendation::SafeToRestart);
    assert!(state.confidence >= 0.7);
}

/// Spec §8 scenario 3: "stuck-in-working" regression.
#[test]
fn stuck_in_working_regression() {
    let parser = Parser::new(ParserConfig::default());
    let state = parser.parse("earlier the agent was testing the suite\n> ", 0);

    assert!(state.flags.idle);
    assert!(!state.flags.working);
    assert_eq!(state.recommendation, Recommendation::SafeToRestart);
}

#[test]
fn unknown_kind_forces_low_confidence() {
    let parser = Parser::new(ParserConfig::default());
    let state = parser.parse("plain shell output\n$ ", 0);

    assert_eq!(state.kind, AgentType::Unknown);
    assert!(state.confidence <= 0.3);
}

#[test]
fn raw_sample_is_truncated_to_configured_length() {
    let mut config = ParserConfig::default();
    config.raw_sample_chars = 10;
    let parser = Parser::new(config);

    let state = parser.parse("0123456789abcdefghij", 0);
    assert_eq!(state.raw_sample, "abcdefghij");
}

#[test]
fn ansi_sequences_are_stripped_before_matching() {
    let parser = Parser::new(ParserConfig::default());
    let state = parser.parse("\x1b[31mRate limit exceeded\x1b[0m, please try again later", 0);
    assert!(state.flags.rate_limited);
}

#[test]
fn recommendation_is_total_for_every_flag_combination() {
    let parser = Parser::new(ParserConfig::default());
    for text in ["", "$ ", "running a build", "fatal error: boom", "rate limit hit"] {
        let state = parser.parse(text, 0);
        // recommend() is exhaustive over Flags, so this always succeeds;
        // asserting it ran at all is the point here.
        let _ = state.recommendation;
    }
}
