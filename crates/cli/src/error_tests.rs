use super::*;

#[test]
fn policy_rejection_maps_to_its_own_code() {
    let error = anyhow::Error::new(NtmError::PolicyRejection { reason: "max retries".into() });
    assert_eq!(exit_code_for(&error), ExitCode::PolicyRejection);
    assert_eq!(ExitCode::PolicyRejection.code(), 20);
}

#[test]
fn fatal_config_maps_to_config_error() {
    let error = anyhow::Error::new(NtmError::FatalConfig { detail: "bad tier thresholds".into() });
    assert_eq!(exit_code_for(&error), ExitCode::ConfigError);
}

#[test]
fn unclassified_errors_map_to_internal() {
    let error = anyhow::anyhow!("boom");
    assert_eq!(exit_code_for(&error), ExitCode::Internal);
}
