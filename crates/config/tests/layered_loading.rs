//! Layered settings loading: default file, environment file, environment
//! variables, validation

use sales_agent_config::{load_settings_from, ConfigError, PersistenceBackend};
use std::fs;

#[test]
fn test_environment_file_overrides_default() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("default.yaml"),
        "server:\n  port: 9000\nscoring:\n  tiers:\n    hot: 80\n    warm: 60\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("staging.yaml"),
        "environment: staging\nserver:\n  port: 9100\npersistence:\n  backend: json\n  data_dir: /tmp/sales-agent\n",
    )
    .unwrap();

    let base = dir.path().to_str().unwrap();
    let settings = load_settings_from(base, None).unwrap();
    assert_eq!(settings.server.port, 9000);
    assert_eq!(settings.scoring.tiers.hot, 80);
    assert_eq!(settings.persistence.backend, PersistenceBackend::Memory);

    let staged = load_settings_from(base, Some("staging")).unwrap();
    assert_eq!(staged.server.port, 9100);
    assert_eq!(staged.scoring.tiers.warm, 60);
    assert_eq!(staged.persistence.backend, PersistenceBackend::Json);
}

#[test]
fn test_missing_files_fall_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let settings = load_settings_from(dir.path().to_str().unwrap(), Some("production")).unwrap();
    assert_eq!(settings.pipeline.probabilities.negotiation, 0.8);
}

#[test]
fn test_invalid_file_value_is_startup_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("default.yaml"),
        "pipeline:\n  probabilities:\n    proposal: 0.9\n",
    )
    .unwrap();

    let err = load_settings_from(dir.path().to_str().unwrap(), None).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
}

#[test]
fn test_environment_variables_override_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("default.yaml"),
        "server:\n  timeout_seconds: 10\nobservability:\n  log_level: warn\n",
    )
    .unwrap();

    // Keys not asserted by other tests in this binary, which share the process env
    std::env::set_var("SALES_AGENT_SERVER__TIMEOUT_SECONDS", "45");
    std::env::set_var("SALES_AGENT_OBSERVABILITY__LOG_LEVEL", "debug");
    let loaded = load_settings_from(dir.path().to_str().unwrap(), None);
    std::env::remove_var("SALES_AGENT_SERVER__TIMEOUT_SECONDS");
    std::env::remove_var("SALES_AGENT_OBSERVABILITY__LOG_LEVEL");

    let settings = loaded.unwrap();
    assert_eq!(settings.server.timeout_seconds, 45);
    assert_eq!(settings.observability.log_level, "debug");
}
