// Configuration unit tests

use image_handler::config::*;
use image_handler::OutputFormat;
use std::io::Write;

#[test]
fn test_can_load_full_config_from_file() {
    let yaml = r#"
aws:
  region: "eu-west-1"
  endpoint: "http://localhost:4566"
  access_key: "test"
  secret_key: "test"
  force_path_style: true
processing:
  default_quality: 70
  max_input_pixels: 1000000
  fallback_format: "webp"
overlay_cache:
  max_entries: 10
  ttl_seconds: 60
watermark:
  enabled: false
logging:
  level: "debug"
  format: "pretty"
"#;
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(yaml.as_bytes())
        .expect("Failed to write config");

    let config = Config::from_file(file.path()).expect("Failed to load config");
    assert_eq!(config.aws.region.as_deref(), Some("eu-west-1"));
    assert!(config.aws.force_path_style);
    assert_eq!(config.processing.default_quality, 70);
    assert_eq!(config.processing.max_input_pixels, 1_000_000);
    assert_eq!(config.processing.fallback_format, OutputFormat::WebP);
    assert_eq!(config.overlay_cache.max_entries, 10);
    assert_eq!(config.overlay_cache.ttl_seconds, 60);
    assert!(!config.watermark.enabled);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert!(config.validate().is_ok());
}

#[test]
fn test_missing_file_is_an_error() {
    let result = Config::from_file("/nonexistent/image-handler.yaml");
    assert!(result.unwrap_err().contains("Failed to read config file"));
}

#[test]
fn test_env_var_substitution_in_credentials() {
    std::env::set_var("IMAGE_HANDLER_TEST_SECRET", "s3cr3t");
    let yaml = r#"
aws:
  access_key: "AKIA"
  secret_key: "${IMAGE_HANDLER_TEST_SECRET}"
"#;
    let config = Config::from_yaml_with_env(yaml).expect("Failed to parse config");
    assert_eq!(config.aws.secret_key.as_deref(), Some("s3cr3t"));
}

#[test]
fn test_unset_env_var_is_rejected() {
    let yaml = r#"
aws:
  region: "${IMAGE_HANDLER_TEST_DEFINITELY_UNSET}"
"#;
    let err = Config::from_yaml_with_env(yaml).unwrap_err();
    assert!(err.contains("IMAGE_HANDLER_TEST_DEFINITELY_UNSET"));
}

#[test]
fn test_validate_rejects_bad_quality() {
    let mut config = Config::default();
    config.processing.default_quality = 0;
    assert!(config.validate().is_err());
    config.processing.default_quality = 101;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_partial_credentials() {
    let mut config = Config::default();
    config.aws.access_key = Some("AKIA".to_string());
    let err = config.validate().unwrap_err();
    assert!(err.contains("must be provided together"));
}

#[test]
fn test_validate_rejects_endpoint_without_scheme() {
    let mut config = Config::default();
    config.aws.endpoint = Some("localhost:4566".to_string());
    assert!(config.validate().is_err());
}

#[test]
fn test_disabled_cache_does_not_need_ttl() {
    let mut config = Config::default();
    config.overlay_cache.max_entries = 0;
    config.overlay_cache.ttl_seconds = 0;
    assert!(config.validate().is_ok());
}
