/*!
 * Tests for application configuration functionality
 */

use anyhow::Result;
use transheet::app_config::{Config, LogLevel, TranslationProvider};

use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    // Test default values
    assert_eq!(config.source_language, "vi");
    assert_eq!(config.target_language, "zh");
    assert_eq!(config.glossary_path, "glossary.json");
    assert_eq!(config.translation.provider, TranslationProvider::Gemini);

    // Test translation values
    assert_eq!(config.translation.model, "gemini-1.5-flash-latest");
    assert_eq!(config.translation.chunk_size, 150);
    assert_eq!(config.translation.retry_count, 3);
    assert_eq!(config.translation.retry_backoff_ms, 1000);
    assert_eq!(config.translation.timeout_secs, 60);

    // Test job engine values
    assert_eq!(config.jobs.upload_dir, "uploads");
    assert_eq!(config.jobs.download_dir, "downloads");
    assert_eq!(config.jobs.max_concurrent_jobs, 4);
    assert_eq!(config.jobs.record_retention_secs, 3600);
    assert_eq!(config.jobs.sweep_interval_secs, 300);

    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    // Start with a valid mock-provider config
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Mock;
    assert!(config.validate().is_ok());

    // Invalid source language
    config.source_language = "xyz".to_string();
    assert!(config.validate().is_err());
    config.source_language = "vi".to_string();

    // Invalid target language
    config.target_language = String::new();
    assert!(config.validate().is_err());
    config.target_language = "zh".to_string();

    // Empty glossary path
    config.glossary_path = "  ".to_string();
    assert!(config.validate().is_err());
    config.glossary_path = "glossary.json".to_string();

    // Zero chunk size
    config.translation.chunk_size = 0;
    assert!(config.validate().is_err());
    config.translation.chunk_size = 150;

    // Zero worker pool
    config.jobs.max_concurrent_jobs = 0;
    assert!(config.validate().is_err());
    config.jobs.max_concurrent_jobs = 4;

    assert!(config.validate().is_ok());
}

/// Test that the gemini provider requires an API key and a parseable endpoint
#[test]
fn test_config_validation_withGeminiProvider_shouldRequireCredentials() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Gemini;
    config.translation.api_key = String::new();

    // No key anywhere fails; setting one in the config passes.
    // The environment fallback is not exercised here since the test
    // runner may carry a real key.
    if std::env::var("GEMINI_API_KEY").unwrap_or_default().is_empty() {
        assert!(config.validate().is_err());
    }

    config.translation.api_key = "test-key".to_string();
    assert!(config.validate().is_ok());

    // A key with a malformed endpoint still fails
    config.translation.endpoint = "not a url".to_string();
    assert!(config.validate().is_err());
}

/// Test saving and loading a configuration round trip
#[test]
fn test_config_saveAndLoad_shouldRoundTrip() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config_path = temp_dir.path().join("conf.json");

    let mut config = Config::default();
    config.source_language = "vie".to_string();
    config.translation.provider = TranslationProvider::Mock;
    config.translation.chunk_size = 25;
    config.jobs.max_concurrent_jobs = 2;

    config.save(&config_path)?;
    let loaded = Config::from_file(&config_path)?;

    assert_eq!(loaded.source_language, "vie");
    assert_eq!(loaded.translation.provider, TranslationProvider::Mock);
    assert_eq!(loaded.translation.chunk_size, 25);
    assert_eq!(loaded.jobs.max_concurrent_jobs, 2);

    Ok(())
}

/// Test that missing fields take defaults when loading a sparse file
#[test]
fn test_config_fromFile_withSparseJson_shouldFillDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config_path = common::create_test_file(
        &temp_dir.path().to_path_buf(),
        "sparse.json",
        r#"{"source_language": "vi", "target_language": "zh"}"#,
    )?;

    let loaded = Config::from_file(&config_path)?;

    assert_eq!(loaded.translation.chunk_size, 150);
    assert_eq!(loaded.jobs.upload_dir, "uploads");
    assert_eq!(loaded.log_level, LogLevel::Info);

    Ok(())
}

/// Test that loading a missing file reports the path
#[test]
fn test_config_fromFile_withMissingFile_shouldFail() {
    let result = Config::from_file("definitely_missing_conf.json");
    assert!(result.is_err());
    let message = format!("{}", result.unwrap_err());
    assert!(message.contains("definitely_missing_conf.json"));
}

/// Test that loading malformed JSON fails with a parse error
#[test]
fn test_config_fromFile_withMalformedJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config_path = common::create_test_file(
        &temp_dir.path().to_path_buf(),
        "broken.json",
        "{not json at all",
    )?;

    let result = Config::from_file(&config_path);
    assert!(result.is_err());
    assert!(format!("{}", result.unwrap_err()).contains("Failed to parse"));

    Ok(())
}

/// Test provider identifier parsing and display
#[test]
fn test_translationProvider_parseAndDisplay_shouldRoundTrip() {
    assert_eq!("gemini".parse::<TranslationProvider>().unwrap(), TranslationProvider::Gemini);
    assert_eq!("MOCK".parse::<TranslationProvider>().unwrap(), TranslationProvider::Mock);
    assert!("openai".parse::<TranslationProvider>().is_err());

    assert_eq!(TranslationProvider::Gemini.to_string(), "gemini");
    assert_eq!(TranslationProvider::Mock.display_name(), "Mock");
}
