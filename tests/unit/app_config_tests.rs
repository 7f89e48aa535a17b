/*!
 * Tests for application configuration
 */

use anyhow::Result;

use livesub::app_config::{Config, LogLevel};

use crate::common;

#[test]
fn test_default_config_shouldMatchDocumentedDefaults() {
    let config = Config::default();
    assert_eq!(config.reconcile.anchor_length, 50);
    assert_eq!(config.reconcile.resync_threshold, 10);
    assert_eq!(config.reconcile.ambiguous_threshold, 6);
    assert_eq!(config.reconcile.min_fallback_overlap, 1);
    assert_eq!(config.reconcile.soft_reset_unit_window, 5);
    assert_eq!(config.reconcile.history_retain_chars, 3000);
    assert_eq!(config.assembler.append_time_ceiling_secs, 5.0);
    assert_eq!(config.assembler.append_length_cap, 300);
    assert_eq!(config.session.channel_capacity, 256);
    assert_eq!(config.session.replay_step_ms, 200);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withInvalidValues_shouldFail() {
    let cases: Vec<Box<dyn Fn(&mut Config)>> = vec![
        Box::new(|c| c.reconcile.anchor_length = 0),
        Box::new(|c| c.reconcile.resync_threshold = 0),
        Box::new(|c| c.reconcile.ambiguous_threshold = 0),
        Box::new(|c| c.reconcile.soft_reset_unit_window = 0),
        Box::new(|c| c.reconcile.history_retain_chars = 10),
        Box::new(|c| c.assembler.append_time_ceiling_secs = f64::NAN),
        Box::new(|c| c.assembler.append_time_ceiling_secs = 0.0),
        Box::new(|c| c.assembler.append_length_cap = 0),
        Box::new(|c| c.session.channel_capacity = 0),
    ];

    for (idx, mutate) in cases.iter().enumerate() {
        let mut config = Config::default();
        mutate(&mut config);
        assert!(config.validate().is_err(), "case {} should be rejected", idx);
    }
}

#[test]
fn test_config_saveAndLoad_shouldPreserveValues() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("livesub.json");

    let mut config = Config::default();
    config.reconcile.anchor_length = 24;
    config.log_level = LogLevel::Debug;
    config.save(&path)?;

    let loaded = Config::from_file(&path)?;
    assert_eq!(loaded, config);
    Ok(())
}

#[test]
fn test_config_fromFile_withPartialJson_shouldFillDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "partial.json",
        r#"{"assembler": {"append_length_cap": 120}}"#,
    )?;

    let config = Config::from_file(&path)?;
    assert_eq!(config.assembler.append_length_cap, 120);
    assert_eq!(config.assembler.append_time_ceiling_secs, 5.0);
    assert_eq!(config.reconcile.anchor_length, 50);
    Ok(())
}

#[test]
fn test_config_fromFile_withBadInput_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    assert!(Config::from_file(temp_dir.path().join("missing.json")).is_err());

    let path = common::create_test_file(temp_dir.path(), "bad.json", "{ not json")?;
    let err = Config::from_file(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
    Ok(())
}

#[test]
fn test_logLevel_fromStr_shouldBeCaseInsensitive() {
    assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
    assert!("loud".parse::<LogLevel>().is_err());
    assert_eq!(LogLevel::Warn.to_level_filter(), log::LevelFilter::Warn);
}
