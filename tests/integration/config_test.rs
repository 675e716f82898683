//! Integration tests for configuration management
//!
//! These tests verify that the configuration system works correctly
//! across module boundaries.

use flac_bridge::audio::Session;
use flac_bridge::config::Settings;
use std::error::Error;
use tempfile::tempdir;

#[cfg(test)]
mod config_integration_tests {
    use super::*;

    /// Test complete configuration workflow
    #[test]
    fn test_config_lifecycle() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let config_path = dir.path().join("config.json");

        let mut settings = Settings::default();
        settings.plugin_name = "oggflac".to_string();
        settings.track_extension = "oga".to_string();
        settings.buffer_capacity_hint = 32768;

        settings.validate()?;
        settings.save(&config_path)?;

        let loaded = Settings::load(&config_path)?;
        assert_eq!(loaded, settings);

        let session = Session::with_buffer_capacity(loaded.buffer_capacity_hint);
        assert_eq!(session.buffer().capacity(), 32768);

        let mut updated = loaded;
        updated.log_filter = "flac_bridge=trace".to_string();
        updated.save(&config_path)?;

        let reloaded = Settings::load(&config_path)?;
        assert_eq!(reloaded.log_filter, "flac_bridge=trace");

        Ok(())
    }

    /// Test invalid configuration handling
    #[test]
    fn test_invalid_config_validation() {
        let invalid_settings = Settings {
            plugin_name: String::new(),
            ..Settings::default()
        };

        let result = invalid_settings.validate();
        assert!(result.is_err());

        if let Err(e) = result {
            assert!(e.to_string().contains("Plugin name cannot be empty"));
        }
    }
}
