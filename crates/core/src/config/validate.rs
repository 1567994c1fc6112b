use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Cache slot names are usable as relative paths
/// - Model name is set and sampling parameters are in range
///
/// A missing API key is deliberately not checked; it surfaces as a query failure.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.cache.directory_slot.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "cache.directory_slot cannot be empty".to_string(),
        ));
    }

    let details_dir = config.cache.details_dir.trim();
    if details_dir.is_empty() {
        return Err(ConfigError::ValidationError(
            "cache.details_dir cannot be empty".to_string(),
        ));
    }
    if details_dir.contains(['/', '\\']) || details_dir == ".." || details_dir == "." {
        return Err(ConfigError::ValidationError(format!(
            "cache.details_dir must be a single directory name, got {:?}",
            config.cache.details_dir
        )));
    }

    if config.llm.model.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "llm.model cannot be empty".to_string(),
        ));
    }
    if config.llm.max_tokens == 0 {
        return Err(ConfigError::ValidationError(
            "llm.max_tokens cannot be 0".to_string(),
        ));
    }
    if config.llm.timeout_secs == Some(0) {
        return Err(ConfigError::ValidationError(
            "llm.timeout_secs cannot be 0".to_string(),
        ));
    }
    if !(0.0..=2.0).contains(&config.llm.temperature) {
        return Err(ConfigError::ValidationError(format!(
            "llm.temperature must be between 0.0 and 2.0, got {}",
            config.llm.temperature
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CacheConfig, LlmConfig};

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_without_api_key_is_ok() {
        let config = Config {
            llm: LlmConfig {
                api_key: None,
                api_key_env: "CARSCOUT_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_details_dir_with_separator_fails() {
        let config = Config {
            cache: CacheConfig {
                details_dir: "../elsewhere".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_empty_model_fails() {
        let config = Config {
            llm: LlmConfig {
                model: "  ".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_timeout_fails() {
        let config = Config {
            llm: LlmConfig {
                timeout_secs: Some(0),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_temperature_out_of_range_fails() {
        let config = Config {
            llm: LlmConfig {
                temperature: 3.5,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }
}
