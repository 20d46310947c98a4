use super::{
    types::{Config, ProviderKind},
    ConfigError,
};

const MAX_PROVIDER_TIMEOUT_SECS: u64 = 10;
const MAX_DEBOUNCE_MS: u64 = 5000;
const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Provider timeouts are within 1-10 seconds
/// - Debounce, retry and result limits are in range
/// - Primary and fallback differ, and every selected provider is configured
/// - USDA has an API key when configured
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    let search = &config.search;
    if search.debounce_ms == 0 || search.debounce_ms > MAX_DEBOUNCE_MS {
        return Err(ConfigError::ValidationError(format!(
            "search.debounce_ms must be between 1 and {}",
            MAX_DEBOUNCE_MS
        )));
    }
    if search.retry_attempts == 0 || search.retry_attempts > MAX_RETRY_ATTEMPTS {
        return Err(ConfigError::ValidationError(format!(
            "search.retry_attempts must be between 1 and {}",
            MAX_RETRY_ATTEMPTS
        )));
    }
    if search.max_results == 0 || search.max_results as usize > crate::ranking::RESULT_CAP {
        return Err(ConfigError::ValidationError(format!(
            "search.max_results must be between 1 and {}",
            crate::ranking::RESULT_CAP
        )));
    }
    if search.fallback == Some(search.primary) {
        return Err(ConfigError::ValidationError(
            "search.fallback must differ from search.primary".to_string(),
        ));
    }

    let selected = [Some(search.primary), search.fallback, Some(search.barcode_provider)];
    for kind in selected.into_iter().flatten() {
        if !config.providers.is_configured(kind) {
            return Err(ConfigError::ValidationError(format!(
                "provider '{}' is selected but providers.{} is missing",
                kind.as_str(),
                kind.as_str()
            )));
        }
    }

    for kind in [ProviderKind::OpenFoodFacts, ProviderKind::Usda] {
        if let Some(timeout) = config.providers.timeout_secs(kind) {
            if timeout == 0 || timeout > MAX_PROVIDER_TIMEOUT_SECS {
                return Err(ConfigError::ValidationError(format!(
                    "providers.{}.timeout_secs must be between 1 and {}",
                    kind.as_str(),
                    MAX_PROVIDER_TIMEOUT_SECS
                )));
            }
        }
    }

    if let Some(usda) = &config.providers.usda {
        if usda.api_key.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "providers.usda.api_key cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProvidersConfig, SearchConfig, ServerConfig};
    use crate::providers::UsdaConfig;
    use std::net::IpAddr;

    fn valid_config() -> Config {
        Config {
            server: ServerConfig::default(),
            search: SearchConfig::default(),
            providers: ProvidersConfig {
                usda: Some(UsdaConfig {
                    api_key: "key".to_string(),
                    base_url: None,
                    timeout_secs: 10,
                }),
                ..Default::default()
            },
        }
    }

    fn assert_invalid(config: &Config) {
        let result = validate_config(config);
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = valid_config();
        config.server = ServerConfig {
            host: "0.0.0.0".parse::<IpAddr>().unwrap(),
            port: 0,
        };
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_timeout_range() {
        let mut config = valid_config();
        config.providers.usda.as_mut().unwrap().timeout_secs = 30;
        assert_invalid(&config);

        let mut config = valid_config();
        config.providers.open_food_facts.as_mut().unwrap().timeout_secs = 0;
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_search_ranges() {
        let mut config = valid_config();
        config.search.debounce_ms = 0;
        assert_invalid(&config);

        let mut config = valid_config();
        config.search.retry_attempts = 4;
        assert_invalid(&config);

        let mut config = valid_config();
        config.search.max_results = 51;
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_primary_equals_fallback() {
        let mut config = valid_config();
        config.search.fallback = Some(ProviderKind::OpenFoodFacts);
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_selected_provider_missing() {
        let mut config = valid_config();
        config.providers.usda = None;
        assert_invalid(&config);

        config.search.fallback = None;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_usda_requires_key() {
        let mut config = valid_config();
        config.providers.usda.as_mut().unwrap().api_key = String::new();
        assert_invalid(&config);
    }
}
