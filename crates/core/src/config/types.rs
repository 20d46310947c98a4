use serde::{Deserialize, Deserializer, Serialize};
use std::net::{IpAddr, Ipv4Addr};

use crate::food::FoodSource;
use crate::providers::{OpenFoodFactsConfig, UsdaConfig};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Available food providers
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    OpenFoodFacts,
    Usda,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenFoodFacts => "open_food_facts",
            ProviderKind::Usda => "usda",
        }
    }

    /// Source tag stamped on records from this provider.
    pub fn source(&self) -> FoodSource {
        match self {
            ProviderKind::OpenFoodFacts => FoodSource::OpenFoodFacts,
            ProviderKind::Usda => FoodSource::Usda,
        }
    }
}

/// Search orchestration settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Provider asked first (default: open_food_facts)
    #[serde(default = "default_primary")]
    pub primary: ProviderKind,
    /// Provider asked when the primary fails or returns nothing (default: usda).
    /// `"none"` disables the fallback.
    #[serde(default = "default_fallback", deserialize_with = "deserialize_fallback")]
    pub fallback: Option<ProviderKind>,
    /// Provider used for barcode lookups (default: open_food_facts)
    #[serde(default = "default_primary")]
    pub barcode_provider: ProviderKind,
    /// Maximum results returned per search, 1-50 (default: 50)
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    /// Keystroke debounce in milliseconds (default: 200)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Lifetime of cached search outcomes; 0 disables the cache (default: 300)
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Attempts per provider call, 1-3 (default: 1, no retry)
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// Base delay between attempts, multiplied by the attempt number (default: 250)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            primary: default_primary(),
            fallback: default_fallback(),
            barcode_provider: default_primary(),
            max_results: default_max_results(),
            debounce_ms: default_debounce_ms(),
            cache_ttl_secs: default_cache_ttl_secs(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

fn default_primary() -> ProviderKind {
    ProviderKind::OpenFoodFacts
}

fn default_fallback() -> Option<ProviderKind> {
    Some(ProviderKind::Usda)
}

fn deserialize_fallback<'de, D>(deserializer: D) -> Result<Option<ProviderKind>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(rename_all = "snake_case")]
    enum Choice {
        None,
        OpenFoodFacts,
        Usda,
    }

    Ok(match Choice::deserialize(deserializer)? {
        Choice::None => None,
        Choice::OpenFoodFacts => Some(ProviderKind::OpenFoodFacts),
        Choice::Usda => Some(ProviderKind::Usda),
    })
}

fn default_max_results() -> u32 {
    50
}

fn default_debounce_ms() -> u64 {
    200
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_retry_attempts() -> u32 {
    1
}

fn default_retry_delay_ms() -> u64 {
    250
}

/// Per-provider client settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProvidersConfig {
    /// Open Food Facts needs no key, so it is configured by default
    #[serde(default = "default_open_food_facts")]
    pub open_food_facts: Option<OpenFoodFactsConfig>,
    #[serde(default)]
    pub usda: Option<UsdaConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            open_food_facts: default_open_food_facts(),
            usda: None,
        }
    }
}

fn default_open_food_facts() -> Option<OpenFoodFactsConfig> {
    Some(OpenFoodFactsConfig::default())
}

impl ProvidersConfig {
    /// Whether a provider has a configuration section.
    pub fn is_configured(&self, kind: ProviderKind) -> bool {
        match kind {
            ProviderKind::OpenFoodFacts => self.open_food_facts.is_some(),
            ProviderKind::Usda => self.usda.is_some(),
        }
    }

    /// Configured timeout for a provider, if it has a section.
    pub fn timeout_secs(&self, kind: ProviderKind) -> Option<u64> {
        match kind {
            ProviderKind::OpenFoodFacts => self.open_food_facts.as_ref().map(|c| c.timeout_secs),
            ProviderKind::Usda => self.usda.as_ref().map(|c| c.timeout_secs),
        }
    }
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub search: SearchConfig,
    pub providers: SanitizedProvidersConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedProvidersConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_food_facts: Option<OpenFoodFactsConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usda: Option<SanitizedUsdaConfig>,
}

/// Sanitized USDA config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedUsdaConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub api_key_configured: bool,
    pub timeout_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            search: config.search.clone(),
            providers: SanitizedProvidersConfig {
                open_food_facts: config.providers.open_food_facts.clone(),
                usda: config.providers.usda.as_ref().map(|u| SanitizedUsdaConfig {
                    base_url: u.base_url.clone(),
                    api_key_configured: !u.api_key.trim().is_empty(),
                    timeout_secs: u.timeout_secs,
                }),
            },
        }
    }
}
