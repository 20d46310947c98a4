//! USDA FoodData Central API client.
//!
//! FoodData Central requires an API key (a free `DEMO_KEY` exists but is
//! heavily rate limited). It has no barcode endpoint worth using for
//! packaged goods, so this provider is text-search only.

mod normalize;
mod raw;

pub use normalize::normalize;
pub use raw::{FdcFood, FdcNutrient};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{map_request_error, FoodProvider, ProviderError, USER_AGENT};
use crate::food::{FoodItem, FoodSource};

const DEFAULT_BASE_URL: &str = "https://api.nal.usda.gov/fdc/v1";
const MAX_PAGE_SIZE: u32 = 200;
const DATA_TYPES: &str = "Foundation,SR Legacy,Branded";

fn default_timeout_secs() -> u64 {
    10
}

/// FoodData Central client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsdaConfig {
    /// API key (required).
    pub api_key: String,
    /// Base URL (default: https://api.nal.usda.gov/fdc/v1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// FoodData Central API client.
pub struct UsdaClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl UsdaClient {
    /// Create a new FoodData Central client.
    pub fn new(config: UsdaConfig) -> Result<Self, ProviderError> {
        if config.api_key.trim().is_empty() {
            return Err(ProviderError::NotConfigured(
                "USDA API key is required".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        let base_url = config
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key,
        })
    }

    /// Full-text search returning raw foods.
    pub async fn search_raw(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<FdcFood>, ProviderError> {
        let url = format!("{}/foods/search", self.base_url);
        let page_size = max_results.clamp(1, MAX_PAGE_SIZE).to_string();

        debug!(query = %query, page_size = %page_size, "USDA text search");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("query", query),
                ("pageSize", page_size.as_str()),
                ("dataType", DATA_TYPES),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if status == 401 || status == 403 {
            return Err(ProviderError::NotConfigured(
                "Invalid USDA API key".to_string(),
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await.map_err(map_request_error)?;
        raw::decode_search(&body)
    }
}

#[async_trait]
impl FoodProvider for UsdaClient {
    fn source(&self) -> FoodSource {
        FoodSource::Usda
    }

    async fn search_by_text(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<FoodItem>, ProviderError> {
        let foods = self.search_raw(query, max_results).await?;
        let total = foods.len();
        let items: Vec<FoodItem> = foods.iter().filter_map(normalize).collect();

        debug!(received = total, kept = items.len(), "USDA search normalized");

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_api_key() {
        let result = UsdaClient::new(UsdaConfig {
            api_key: "  ".to_string(),
            base_url: None,
            timeout_secs: 10,
        });
        assert!(matches!(result, Err(ProviderError::NotConfigured(_))));
    }

    #[test]
    fn test_default_base_url() {
        let client = UsdaClient::new(UsdaConfig {
            api_key: "key".to_string(),
            base_url: None,
            timeout_secs: 10,
        })
        .unwrap();
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
    }

    #[tokio::test]
    async fn test_barcode_unsupported() {
        let client = UsdaClient::new(UsdaConfig {
            api_key: "key".to_string(),
            base_url: None,
            timeout_secs: 10,
        })
        .unwrap();
        assert!(!client.supports_barcode());
        let err = client.lookup_by_barcode("7310865004703").await.unwrap_err();
        assert!(matches!(err, ProviderError::Unsupported(_)));
    }
}
