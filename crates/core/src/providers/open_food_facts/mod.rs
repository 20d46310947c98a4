//! Open Food Facts API client.
//!
//! Open Food Facts is free and keyless but asks clients to send a
//! descriptive User-Agent. It indexes products by barcode.

mod normalize;
mod raw;

pub use normalize::normalize;
pub use raw::{OffNutriments, OffProduct};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{map_request_error, FoodProvider, ProviderError, USER_AGENT};
use crate::food::{FoodItem, FoodSource};
use raw::ProductLookup;

const DEFAULT_BASE_URL: &str = "https://world.openfoodfacts.org";
const MAX_PAGE_SIZE: u32 = 100;

/// Fields requested from the API; everything the normalizer reads.
const FIELDS: &str = "code,product_name,product_name_en,generic_name,abbreviated_product_name,\
brands,categories_tags,nutriments,image_front_small_url,image_small_url,image_url,\
serving_size,serving_quantity,nutriscore_grade,nova_group";

fn default_timeout_secs() -> u64 {
    10
}

/// Open Food Facts client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenFoodFactsConfig {
    /// Base URL (default: https://world.openfoodfacts.org).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OpenFoodFactsConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Open Food Facts API client.
pub struct OpenFoodFactsClient {
    client: Client,
    base_url: String,
}

impl OpenFoodFactsClient {
    /// Create a new Open Food Facts client.
    pub fn new(config: OpenFoodFactsConfig) -> Result<Self, ProviderError> {
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

        Ok(Self { client, base_url })
    }

    /// Full-text search returning raw products.
    pub async fn search_raw(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<OffProduct>, ProviderError> {
        let url = format!("{}/cgi/search.pl", self.base_url);
        let page_size = max_results.clamp(1, MAX_PAGE_SIZE).to_string();

        debug!(query = %query, page_size = %page_size, "OFF text search");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("search_terms", query),
                ("search_simple", "1"),
                ("action", "process"),
                ("json", "1"),
                ("page_size", page_size.as_str()),
                ("fields", FIELDS),
            ])
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
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

    /// Look up a raw product by barcode.
    pub async fn lookup_raw(&self, code: &str) -> Result<Option<OffProduct>, ProviderError> {
        let url = format!(
            "{}/api/v2/product/{}.json",
            self.base_url,
            urlencoding::encode(code)
        );

        debug!(code = %code, "OFF barcode lookup");

        let response = self
            .client
            .get(&url)
            .query(&[("fields", FIELDS)])
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_request_error)?;

        // v2 answers unknown barcodes with 404 plus `status: 0`
        if !status.is_success() {
            if raw::product_status(&body) == Some(0) {
                return Ok(None);
            }
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        match raw::decode_product(&body)? {
            ProductLookup::Found(product) => Ok(Some(product)),
            ProductLookup::NotFound => Ok(None),
        }
    }
}

#[async_trait]
impl FoodProvider for OpenFoodFactsClient {
    fn source(&self) -> FoodSource {
        FoodSource::OpenFoodFacts
    }

    fn supports_barcode(&self) -> bool {
        true
    }

    async fn search_by_text(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<FoodItem>, ProviderError> {
        let products = self.search_raw(query, max_results).await?;
        let total = products.len();
        let items: Vec<FoodItem> = products.iter().filter_map(normalize).collect();

        debug!(
            received = total,
            kept = items.len(),
            "OFF search normalized"
        );

        Ok(items)
    }

    async fn lookup_by_barcode(&self, code: &str) -> Result<Option<FoodItem>, ProviderError> {
        Ok(self.lookup_raw(code).await?.as_ref().and_then(normalize))
    }
}
