//! Third-party food database clients.
//!
//! Each provider wraps one remote API, decodes its payload in two stages
//! (strict typed decode, then lenient key-by-key extraction) and normalizes
//! the raw records into [`FoodItem`]s.

pub mod lenient;
pub mod normalize;
mod open_food_facts;
mod usda;

pub use open_food_facts::{OffProduct, OpenFoodFactsClient, OpenFoodFactsConfig};
pub use usda::{FdcFood, FdcNutrient, UsdaClient, UsdaConfig};

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{ProviderKind, ProvidersConfig};
use crate::food::{FoodItem, FoodSource};

/// User agent sent with every provider request.
pub const USER_AGENT: &str = concat!(
    "nutrisearch/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/nutrisearch/nutrisearch)"
);

/// Errors that can occur when talking to a food provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request exceeded the provider timeout.
    #[error("Request timed out")]
    Timeout,

    /// Could not reach the provider.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Provider answered with a non-success status.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Neither the strict nor the lenient decoder could read the payload.
    #[error("Failed to decode response: {0}")]
    DecodeError(String),

    /// Operation not offered by this provider.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Client not configured (missing API key, etc.).
    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl ProviderError {
    /// Whether repeating the same call could succeed.
    ///
    /// Only server-side (5xx) and rate-limit (429) API statuses qualify;
    /// other 4xx responses would fail the same way again.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::ApiError { status, .. } => *status >= 500 || *status == 429,
            ProviderError::Unsupported(_) | ProviderError::NotConfigured(_) => false,
            _ => true,
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::HttpError(_) => "http",
            ProviderError::Timeout => "timeout",
            ProviderError::ConnectionFailed(_) => "connection",
            ProviderError::ApiError { .. } => "api",
            ProviderError::DecodeError(_) => "decode",
            ProviderError::Unsupported(_) => "unsupported",
            ProviderError::NotConfigured(_) => "not_configured",
        }
    }
}

/// Map a transport error from reqwest into a provider error.
pub(crate) fn map_request_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout
    } else if e.is_connect() {
        ProviderError::ConnectionFailed(e.to_string())
    } else {
        ProviderError::HttpError(e)
    }
}

/// A remote food database.
///
/// Implementations return already-normalized records; records that cannot
/// be normalized (no name, no id) are dropped silently.
#[async_trait]
pub trait FoodProvider: Send + Sync {
    /// Which source tag this provider stamps on its records.
    fn source(&self) -> FoodSource;

    /// Whether [`FoodProvider::lookup_by_barcode`] is meaningful.
    fn supports_barcode(&self) -> bool {
        false
    }

    /// Free-text search returning up to `max_results` records.
    async fn search_by_text(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<FoodItem>, ProviderError>;

    /// Look up a single product by barcode.
    ///
    /// `Ok(None)` means the provider definitively reported "not found".
    async fn lookup_by_barcode(&self, _code: &str) -> Result<Option<FoodItem>, ProviderError> {
        Err(ProviderError::Unsupported(format!(
            "{} does not support barcode lookup",
            self.source()
        )))
    }
}

/// Build the client for a configured provider.
pub fn build_provider(
    kind: ProviderKind,
    config: &ProvidersConfig,
) -> Result<Arc<dyn FoodProvider>, ProviderError> {
    match kind {
        ProviderKind::OpenFoodFacts => {
            let cfg = config.open_food_facts.clone().ok_or_else(|| {
                ProviderError::NotConfigured("open_food_facts section missing".to_string())
            })?;
            Ok(Arc::new(OpenFoodFactsClient::new(cfg)?))
        }
        ProviderKind::Usda => {
            let cfg = config.usda.clone().ok_or_else(|| {
                ProviderError::NotConfigured("usda section missing".to_string())
            })?;
            Ok(Arc::new(UsdaClient::new(cfg)?))
        }
    }
}
