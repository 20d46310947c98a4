//! Mock food provider for testing.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::food::{FoodItem, FoodSource};
use crate::providers::{FoodProvider, ProviderError};

/// A query handler that produces results dynamically based on the query.
type QueryHandler = Box<dyn Fn(&str) -> Option<Vec<FoodItem>> + Send + Sync>;

/// Mock implementation of the FoodProvider trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable records and barcode hits
/// - Track text queries and barcode lookups for assertions
/// - Inject errors for the next calls
/// - Simulate latency
///
/// # Example
///
/// ```rust,ignore
/// use nutrisearch_core::testing::{MockProvider, fixtures};
///
/// let provider = MockProvider::open_food_facts();
/// provider.set_items(vec![fixtures::off_food("1", "Mjölk")]).await;
/// provider.push_error(ProviderError::Timeout).await;
///
/// // first call fails, second returns the record
/// assert!(provider.search_by_text("mjölk", 10).await.is_err());
/// assert_eq!(provider.search_by_text("mjölk", 10).await?.len(), 1);
/// ```
pub struct MockProvider {
    source: FoodSource,
    supports_barcode: bool,
    /// Records returned by text search (filtered by name).
    items: Arc<RwLock<Vec<FoodItem>>>,
    /// Records returned by barcode lookup.
    barcodes: Arc<RwLock<HashMap<String, FoodItem>>>,
    /// Errors returned by the next calls, oldest first.
    errors: Arc<RwLock<VecDeque<ProviderError>>>,
    /// Recorded text queries.
    searches: Arc<RwLock<Vec<String>>>,
    /// Recorded barcode lookups.
    lookups: Arc<RwLock<Vec<String>>>,
    /// Simulated latency per call.
    delay: Arc<RwLock<Option<Duration>>>,
    query_handler: Arc<RwLock<Option<QueryHandler>>>,
}

impl std::fmt::Debug for MockProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockProvider")
            .field("source", &self.source)
            .field("supports_barcode", &self.supports_barcode)
            .field("query_handler", &"<handler>")
            .finish()
    }
}

impl MockProvider {
    /// Create a mock provider stamping records with `source`.
    pub fn new(source: FoodSource, supports_barcode: bool) -> Self {
        Self {
            source,
            supports_barcode,
            items: Arc::new(RwLock::new(Vec::new())),
            barcodes: Arc::new(RwLock::new(HashMap::new())),
            errors: Arc::new(RwLock::new(VecDeque::new())),
            searches: Arc::new(RwLock::new(Vec::new())),
            lookups: Arc::new(RwLock::new(Vec::new())),
            delay: Arc::new(RwLock::new(None)),
            query_handler: Arc::new(RwLock::new(None)),
        }
    }

    /// Barcode-capable mock tagged `off`.
    pub fn open_food_facts() -> Self {
        Self::new(FoodSource::OpenFoodFacts, true)
    }

    /// Text-only mock tagged `usda`.
    pub fn usda() -> Self {
        Self::new(FoodSource::Usda, false)
    }

    /// Set the records returned by text search.
    pub async fn set_items(&self, items: Vec<FoodItem>) {
        *self.items.write().await = items;
    }

    /// Register a record for a barcode.
    pub async fn add_barcode(&self, code: &str, item: FoodItem) {
        self.barcodes.write().await.insert(code.to_string(), item);
    }

    /// Queue an error for the next call (search or barcode).
    pub async fn push_error(&self, error: ProviderError) {
        self.errors.write().await.push_back(error);
    }

    /// Simulate latency on every call.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// Set a handler that decides results from the query string.
    ///
    /// Returning `None` falls through to the configured records.
    pub async fn set_query_handler<F>(&self, handler: F)
    where
        F: Fn(&str) -> Option<Vec<FoodItem>> + Send + Sync + 'static,
    {
        *self.query_handler.write().await = Some(Box::new(handler));
    }

    /// Recorded text queries.
    pub async fn recorded_searches(&self) -> Vec<String> {
        self.searches.read().await.clone()
    }

    pub async fn search_count(&self) -> usize {
        self.searches.read().await.len()
    }

    /// Recorded barcode lookups.
    pub async fn recorded_lookups(&self) -> Vec<String> {
        self.lookups.read().await.clone()
    }

    pub async fn barcode_count(&self) -> usize {
        self.lookups.read().await.len()
    }

    async fn simulate_latency(&self) {
        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    async fn take_error(&self) -> Option<ProviderError> {
        self.errors.write().await.pop_front()
    }
}

#[async_trait]
impl FoodProvider for MockProvider {
    fn source(&self) -> FoodSource {
        self.source
    }

    fn supports_barcode(&self) -> bool {
        self.supports_barcode
    }

    async fn search_by_text(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<FoodItem>, ProviderError> {
        self.searches.write().await.push(query.to_string());
        self.simulate_latency().await;

        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        let handler = self.query_handler.read().await;
        if let Some(ref h) = *handler {
            if let Some(items) = h(query) {
                return Ok(items.into_iter().take(max_results as usize).collect());
            }
        }
        drop(handler);

        let query_lower = query.to_lowercase();
        Ok(self
            .items
            .read()
            .await
            .iter()
            .filter(|item| item.name.to_lowercase().contains(&query_lower))
            .take(max_results as usize)
            .cloned()
            .collect())
    }

    async fn lookup_by_barcode(&self, code: &str) -> Result<Option<FoodItem>, ProviderError> {
        if !self.supports_barcode {
            return Err(ProviderError::Unsupported(format!(
                "{} does not support barcode lookup",
                self.source
            )));
        }

        self.lookups.write().await.push(code.to_string());
        self.simulate_latency().await;

        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        Ok(self.barcodes.read().await.get(code).cloned())
    }
}
