//! Mock food search for controller and server tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::food::{FoodItem, FoodSource};
use crate::search::{BarcodeOutcome, FoodSearch, SearchOutcome};

/// A recorded call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Query text or barcode.
    pub input: String,
    /// When the call started (tokio clock, so paused tests see virtual time).
    pub started_at: Instant,
}

/// Mock implementation of the FoodSearch trait.
///
/// Returns every configured record whose name contains the query, with a
/// per-query latency so tests can make an older search finish after a
/// newer one.
pub struct MockFoodSearch {
    items: Arc<RwLock<Vec<FoodItem>>>,
    answered_by: FoodSource,
    barcodes: Arc<RwLock<HashMap<String, BarcodeOutcome>>>,
    delays: Arc<RwLock<HashMap<String, Duration>>>,
    searches: Arc<RwLock<Vec<RecordedCall>>>,
    completed: Arc<RwLock<Vec<String>>>,
    lookups: Arc<RwLock<Vec<RecordedCall>>>,
}

impl Default for MockFoodSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFoodSearch {
    pub fn new() -> Self {
        Self {
            items: Arc::new(RwLock::new(Vec::new())),
            answered_by: FoodSource::OpenFoodFacts,
            barcodes: Arc::new(RwLock::new(HashMap::new())),
            delays: Arc::new(RwLock::new(HashMap::new())),
            searches: Arc::new(RwLock::new(Vec::new())),
            completed: Arc::new(RwLock::new(Vec::new())),
            lookups: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn set_items(&self, items: Vec<FoodItem>) {
        *self.items.write().await = items;
    }

    /// Latency for one exact query text.
    pub async fn set_delay_for(&self, query: &str, delay: Duration) {
        self.delays.write().await.insert(query.to_string(), delay);
    }

    /// Outcome returned for a barcode (default: not found).
    pub async fn set_barcode(&self, code: &str, outcome: BarcodeOutcome) {
        self.barcodes.write().await.insert(code.to_string(), outcome);
    }

    /// Queries that reached the search (in call order).
    pub async fn recorded_searches(&self) -> Vec<RecordedCall> {
        self.searches.read().await.clone()
    }

    pub async fn search_count(&self) -> usize {
        self.searches.read().await.len()
    }

    /// Queries whose search ran to completion (not cancelled).
    pub async fn completed_searches(&self) -> Vec<String> {
        self.completed.read().await.clone()
    }

    pub async fn recorded_lookups(&self) -> Vec<RecordedCall> {
        self.lookups.read().await.clone()
    }

    async fn delay_for(&self, input: &str) -> Duration {
        self.delays
            .read()
            .await
            .get(input)
            .copied()
            .unwrap_or(Duration::ZERO)
    }
}

#[async_trait]
impl FoodSearch for MockFoodSearch {
    async fn search(&self, query: &str) -> SearchOutcome {
        self.searches.write().await.push(RecordedCall {
            input: query.to_string(),
            started_at: Instant::now(),
        });

        let delay = self.delay_for(query).await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let query_lower = query.trim().to_lowercase();
        let items: Vec<FoodItem> = self
            .items
            .read()
            .await
            .iter()
            .filter(|item| item.name.to_lowercase().contains(&query_lower))
            .cloned()
            .collect();

        self.completed.write().await.push(query.to_string());

        let answered_by = (!items.is_empty()).then_some(self.answered_by);
        SearchOutcome {
            items,
            answered_by,
            ..SearchOutcome::empty(query)
        }
    }

    async fn lookup_barcode(&self, code: &str) -> BarcodeOutcome {
        self.lookups.write().await.push(RecordedCall {
            input: code.to_string(),
            started_at: Instant::now(),
        });

        let delay = self.delay_for(code).await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.barcodes
            .read()
            .await
            .get(code)
            .cloned()
            .unwrap_or(BarcodeOutcome::NotFound)
    }
}
