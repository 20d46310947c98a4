//! Provider fallback orchestration.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::cache::SearchCache;
use super::{BarcodeOutcome, FoodSearch, SearchOutcome};
use crate::config::{Config, ProviderKind};
use crate::food::{normalize_barcode, FoodItem};
use crate::metrics::{
    BARCODE_LOOKUPS, FALLBACKS_TOTAL, PROVIDER_REQUESTS, PROVIDER_REQUEST_DURATION,
    PROVIDER_RESULTS, SEARCHES_TOTAL, SEARCH_CACHE_HITS,
};
use crate::providers::{build_provider, FoodProvider, ProviderError};
use crate::ranking::{dedup_by_id, rank_with_cap, RESULT_CAP};

/// Orchestrates text search across a primary and an optional fallback
/// provider, and barcode lookup against a designated provider.
///
/// Only one provider's records are ever returned for a search: the
/// primary's when it yields anything, otherwise the fallback's.
pub struct FallbackSearcher {
    primary: Arc<dyn FoodProvider>,
    fallback: Option<Arc<dyn FoodProvider>>,
    barcode: Arc<dyn FoodProvider>,
    max_results: u32,
    retry_attempts: u32,
    retry_delay: Duration,
    cache: Option<SearchCache>,
}

impl FallbackSearcher {
    /// Create a searcher with no retry and no cache.
    pub fn new(
        primary: Arc<dyn FoodProvider>,
        fallback: Option<Arc<dyn FoodProvider>>,
        barcode: Arc<dyn FoodProvider>,
    ) -> Self {
        Self {
            primary,
            fallback,
            barcode,
            max_results: RESULT_CAP as u32,
            retry_attempts: 1,
            retry_delay: Duration::ZERO,
            cache: None,
        }
    }

    /// Build every configured provider and wire them up.
    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        let search = &config.search;
        let mut built: HashMap<ProviderKind, Arc<dyn FoodProvider>> = HashMap::new();
        let mut provider = |kind: ProviderKind| -> Result<Arc<dyn FoodProvider>, ProviderError> {
            if let Some(existing) = built.get(&kind) {
                return Ok(existing.clone());
            }
            let created = build_provider(kind, &config.providers)?;
            built.insert(kind, created.clone());
            Ok(created)
        };

        let primary = provider(search.primary)?;
        let fallback = search.fallback.map(&mut provider).transpose()?;
        let barcode = provider(search.barcode_provider)?;

        info!(
            primary = search.primary.as_str(),
            fallback = search.fallback.map(|k| k.as_str()).unwrap_or("none"),
            barcode = search.barcode_provider.as_str(),
            "Food search providers configured"
        );

        let mut searcher = Self::new(primary, fallback, barcode)
            .with_max_results(search.max_results)
            .with_retry(search.retry_attempts, Duration::from_millis(search.retry_delay_ms));
        if search.cache_ttl_secs > 0 {
            searcher = searcher.with_cache(Duration::from_secs(search.cache_ttl_secs));
        }
        Ok(searcher)
    }

    /// Cap results per search (clamped to 1..=RESULT_CAP).
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results.clamp(1, RESULT_CAP as u32);
        self
    }

    /// Retry transient provider failures up to `attempts` calls in total,
    /// waiting `delay * attempt` between them.
    pub fn with_retry(mut self, attempts: u32, delay: Duration) -> Self {
        self.retry_attempts = attempts.max(1);
        self.retry_delay = delay;
        self
    }

    /// Cache answered search outcomes for `ttl`.
    pub fn with_cache(mut self, ttl: Duration) -> Self {
        self.cache = Some(SearchCache::new(ttl));
        self
    }

    /// Run a provider call with metrics and bounded retry.
    async fn call_with_retry<T, F, Fut>(
        &self,
        provider: &dyn FoodProvider,
        operation: &'static str,
        mut call: F,
    ) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let tag = provider.source().tag();
        let mut attempt = 1;

        loop {
            let timer = PROVIDER_REQUEST_DURATION
                .with_label_values(&[tag, operation])
                .start_timer();
            let result = call().await;
            timer.observe_duration();

            match result {
                Ok(value) => {
                    PROVIDER_REQUESTS
                        .with_label_values(&[tag, operation, "success"])
                        .inc();
                    return Ok(value);
                }
                Err(e) => {
                    PROVIDER_REQUESTS
                        .with_label_values(&[tag, operation, e.kind()])
                        .inc();

                    if !e.is_transient() || attempt >= self.retry_attempts {
                        return Err(e);
                    }

                    let delay = self.retry_delay * attempt;
                    warn!(
                        provider = tag,
                        operation,
                        attempt,
                        max_attempts = self.retry_attempts,
                        error = %e,
                        "Provider call failed, retrying in {:?}",
                        delay
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn search_provider(
        &self,
        provider: &dyn FoodProvider,
        query: &str,
    ) -> Result<Vec<FoodItem>, ProviderError> {
        let items = self
            .call_with_retry(provider, "search", || {
                provider.search_by_text(query, self.max_results)
            })
            .await?;

        PROVIDER_RESULTS
            .with_label_values(&[provider.source().tag()])
            .observe(items.len() as f64);
        Ok(items)
    }

    fn finish(&self, query: &str, items: Vec<FoodItem>, provider: &dyn FoodProvider) -> SearchOutcome {
        let source = provider.source();
        let items = rank_with_cap(dedup_by_id(items), query, self.max_results as usize);

        SEARCHES_TOTAL.with_label_values(&[source.tag()]).inc();
        info!(
            provider = source.tag(),
            query = %query,
            results = items.len(),
            "Search answered"
        );

        SearchOutcome {
            items,
            answered_by: Some(source),
            ..SearchOutcome::empty(query)
        }
    }

    async fn search_uncached(&self, query: &str) -> SearchOutcome {
        let primary = self.primary.as_ref();

        let reason = match self.search_provider(primary, query).await {
            Ok(items) if !items.is_empty() => return self.finish(query, items, primary),
            Ok(_) => {
                debug!(
                    provider = primary.source().tag(),
                    query = %query,
                    "Primary provider returned no results"
                );
                "empty"
            }
            Err(e) => {
                warn!(
                    provider = primary.source().tag(),
                    query = %query,
                    error = %e,
                    "Primary provider failed"
                );
                "error"
            }
        };

        if let Some(fallback) = self.fallback.as_deref() {
            FALLBACKS_TOTAL.with_label_values(&[reason]).inc();
            match self.search_provider(fallback, query).await {
                Ok(items) if !items.is_empty() => return self.finish(query, items, fallback),
                Ok(_) => {
                    debug!(
                        provider = fallback.source().tag(),
                        query = %query,
                        "Fallback provider returned no results"
                    );
                }
                Err(e) => {
                    warn!(
                        provider = fallback.source().tag(),
                        query = %query,
                        error = %e,
                        "Fallback provider failed"
                    );
                }
            }
        }

        SEARCHES_TOTAL.with_label_values(&["none"]).inc();
        info!(query = %query, "No provider returned results");
        SearchOutcome::empty(query)
    }
}

#[async_trait]
impl FoodSearch for FallbackSearcher {
    async fn search(&self, query: &str) -> SearchOutcome {
        let query = query.trim();
        if query.is_empty() {
            return SearchOutcome::empty(query);
        }

        if let Some(cache) = &self.cache {
            if let Some(outcome) = cache.get(query).await {
                SEARCH_CACHE_HITS.inc();
                debug!(query = %query, "Search served from cache");
                return SearchOutcome {
                    query: query.to_string(),
                    ..outcome
                };
            }
        }

        let outcome = self.search_uncached(query).await;

        if let Some(cache) = &self.cache {
            if outcome.answered_by.is_some() {
                cache.insert(query, outcome.clone()).await;
            }
        }

        outcome
    }

    async fn lookup_barcode(&self, code: &str) -> BarcodeOutcome {
        let provider = self.barcode.as_ref();
        let tag = provider.source().tag();

        let outcome = match normalize_barcode(code) {
            None => {
                debug!(code = %code, "Malformed barcode, skipping lookup");
                BarcodeOutcome::NotFound
            }
            Some(_) if !provider.supports_barcode() => BarcodeOutcome::Unavailable {
                reason: format!("{} does not support barcode lookup", tag),
            },
            Some(code) => {
                match self
                    .call_with_retry(provider, "barcode", || provider.lookup_by_barcode(code))
                    .await
                {
                    Ok(Some(item)) => BarcodeOutcome::Found { item },
                    Ok(None) => BarcodeOutcome::NotFound,
                    Err(e) => {
                        warn!(provider = tag, code = %code, error = %e, "Barcode lookup failed");
                        BarcodeOutcome::Unavailable {
                            reason: e.to_string(),
                        }
                    }
                }
            }
        };

        BARCODE_LOOKUPS.with_label_values(&[outcome.label()]).inc();
        info!(provider = tag, code = %code, outcome = outcome.label(), "Barcode lookup finished");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::food::FoodSource;
    use crate::testing::{fixtures, MockProvider};

    fn searcher(primary: &Arc<MockProvider>, fallback: &Arc<MockProvider>) -> FallbackSearcher {
        FallbackSearcher::new(primary.clone(), Some(fallback.clone()), primary.clone())
    }

    #[tokio::test]
    async fn test_primary_answers() {
        let off = Arc::new(MockProvider::open_food_facts());
        let usda = Arc::new(MockProvider::usda());
        off.set_items(vec![fixtures::off_food("1", "Mjölk")]).await;
        usda.set_items(vec![fixtures::usda_food("2", "Milk")]).await;

        let outcome = searcher(&off, &usda).search("mjölk").await;

        assert_eq!(outcome.answered_by, Some(FoodSource::OpenFoodFacts));
        assert_eq!(outcome.items.len(), 1);
        assert_eq!(usda.search_count().await, 0);
    }

    #[tokio::test]
    async fn test_falls_back_on_transient_error() {
        let off = Arc::new(MockProvider::open_food_facts());
        let usda = Arc::new(MockProvider::usda());
        off.set_items(vec![fixtures::off_food("1", "Mjölk")]).await;
        off.push_error(ProviderError::Timeout).await;
        usda.set_items(vec![fixtures::usda_food("2", "Milk, whole")]).await;

        let outcome = searcher(&off, &usda).search("milk").await;

        assert_eq!(outcome.answered_by, Some(FoodSource::Usda));
        assert_eq!(outcome.items[0].id, "usda:2");
        assert!(outcome.items.iter().all(|i| i.source == FoodSource::Usda));
    }

    #[tokio::test]
    async fn test_falls_back_on_empty_primary() {
        let off = Arc::new(MockProvider::open_food_facts());
        let usda = Arc::new(MockProvider::usda());
        usda.set_items(vec![fixtures::usda_food("2", "Quinoa, cooked")]).await;

        let outcome = searcher(&off, &usda).search("quinoa").await;

        assert_eq!(outcome.answered_by, Some(FoodSource::Usda));
        assert_eq!(off.search_count().await, 1);
        assert_eq!(usda.search_count().await, 1);
    }

    #[tokio::test]
    async fn test_all_providers_exhausted() {
        let off = Arc::new(MockProvider::open_food_facts());
        let usda = Arc::new(MockProvider::usda());
        off.push_error(ProviderError::ConnectionFailed("refused".into())).await;
        usda.push_error(ProviderError::Timeout).await;

        let outcome = searcher(&off, &usda).search("anything").await;

        assert!(outcome.items.is_empty());
        assert_eq!(outcome.answered_by, None);
    }

    #[tokio::test]
    async fn test_empty_query_skips_network() {
        let off = Arc::new(MockProvider::open_food_facts());
        let usda = Arc::new(MockProvider::usda());

        let outcome = searcher(&off, &usda).search("   ").await;

        assert!(outcome.items.is_empty());
        assert_eq!(off.search_count().await, 0);
        assert_eq!(usda.search_count().await, 0);
    }

    #[tokio::test]
    async fn test_results_ranked_deduped_and_capped() {
        let off = Arc::new(MockProvider::open_food_facts());
        let usda = Arc::new(MockProvider::usda());
        let mut items = vec![
            fixtures::off_food("1", "Havremjölk"),
            fixtures::off_food("2", "Mjölkchoklad"),
            fixtures::off_food("3", "Mjölk"),
            fixtures::off_food("3", "Mjölk duplicate"),
        ];
        items.extend((10..90).map(|i| fixtures::off_food(&i.to_string(), &format!("Mjölk {}", i))));
        off.set_items(items).await;

        let outcome = searcher(&off, &usda)
            .with_max_results(50)
            .search("mjölk")
            .await;

        // the provider page holds 50 records, one of them a duplicate id
        assert_eq!(outcome.items.len(), 49);
        assert_eq!(outcome.items[0].name, "Mjölk");
        assert_eq!(
            outcome.items.iter().filter(|i| i.id == "off:3").count(),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_transient_error_on_same_provider() {
        let off = Arc::new(MockProvider::open_food_facts());
        let usda = Arc::new(MockProvider::usda());
        off.set_items(vec![fixtures::off_food("1", "Ost")]).await;
        off.push_error(ProviderError::Timeout).await;

        let outcome = searcher(&off, &usda)
            .with_retry(2, Duration::from_millis(100))
            .search("ost")
            .await;

        assert_eq!(outcome.answered_by, Some(FoodSource::OpenFoodFacts));
        assert_eq!(off.search_count().await, 2);
        assert_eq!(usda.search_count().await, 0);
    }

    #[tokio::test]
    async fn test_cache_serves_repeat_queries() {
        let off = Arc::new(MockProvider::open_food_facts());
        let usda = Arc::new(MockProvider::usda());
        off.set_items(vec![fixtures::off_food("1", "Smör")]).await;

        let searcher = searcher(&off, &usda).with_cache(Duration::from_secs(60));
        let first = searcher.search("smör").await;
        let second = searcher.search("SMÖR ").await;

        assert_eq!(first.items, second.items);
        assert_eq!(second.query, "SMÖR");
        assert_eq!(off.search_count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_error_is_not_retried() {
        let off = Arc::new(MockProvider::open_food_facts());
        let usda = Arc::new(MockProvider::usda());
        off.set_items(vec![fixtures::off_food("1", "Ost")]).await;
        off.push_error(ProviderError::ApiError {
            status: 400,
            message: "bad request".to_string(),
        })
        .await;
        usda.set_items(vec![fixtures::usda_food("2", "Cheese, ost")]).await;

        let outcome = searcher(&off, &usda)
            .with_retry(3, Duration::from_millis(100))
            .search("ost")
            .await;

        // a 4xx falls straight through to the fallback
        assert_eq!(off.search_count().await, 1);
        assert_eq!(outcome.answered_by, Some(FoodSource::Usda));
    }

    #[tokio::test]
    async fn test_barcode_outcomes_are_distinct() {
        let off = Arc::new(MockProvider::open_food_facts());
        let usda = Arc::new(MockProvider::usda());
        off.add_barcode("7310865004703", fixtures::off_food("7310865004703", "Mellanmjölk"))
            .await;
        let searcher = searcher(&off, &usda);

        match searcher.lookup_barcode("7310865004703").await {
            BarcodeOutcome::Found { item } => assert_eq!(item.name, "Mellanmjölk"),
            other => panic!("expected found, got {:?}", other),
        }

        assert_eq!(
            searcher.lookup_barcode("00000000").await,
            BarcodeOutcome::NotFound
        );

        off.push_error(ProviderError::Timeout).await;
        assert!(matches!(
            searcher.lookup_barcode("7310865004703").await,
            BarcodeOutcome::Unavailable { .. }
        ));
    }

    #[tokio::test]
    async fn test_barcode_unsupported_provider() {
        let off = Arc::new(MockProvider::open_food_facts());
        let usda = Arc::new(MockProvider::usda());
        let searcher = FallbackSearcher::new(off.clone(), None, usda.clone());

        assert!(matches!(
            searcher.lookup_barcode("7310865004703").await,
            BarcodeOutcome::Unavailable { .. }
        ));
        assert_eq!(usda.barcode_count().await, 0);
    }
}
