//! In-memory TTL cache of orchestrated search outcomes.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use super::SearchOutcome;

struct CacheEntry<T> {
    data: T,
    expires_at: Instant,
}

/// Outcome cache keyed by lower-cased, trimmed query text.
pub struct SearchCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry<SearchOutcome>>>,
}

impl SearchCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn key(query: &str) -> String {
        query.trim().to_lowercase()
    }

    pub async fn get(&self, query: &str) -> Option<SearchOutcome> {
        let entries = self.entries.read().await;
        entries
            .get(&Self::key(query))
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.data.clone())
    }

    pub async fn insert(&self, query: &str, outcome: SearchOutcome) {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            Self::key(query),
            CacheEntry {
                data: outcome,
                expires_at: now + self.ttl,
            },
        );
    }

    pub async fn entry_count(&self) -> usize {
        self.entries.read().await.len()
    }
}
