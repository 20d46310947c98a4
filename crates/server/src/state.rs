use std::sync::Arc;
use std::time::Duration;

use nutrisearch_core::{Config, FoodSearch, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    search: Arc<dyn FoodSearch>,
}

impl AppState {
    pub fn new(config: Config, search: Arc<dyn FoodSearch>) -> Self {
        Self { config, search }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn search(&self) -> Arc<dyn FoodSearch> {
        Arc::clone(&self.search)
    }

    /// Keystroke debounce for live search connections.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.config.search.debounce_ms)
    }

    /// Upper bound for the `limit` query parameter.
    pub fn max_results(&self) -> usize {
        self.config.search.max_results as usize
    }
}
