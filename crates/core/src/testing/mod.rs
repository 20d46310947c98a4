//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the provider and search
//! traits, allowing the orchestrator, the controller and the server to be
//! tested without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use nutrisearch_core::testing::{fixtures, MockProvider};
//! use nutrisearch_core::search::FallbackSearcher;
//!
//! let off = Arc::new(MockProvider::open_food_facts());
//! let usda = Arc::new(MockProvider::usda());
//! off.push_error(ProviderError::Timeout).await;
//! usda.set_items(vec![fixtures::usda_food("1", "Milk, whole")]).await;
//!
//! let searcher = FallbackSearcher::new(off.clone(), Some(usda), off);
//! ```

mod mock_food_search;
mod mock_provider;

pub use mock_food_search::{MockFoodSearch, RecordedCall};
pub use mock_provider::MockProvider;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::food::{FoodItem, FoodSource};

    /// Create a minimal food record with the given id and name.
    pub fn food(id: &str, name: &str) -> FoodItem {
        let source = if id.starts_with("usda:") {
            FoodSource::Usda
        } else {
            FoodSource::OpenFoodFacts
        };

        FoodItem {
            id: id.to_string(),
            name: name.to_string(),
            brand: None,
            category: None,
            calories: Some(100.0),
            protein: Some(5.0),
            carbs: Some(10.0),
            fat: Some(2.0),
            barcode: None,
            source,
            image_url: None,
            serving_size: "100g".to_string(),
            serving_quantity: None,
            nutri_score: None,
            nova_group: None,
        }
    }

    /// Create an Open Food Facts record whose barcode is `code`.
    pub fn off_food(code: &str, name: &str) -> FoodItem {
        let mut item = food(&FoodSource::OpenFoodFacts.namespaced_id(code), name);
        item.barcode = Some(code.to_string());
        item
    }

    /// Create a USDA record for the given FDC id.
    pub fn usda_food(fdc_id: &str, name: &str) -> FoodItem {
        food(&FoodSource::Usda.namespaced_id(fdc_id), name)
    }
}
