//! Common test utilities for in-process API testing with mocks.
//!
//! The fixture wires the real router and the real fallback orchestrator to
//! mock providers, so handlers are exercised end to end without network.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use nutrisearch_core::{testing::MockProvider, Config, FallbackSearcher};
use nutrisearch_server::{api::create_router, state::AppState};

/// Re-export fixtures for test convenience
#[allow(unused_imports)]
pub use nutrisearch_core::testing::fixtures;

/// In-process server with controllable providers.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_search() {
///     let fixture = TestFixture::new();
///     fixture.off.set_items(vec![fixtures::off_food("1", "Ost")]).await;
///
///     let response = fixture.get("/api/v1/foods/search?q=ost").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    pub router: Router,
    /// Primary and barcode provider
    pub off: Arc<MockProvider>,
    /// Fallback provider
    pub usda: Arc<MockProvider>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let off = Arc::new(MockProvider::open_food_facts());
        let usda = Arc::new(MockProvider::usda());
        let search = FallbackSearcher::new(off.clone(), Some(usda.clone()), off.clone())
            .with_max_results(config.search.max_results);

        let state = Arc::new(AppState::new(config, Arc::new(search)));
        let router = create_router(state);

        Self { router, off, usda }
    }

    /// Send a GET request to the router.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
        };

        TestResponse { status, body }
    }
}
