//! Orchestrated food search.
//!
//! [`FoodSearch`] is the seam between the interactive controller (or the
//! HTTP surface) and the provider layer. It never returns an error: every
//! provider failure collapses into an empty outcome or an
//! [`BarcodeOutcome::Unavailable`].

mod cache;
mod fallback;
mod types;

pub use cache::SearchCache;
pub use fallback::FallbackSearcher;
pub use types::*;

use async_trait::async_trait;

/// Text search and barcode lookup over one or more providers.
#[async_trait]
pub trait FoodSearch: Send + Sync {
    /// Search by free text. Empty or whitespace-only queries return an
    /// empty outcome without touching the network.
    async fn search(&self, query: &str) -> SearchOutcome;

    /// Look up a single product by barcode.
    async fn lookup_barcode(&self, code: &str) -> BarcodeOutcome;
}
