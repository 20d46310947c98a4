use serde::Serialize;

use crate::food::{FoodItem, FoodSource};
use crate::search::BarcodeOutcome;

/// Lifecycle of the current query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPhase {
    /// No query; nothing shown, nothing in flight.
    Idle,
    /// Query received, debounce timer running.
    Pending,
    /// Request in flight.
    Searching,
    /// Latest request finished and its results are published.
    Settled,
}

/// A barcode scan and, once known, its outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarcodeScan {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<BarcodeOutcome>,
}

/// Everything a UI needs to render the search box state.
///
/// `seq` and `query` together form the ticket of the latest request;
/// background tasks only publish when their captured ticket still matches.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSnapshot {
    pub seq: u64,
    pub query: String,
    pub phase: SearchPhase,
    pub results: Vec<FoodItem>,
    pub loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answered_by: Option<FoodSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<BarcodeScan>,
}

impl SearchSnapshot {
    pub fn idle(seq: u64) -> Self {
        Self {
            seq,
            query: String::new(),
            phase: SearchPhase::Idle,
            results: Vec::new(),
            loading: false,
            answered_by: None,
            barcode: None,
        }
    }
}

impl Default for SearchSnapshot {
    fn default() -> Self {
        Self::idle(0)
    }
}

/// Identity of one request: monotonically increasing sequence plus the
/// query text it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub seq: u64,
    pub query: String,
}

impl Ticket {
    /// Whether this ticket still names the latest request.
    pub fn matches(&self, snapshot: &SearchSnapshot) -> bool {
        self.seq == snapshot.seq && self.query == snapshot.query
    }
}
