use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::food::{FoodItem, FoodSource};

/// Result of one orchestrated text search.
///
/// `items` come from exactly one provider; `answered_by` names it, or is
/// `None` when every provider failed or came back empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    pub query: String,
    pub items: Vec<FoodItem>,
    pub answered_by: Option<FoodSource>,
    pub completed_at: DateTime<Utc>,
}

impl SearchOutcome {
    /// An outcome with no results and no answering provider.
    pub fn empty(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            items: Vec::new(),
            answered_by: None,
            completed_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Result of a barcode lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BarcodeOutcome {
    /// The provider knows this barcode.
    Found { item: FoodItem },
    /// The provider definitively reported the barcode as unknown.
    NotFound,
    /// The lookup failed (network, timeout, decode, unsupported).
    Unavailable { reason: String },
}

impl BarcodeOutcome {
    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            BarcodeOutcome::Found { .. } => "found",
            BarcodeOutcome::NotFound => "not_found",
            BarcodeOutcome::Unavailable { .. } => "unavailable",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::food;

    #[test]
    fn test_empty_outcome() {
        let outcome = SearchOutcome::empty("mjölk");
        assert!(outcome.is_empty());
        assert_eq!(outcome.answered_by, None);
        assert_eq!(outcome.query, "mjölk");
    }

    #[test]
    fn test_barcode_outcome_serialization() {
        let found = BarcodeOutcome::Found {
            item: food("off:1", "Mjölk"),
        };
        let json = serde_json::to_value(&found).unwrap();
        assert_eq!(json["status"], "found");
        assert_eq!(json["item"]["name"], "Mjölk");

        let json = serde_json::to_value(BarcodeOutcome::NotFound).unwrap();
        assert_eq!(json["status"], "not_found");

        let json = serde_json::to_value(BarcodeOutcome::Unavailable {
            reason: "Request timed out".to_string(),
        })
        .unwrap();
        assert_eq!(json["status"], "unavailable");
        assert_eq!(json["reason"], "Request timed out");
    }

    #[test]
    fn test_search_outcome_camel_case() {
        let outcome = SearchOutcome {
            query: "egg".to_string(),
            items: vec![],
            answered_by: Some(FoodSource::Usda),
            completed_at: Utc::now(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["answeredBy"], "usda");
        assert!(json.get("completedAt").is_some());
    }
}
