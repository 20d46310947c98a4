//! Canonical food record shared by every provider.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which provider produced a record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FoodSource {
    /// Open Food Facts (barcode-indexed product database).
    #[serde(rename = "off")]
    OpenFoodFacts,
    /// USDA FoodData Central.
    #[serde(rename = "usda")]
    Usda,
}

impl FoodSource {
    /// Short tag used as the id namespace and in logs/metrics.
    pub fn tag(&self) -> &'static str {
        match self {
            FoodSource::OpenFoodFacts => "off",
            FoodSource::Usda => "usda",
        }
    }

    /// Build a provider-namespaced id from a native id.
    pub fn namespaced_id(&self, native_id: &str) -> String {
        format!("{}:{}", self.tag(), native_id)
    }
}

impl fmt::Display for FoodSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Nutri-Score grade, passed through from the provider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NutriScore {
    A,
    B,
    C,
    D,
    E,
}

impl FromStr for NutriScore {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" => Ok(NutriScore::A),
            "b" => Ok(NutriScore::B),
            "c" => Ok(NutriScore::C),
            "d" => Ok(NutriScore::D),
            "e" => Ok(NutriScore::E),
            other => Err(format!("unknown nutri-score grade: {}", other)),
        }
    }
}

/// Canonical food record.
///
/// Built fresh per search from a provider payload and never mutated
/// afterwards. `calories` is per serving when the provider declared a
/// positive serving quantity, otherwise per 100 g/ml. Macronutrients are
/// always per 100 g/ml.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FoodItem {
    /// Provider-namespaced id, e.g. `off:7310865004703`.
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    pub source: FoodSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Human-readable serving, e.g. "100g" or "250 ml".
    pub serving_size: String,
    /// Serving quantity in grams or millilitres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serving_quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutri_score: Option<NutriScore>,
    /// NOVA processing group, 1-4.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nova_group: Option<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaced_id() {
        assert_eq!(
            FoodSource::OpenFoodFacts.namespaced_id("7310865004703"),
            "off:7310865004703"
        );
        assert_eq!(FoodSource::Usda.namespaced_id("2345678"), "usda:2345678");
    }

    #[test]
    fn test_nutri_score_parse() {
        assert_eq!("a".parse::<NutriScore>(), Ok(NutriScore::A));
        assert_eq!(" E ".parse::<NutriScore>(), Ok(NutriScore::E));
        assert!("unknown".parse::<NutriScore>().is_err());
        assert!("".parse::<NutriScore>().is_err());
    }

    #[test]
    fn test_food_item_serializes_camel_case() {
        let item = FoodItem {
            id: "off:1".to_string(),
            name: "Mjölk".to_string(),
            brand: None,
            category: None,
            calories: Some(64.0),
            protein: None,
            carbs: None,
            fat: None,
            barcode: Some("1".to_string()),
            source: FoodSource::OpenFoodFacts,
            image_url: Some("https://img/1.jpg".to_string()),
            serving_size: "100g".to_string(),
            serving_quantity: None,
            nutri_score: Some(NutriScore::B),
            nova_group: Some(1),
        };

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["source"], "off");
        assert_eq!(json["imageUrl"], "https://img/1.jpg");
        assert_eq!(json["servingSize"], "100g");
        assert_eq!(json["nutriScore"], "B");
        assert_eq!(json["novaGroup"], 1);
        assert!(json.get("brand").is_none());
    }
}
