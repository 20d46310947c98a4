//! FoodData Central wire types and the two-stage decoder.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::providers::lenient;
use crate::providers::ProviderError;

/// A food record from the FoodData Central search endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FdcFood {
    #[serde(default)]
    pub fdc_id: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub lowercase_description: Option<String>,
    #[serde(default)]
    pub brand_name: Option<String>,
    #[serde(default)]
    pub brand_owner: Option<String>,
    #[serde(default)]
    pub food_category: Option<String>,
    #[serde(default)]
    pub serving_size: Option<f64>,
    #[serde(default)]
    pub serving_size_unit: Option<String>,
    #[serde(default)]
    pub food_nutrients: Vec<FdcNutrient>,
}

/// One nutrient row of a search hit.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FdcNutrient {
    #[serde(default)]
    pub nutrient_id: Option<i64>,
    #[serde(default)]
    pub unit_name: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct FdcSearchResponse {
    #[serde(default)]
    foods: Vec<FdcFood>,
}

impl FdcFood {
    fn from_lenient(obj: &Map<String, Value>) -> Self {
        let food_nutrients = match obj.get("foodNutrients") {
            Some(Value::Array(rows)) => rows
                .iter()
                .filter_map(Value::as_object)
                .map(FdcNutrient::from_lenient)
                .collect(),
            _ => Vec::new(),
        };

        // Foundation foods nest the category as {"description": ...}
        let food_category = match obj.get("foodCategory") {
            Some(Value::Object(category)) => lenient::string(category, "description"),
            Some(value) => lenient::as_string(value),
            None => None,
        };

        Self {
            fdc_id: lenient::integer(obj, "fdcId"),
            description: lenient::string(obj, "description"),
            lowercase_description: lenient::string(obj, "lowercaseDescription"),
            brand_name: lenient::string(obj, "brandName"),
            brand_owner: lenient::string(obj, "brandOwner"),
            food_category,
            serving_size: lenient::number(obj, "servingSize"),
            serving_size_unit: lenient::string(obj, "servingSizeUnit"),
            food_nutrients,
        }
    }
}

impl FdcNutrient {
    fn from_lenient(obj: &Map<String, Value>) -> Self {
        Self {
            nutrient_id: lenient::integer(obj, "nutrientId"),
            unit_name: lenient::string(obj, "unitName"),
            value: lenient::number(obj, "value"),
        }
    }
}

/// Decode a search response body into raw foods.
pub fn decode_search(body: &str) -> Result<Vec<FdcFood>, ProviderError> {
    match serde_json::from_str::<FdcSearchResponse>(body) {
        Ok(response) => Ok(response.foods),
        Err(strict_err) => {
            debug!(error = %strict_err, "Strict USDA search decode failed, trying lenient");
            lenient_search(body).ok_or_else(|| {
                ProviderError::DecodeError(format!("USDA search response: {}", strict_err))
            })
        }
    }
}

fn lenient_search(body: &str) -> Option<Vec<FdcFood>> {
    let value: Value = serde_json::from_str(body).ok()?;
    let items = match &value {
        Value::Object(obj) => match obj.get("foods") {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => return Some(Vec::new()),
            Some(_) => return None,
        },
        Value::Array(items) => items,
        _ => return None,
    };

    Some(
        items
            .iter()
            .filter_map(Value::as_object)
            .map(FdcFood::from_lenient)
            .collect(),
    )
}
