//! Open Food Facts wire types and the two-stage decoder.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::providers::lenient;
use crate::providers::ProviderError;

/// A product record as Open Food Facts sends it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OffProduct {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub product_name_en: Option<String>,
    #[serde(default)]
    pub generic_name: Option<String>,
    #[serde(default)]
    pub abbreviated_product_name: Option<String>,
    #[serde(default)]
    pub brands: Option<String>,
    #[serde(default)]
    pub categories_tags: Vec<String>,
    #[serde(default)]
    pub image_front_small_url: Option<String>,
    #[serde(default)]
    pub image_small_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub serving_size: Option<String>,
    #[serde(default)]
    pub serving_quantity: Option<f64>,
    #[serde(default)]
    pub nutriscore_grade: Option<String>,
    #[serde(default)]
    pub nova_group: Option<i64>,
    #[serde(default)]
    pub nutriments: OffNutriments,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OffNutriments {
    #[serde(default, rename = "energy-kcal_100g")]
    pub energy_kcal_100g: Option<f64>,
    #[serde(default, rename = "energy-kcal")]
    pub energy_kcal: Option<f64>,
    #[serde(default, rename = "energy-kcal_value")]
    pub energy_kcal_value: Option<f64>,
    #[serde(default)]
    pub proteins_100g: Option<f64>,
    #[serde(default)]
    pub proteins: Option<f64>,
    #[serde(default)]
    pub carbohydrates_100g: Option<f64>,
    #[serde(default)]
    pub carbohydrates: Option<f64>,
    #[serde(default)]
    pub fat_100g: Option<f64>,
    #[serde(default)]
    pub fat: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OffSearchResponse {
    #[serde(default)]
    products: Vec<OffProduct>,
}

#[derive(Debug, Deserialize)]
struct OffProductResponse {
    #[serde(default)]
    status: Option<i64>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    product: Option<OffProduct>,
}

impl OffProduct {
    /// Key-by-key extraction from an untyped object.
    fn from_lenient(obj: &Map<String, Value>) -> Self {
        let nutriments = obj
            .get("nutriments")
            .and_then(Value::as_object)
            .map(OffNutriments::from_lenient)
            .unwrap_or_default();

        Self {
            code: lenient::string(obj, "code"),
            product_name: lenient::string(obj, "product_name"),
            product_name_en: lenient::string(obj, "product_name_en"),
            generic_name: lenient::string(obj, "generic_name"),
            abbreviated_product_name: lenient::string(obj, "abbreviated_product_name"),
            brands: lenient::string(obj, "brands"),
            categories_tags: lenient::string_list(obj, "categories_tags"),
            image_front_small_url: lenient::string(obj, "image_front_small_url"),
            image_small_url: lenient::string(obj, "image_small_url"),
            image_url: lenient::string(obj, "image_url"),
            serving_size: lenient::string(obj, "serving_size"),
            serving_quantity: lenient::number(obj, "serving_quantity"),
            nutriscore_grade: lenient::string(obj, "nutriscore_grade"),
            nova_group: lenient::integer(obj, "nova_group"),
            nutriments,
        }
    }
}

impl OffNutriments {
    fn from_lenient(obj: &Map<String, Value>) -> Self {
        Self {
            energy_kcal_100g: lenient::number(obj, "energy-kcal_100g"),
            energy_kcal: lenient::number(obj, "energy-kcal"),
            energy_kcal_value: lenient::number(obj, "energy-kcal_value"),
            proteins_100g: lenient::number(obj, "proteins_100g"),
            proteins: lenient::number(obj, "proteins"),
            carbohydrates_100g: lenient::number(obj, "carbohydrates_100g"),
            carbohydrates: lenient::number(obj, "carbohydrates"),
            fat_100g: lenient::number(obj, "fat_100g"),
            fat: lenient::number(obj, "fat"),
        }
    }
}

/// Decode a search response body into raw products.
pub fn decode_search(body: &str) -> Result<Vec<OffProduct>, ProviderError> {
    match serde_json::from_str::<OffSearchResponse>(body) {
        Ok(response) => Ok(response.products),
        Err(strict_err) => {
            debug!(error = %strict_err, "Strict OFF search decode failed, trying lenient");
            lenient_search(body).ok_or_else(|| {
                ProviderError::DecodeError(format!("OFF search response: {}", strict_err))
            })
        }
    }
}

fn lenient_search(body: &str) -> Option<Vec<OffProduct>> {
    let value: Value = serde_json::from_str(body).ok()?;
    let items = match &value {
        Value::Object(obj) => match obj.get("products") {
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
            .map(OffProduct::from_lenient)
            .collect(),
    )
}

/// Outcome of decoding a barcode lookup body.
#[derive(Debug)]
pub enum ProductLookup {
    Found(OffProduct),
    NotFound,
}

/// Decode a product lookup body.
///
/// `status: 0` means the product does not exist.
pub fn decode_product(body: &str) -> Result<ProductLookup, ProviderError> {
    let (status, code, product) = match serde_json::from_str::<OffProductResponse>(body) {
        Ok(response) => (response.status, response.code, response.product),
        Err(strict_err) => {
            debug!(error = %strict_err, "Strict OFF product decode failed, trying lenient");
            lenient_product(body).ok_or_else(|| {
                ProviderError::DecodeError(format!("OFF product response: {}", strict_err))
            })?
        }
    };

    if status == Some(0) {
        return Ok(ProductLookup::NotFound);
    }

    match product {
        Some(mut product) => {
            if product.code.is_none() {
                product.code = code;
            }
            Ok(ProductLookup::Found(product))
        }
        None => Ok(ProductLookup::NotFound),
    }
}

/// Status reported in a product body, if the body is readable at all.
pub fn product_status(body: &str) -> Option<i64> {
    let value: Value = serde_json::from_str(body).ok()?;
    lenient::integer(value.as_object()?, "status")
}

type LenientProduct = (Option<i64>, Option<String>, Option<OffProduct>);

fn lenient_product(body: &str) -> Option<LenientProduct> {
    let value: Value = serde_json::from_str(body).ok()?;
    let obj = value.as_object()?;
    let product = obj
        .get("product")
        .and_then(Value::as_object)
        .map(OffProduct::from_lenient);
    Some((
        lenient::integer(obj, "status"),
        lenient::string(obj, "code"),
        product,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_search_decode() {
        let body = r#"{
            "count": 1,
            "products": [{
                "code": "7310865004703",
                "product_name": "Mellanmjölk",
                "nutriments": {"energy-kcal_100g": 46, "proteins_100g": 3.5}
            }]
        }"#;
        let products = decode_search(body).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].code.as_deref(), Some("7310865004703"));
        assert_eq!(products[0].nutriments.energy_kcal_100g, Some(46.0));
    }

    #[test]
    fn test_lenient_search_decode_tolerates_stringly_numbers() {
        // serving_quantity as a string and code as a number break the strict decoder
        let body = r#"{
            "products": [
                {"code": 123, "product_name": "Havregryn", "serving_quantity": "40",
                 "nutriments": {"energy-kcal_100g": "370", "fat_100g": "7,0"}},
                "garbage",
                {"code": "456", "product_name": "Müsli", "categories_tags": null}
            ]
        }"#;
        let products = decode_search(body).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].code.as_deref(), Some("123"));
        assert_eq!(products[0].serving_quantity, Some(40.0));
        assert_eq!(products[0].nutriments.energy_kcal_100g, Some(370.0));
        assert_eq!(products[0].nutriments.fat_100g, Some(7.0));
        assert!(products[1].categories_tags.is_empty());
    }

    #[test]
    fn test_lenient_search_accepts_bare_array() {
        let body = r#"[{"code": 1, "product_name": "Smör"}]"#;
        let products = decode_search(body).unwrap();
        assert_eq!(products.len(), 1);
    }

    #[test]
    fn test_search_decode_fails_on_non_json() {
        let err = decode_search("<html>busy</html>").unwrap_err();
        assert!(matches!(err, ProviderError::DecodeError(_)));
    }

    #[test]
    fn test_product_not_found_status() {
        let body = r#"{"status": 0, "status_verbose": "product not found", "code": "000"}"#;
        assert!(matches!(decode_product(body).unwrap(), ProductLookup::NotFound));
        assert_eq!(product_status(body), Some(0));
    }

    #[test]
    fn test_product_found_inherits_envelope_code() {
        let body = r#"{"status": 1, "code": "7310865004703",
                       "product": {"product_name": "Mellanmjölk"}}"#;
        match decode_product(body).unwrap() {
            ProductLookup::Found(product) => {
                assert_eq!(product.code.as_deref(), Some("7310865004703"));
            }
            ProductLookup::NotFound => panic!("expected product"),
        }
    }

    #[test]
    fn test_product_lenient_status_string() {
        let body = r#"{"status": "1", "code": "42", "product": {"product_name": "Ost", "nova_group": "4"}}"#;
        match decode_product(body).unwrap() {
            ProductLookup::Found(product) => assert_eq!(product.nova_group, Some(4)),
            ProductLookup::NotFound => panic!("expected product"),
        }
    }
}
