use crate::food::{FoodItem, FoodSource, NutriScore};
use crate::providers::normalize::{
    first_non_empty, first_present, format_quantity, humanize_tag, nova_group, non_empty,
    positive_quantity, serving_adjusted_calories,
};

use super::raw::OffProduct;

const DEFAULT_SERVING: &str = "100g";

/// Map an Open Food Facts product into a canonical record.
///
/// Returns `None` when the product has no usable name or code.
pub fn normalize(product: &OffProduct) -> Option<FoodItem> {
    let code = product.code.as_deref().and_then(non_empty)?;
    let name = first_non_empty(&[
        product.product_name.as_deref(),
        product.product_name_en.as_deref(),
        product.generic_name.as_deref(),
        product.abbreviated_product_name.as_deref(),
    ])?;

    let n = &product.nutriments;
    let kcal_per_100 = first_present(&[n.energy_kcal_100g, n.energy_kcal, n.energy_kcal_value]);
    let serving_quantity = positive_quantity(product.serving_quantity);

    let serving_size = match serving_quantity {
        Some(quantity) => product
            .serving_size
            .as_deref()
            .and_then(non_empty)
            .unwrap_or_else(|| format_quantity(quantity, "g")),
        None => DEFAULT_SERVING.to_string(),
    };

    let brand = product
        .brands
        .as_deref()
        .and_then(|brands| brands.split(',').find_map(non_empty));

    let category = product
        .categories_tags
        .first()
        .and_then(|tag| humanize_tag(tag));

    let image_url = first_non_empty(&[
        product.image_front_small_url.as_deref(),
        product.image_small_url.as_deref(),
        product.image_url.as_deref(),
    ]);

    let nutri_score = product
        .nutriscore_grade
        .as_deref()
        .and_then(|grade| grade.parse::<NutriScore>().ok());

    Some(FoodItem {
        id: FoodSource::OpenFoodFacts.namespaced_id(&code),
        name,
        brand,
        category,
        calories: serving_adjusted_calories(kcal_per_100, serving_quantity),
        protein: first_present(&[n.proteins_100g, n.proteins]),
        carbs: first_present(&[n.carbohydrates_100g, n.carbohydrates]),
        fat: first_present(&[n.fat_100g, n.fat]),
        barcode: Some(code),
        source: FoodSource::OpenFoodFacts,
        image_url,
        serving_size,
        serving_quantity,
        nutri_score,
        nova_group: nova_group(product.nova_group),
    })
}
