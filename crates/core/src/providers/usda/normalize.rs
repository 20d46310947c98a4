use crate::food::{FoodItem, FoodSource};
use crate::providers::normalize::{
    first_non_empty, first_present, format_quantity, humanize_tag, non_empty, positive_quantity,
    serving_adjusted_calories,
};

use super::raw::{FdcFood, FdcNutrient};

/// Energy in kcal: standard, Atwater general, Atwater specific.
const ENERGY_IDS: [i64; 3] = [1008, 2047, 2048];
const PROTEIN_ID: i64 = 1003;
const FAT_ID: i64 = 1004;
const CARBS_ID: i64 = 1005;

const DEFAULT_SERVING: &str = "100g";

/// Map a FoodData Central food into a canonical record.
///
/// Returns `None` when the food has no description or no `fdcId`.
pub fn normalize(food: &FdcFood) -> Option<FoodItem> {
    let fdc_id = food.fdc_id?;
    let name = first_non_empty(&[
        food.description.as_deref(),
        food.lowercase_description.as_deref(),
    ])?;

    let kcal_per_100 = first_present(
        &ENERGY_IDS
            .iter()
            .map(|id| nutrient_value(&food.food_nutrients, *id, Some("KCAL")))
            .collect::<Vec<_>>(),
    );

    let (serving_size, serving_quantity) = serving(food);

    let category = food.food_category.as_deref().and_then(|c| {
        if looks_like_tag(c) {
            humanize_tag(c)
        } else {
            non_empty(c)
        }
    });

    Some(FoodItem {
        id: FoodSource::Usda.namespaced_id(&fdc_id.to_string()),
        name,
        brand: first_non_empty(&[food.brand_name.as_deref(), food.brand_owner.as_deref()]),
        category,
        calories: serving_adjusted_calories(kcal_per_100, serving_quantity),
        protein: nutrient_value(&food.food_nutrients, PROTEIN_ID, None),
        carbs: nutrient_value(&food.food_nutrients, CARBS_ID, None),
        fat: nutrient_value(&food.food_nutrients, FAT_ID, None),
        barcode: None,
        source: FoodSource::Usda,
        image_url: None,
        serving_size,
        serving_quantity,
        nutri_score: None,
        nova_group: None,
    })
}

/// First present value for a nutrient id, optionally restricted to a unit.
fn nutrient_value(nutrients: &[FdcNutrient], id: i64, unit: Option<&str>) -> Option<f64> {
    nutrients
        .iter()
        .filter(|n| n.nutrient_id == Some(id))
        .filter(|n| match (unit, n.unit_name.as_deref()) {
            (Some(want), Some(have)) => have.eq_ignore_ascii_case(want),
            _ => true,
        })
        .find_map(|n| n.value.filter(|v| v.is_finite()))
}

fn serving(food: &FdcFood) -> (String, Option<f64>) {
    let unit = food
        .serving_size_unit
        .as_deref()
        .and_then(|u| match u.trim().to_ascii_lowercase().as_str() {
            "g" | "grm" => Some("g"),
            "ml" | "mlt" => Some("ml"),
            _ => None,
        });

    match (unit, positive_quantity(food.serving_size)) {
        (Some(unit), Some(quantity)) => (format_quantity(quantity, unit), Some(quantity)),
        _ => (DEFAULT_SERVING.to_string(), None),
    }
}

fn looks_like_tag(s: &str) -> bool {
    !s.contains(char::is_whitespace) && (s.contains(':') || s.contains('-'))
}
