//! Helpers shared by the per-provider normalizers.
//!
//! Everything here is pure: no I/O, no state.

/// Pick the first present value from a priority-ordered alias list.
///
/// Values are never averaged or merged across aliases.
pub fn first_present(candidates: &[Option<f64>]) -> Option<f64> {
    candidates.iter().flatten().copied().find(|v| v.is_finite())
}

/// Pick the first non-blank string from a priority-ordered alias list.
pub fn first_non_empty(candidates: &[Option<&str>]) -> Option<String> {
    candidates.iter().flatten().find_map(|s| non_empty(s))
}

/// Trim a string and drop it if nothing is left.
pub fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Convert a per-100-unit energy value into a per-serving value.
///
/// Falls back to the raw per-100 value when the serving quantity is absent
/// or not positive.
pub fn serving_adjusted_calories(per_100: Option<f64>, serving_quantity: Option<f64>) -> Option<f64> {
    let per_100 = per_100?;
    match serving_quantity {
        Some(quantity) if quantity > 0.0 => Some(per_100 * quantity / 100.0),
        _ => Some(per_100),
    }
}

/// Keep a serving quantity only when it is a usable positive number.
pub fn positive_quantity(quantity: Option<f64>) -> Option<f64> {
    quantity.filter(|q| q.is_finite() && *q > 0.0)
}

/// Render a quantity with its unit, e.g. `150g` or `12.5ml`.
pub fn format_quantity(quantity: f64, unit: &str) -> String {
    if quantity.fract() == 0.0 {
        format!("{}{}", quantity as i64, unit)
    } else {
        format!("{}{}", quantity, unit)
    }
}

/// Turn a taxonomy slug such as `en:dairy-products` into `Dairy Products`.
///
/// The language namespace (two or three ASCII letters before `:`) is
/// stripped, hyphens become spaces, and each word is title-cased.
pub fn humanize_tag(tag: &str) -> Option<String> {
    let tag = tag.trim();
    let body = match tag.split_once(':') {
        Some((prefix, rest))
            if (2..=3).contains(&prefix.len())
                && prefix.chars().all(|c| c.is_ascii_alphabetic()) =>
        {
            rest
        }
        _ => tag,
    };

    let words: Vec<String> = body
        .split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .map(title_case_word)
        .collect();

    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Clamp a NOVA group to the valid 1-4 range, dropping anything else.
pub fn nova_group(value: Option<i64>) -> Option<u8> {
    match value {
        Some(v @ 1..=4) => Some(v as u8),
        _ => None,
    }
}
