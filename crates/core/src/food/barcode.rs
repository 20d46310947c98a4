use once_cell::sync::Lazy;
use regex_lite::Regex;

/// EAN-8 through GTIN-14: digits only.
static BARCODE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{8,14}$").unwrap());

/// Trim surrounding whitespace and check the result is a plausible barcode.
pub fn normalize_barcode(code: &str) -> Option<&str> {
    let code = code.trim();
    BARCODE_PATTERN.is_match(code).then_some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_barcodes() {
        assert_eq!(normalize_barcode("73108650"), Some("73108650"));
        assert_eq!(normalize_barcode(" 7310865004703 "), Some("7310865004703"));
        assert_eq!(normalize_barcode("12345678901234"), Some("12345678901234"));
    }

    #[test]
    fn test_invalid_barcodes() {
        assert_eq!(normalize_barcode("1234567"), None);
        assert_eq!(normalize_barcode("123456789012345"), None);
        assert_eq!(normalize_barcode("73108650047a3"), None);
        assert_eq!(normalize_barcode(""), None);
    }
}
