//! Reference extraction from free-text transaction fields.
//!
//! Pure pattern matching: the extractors return the first structural hit
//! and never check that the referenced document exists. That is the
//! caller's job.

use std::sync::LazyLock;

use regex::Regex;

// Order codes: "AU" + digits, optional "_SW<n>" supplier suffix, separators
// may be "_", "-" or absent (e.g. AU_4821_SW6, AU-93112, AU4821).
static ORDER_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bAU[-_]?\d{3,}(?:[-_]SW\d)?\b").unwrap_or_else(|err| {
        unreachable!("order reference pattern is statically valid: {err}")
    })
});

// Invoice numbers: "RE" + four-digit year + digits (e.g. RE2024-0117,
// RE20240117).
static INVOICE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bRE(?:19|20)\d{2}[-_]?\d{3,}\b").unwrap_or_else(|err| {
        unreachable!("invoice number pattern is statically valid: {err}")
    })
});

/// Extracts an embedded order code (`AU…`) from free text.
pub fn extract_order_reference(text: &str) -> Option<&str> {
    ORDER_REFERENCE.find(text).map(|m| m.as_str())
}

/// Extracts an embedded invoice number (`RE<year>…`) from free text.
pub fn extract_invoice_number(text: &str) -> Option<&str> {
    INVOICE_NUMBER.find(text).map(|m| m.as_str())
}

/// Strips separators so `RE2024-0117` and `RE20240117` compare equal.
pub fn normalize_reference(reference: &str) -> String {
    reference
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_order_code_with_supplier_suffix() {
        let memo = "Zahlung Bestellung AU_4821_SW6 vielen Dank";
        assert_eq!(extract_order_reference(memo), Some("AU_4821_SW6"));
    }

    #[test]
    fn finds_bare_order_code() {
        assert_eq!(extract_order_reference("ref AU-93112 /"), Some("AU-93112"));
        assert_eq!(extract_order_reference("AU4821"), Some("AU4821"));
    }

    #[test]
    fn ignores_lookalike_tokens() {
        assert_eq!(extract_order_reference("AUTO 4821"), None);
        assert_eq!(extract_order_reference("AU_12"), None);
        assert_eq!(extract_invoice_number("RECHNUNG 0117"), None);
    }

    #[test]
    fn finds_invoice_number() {
        let purpose = "Ueberweisung RE2024-0117 Danke";
        assert_eq!(extract_invoice_number(purpose), Some("RE2024-0117"));
        assert_eq!(extract_invoice_number("RE20240117"), Some("RE20240117"));
    }

    #[test]
    fn takes_first_structural_match() {
        let memo = "AU_1111 und AU_2222";
        assert_eq!(extract_order_reference(memo), Some("AU_1111"));
    }

    #[test]
    fn normalization_drops_separators() {
        assert_eq!(normalize_reference("RE2024-0117"), "RE20240117");
        assert_eq!(normalize_reference("re2024_0117"), "RE20240117");
    }
}
