//! Canonical forms for contact fields.
//!
//! Every equality comparison between contact values anywhere in the crate
//! goes through these functions; raw strings are never compared directly.
//! Absent input normalizes to the empty string.

/// Lowercased, trimmed email.
pub fn normalize_email(input: Option<&str>) -> String {
    input.map(|s| s.trim().to_lowercase()).unwrap_or_default()
}

/// Digits only; formatting characters and country-code punctuation dropped.
pub fn normalize_phone(input: Option<&str>) -> String {
    input
        .map(|s| s.chars().filter(|c| c.is_ascii_digit()).collect())
        .unwrap_or_default()
}

/// Lowercased, trimmed address line.
pub fn normalize_address(input: Option<&str>) -> String {
    input.map(|s| s.trim().to_lowercase()).unwrap_or_default()
}

/// Lowercased, trimmed person name, used to deduplicate alternate names.
pub fn normalize_name(input: Option<&str>) -> String {
    input.map(|s| s.trim().to_lowercase()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_case_folded_and_trimmed() {
        assert_eq!(normalize_email(Some("  Jane.Doe@Example.COM ")), "jane.doe@example.com");
        assert_eq!(normalize_email(None), "");
    }

    #[test]
    fn phone_keeps_digits_only() {
        assert_eq!(normalize_phone(Some("+1 (555) 123-4567")), "15551234567");
        assert_eq!(normalize_phone(Some("555-1111")), "5551111");
        assert_eq!(normalize_phone(Some("no digits")), "");
        assert_eq!(normalize_phone(None), "");
    }

    #[test]
    fn address_is_case_folded_and_trimmed() {
        assert_eq!(
            normalize_address(Some("  12 Main St, Springfield ")),
            "12 main st, springfield"
        );
    }

    #[test]
    fn differently_formatted_phones_normalize_equal() {
        assert_eq!(
            normalize_phone(Some("(555) 222-2222")),
            normalize_phone(Some("555.222.2222"))
        );
    }
}
