//! Phone number utilities

use regex::Regex;
use once_cell::sync::Lazy;

// International phone number regex (E.164 format)
static E164_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+[1-9]\d{1,14}$").unwrap()
});

/// Normalize a phone number by removing common formatting characters
pub fn normalize_phone_number(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// Check if a phone number is valid international E.164 after normalization
pub fn is_valid_e164(phone: &str) -> bool {
    let normalized = normalize_phone_number(phone);
    E164_REGEX.is_match(&normalized)
}

/// Prefix a national number with a country code unless it already carries one
///
/// `with_country_code("99999 99999", "+91")` gives `+919999999999`.
pub fn with_country_code(phone: &str, country_code: &str) -> String {
    let normalized = normalize_phone_number(phone);
    if normalized.starts_with('+') {
        return normalized;
    }
    let national = normalized.trim_start_matches('0');
    format!("{}{}", normalize_phone_number(country_code), national)
}

/// Digits-only user identifier derived from a phone number
///
/// Returns `None` when the input has no digits at all.
pub fn user_id_from_phone(phone: &str) -> Option<String> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}

/// Mask a phone number for logs (e.g., +91****9999)
pub fn mask_phone_number(phone: &str) -> String {
    let normalized = normalize_phone_number(phone);
    if normalized.len() >= 7 {
        format!(
            "{}****{}",
            &normalized[0..3],
            &normalized[normalized.len() - 4..]
        )
    } else {
        "****".to_string()
    }
}
