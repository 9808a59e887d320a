//! Destination parsing for outbound phone-auth requests

use civic_core::errors::{ProviderError, ProviderErrorKind};
use civic_shared::phone::{mask_phone_number, with_country_code};
use phonenumber::{Mode, PhoneNumber};
use tracing::debug;

/// Parse `phone` into canonical E.164, applying `default_country_code` to
/// national numbers
///
/// Numbers the metadata does not recognise are rejected as
/// [`ProviderErrorKind::InvalidDestination`] before any request is made.
pub fn to_e164(phone: &str, default_country_code: &str) -> Result<String, ProviderError> {
    let candidate = with_country_code(phone, default_country_code);

    let parsed = candidate.parse::<PhoneNumber>().map_err(|e| {
        ProviderError::new(
            ProviderErrorKind::InvalidDestination,
            format!("Invalid phone number format: {}", e),
        )
    })?;

    if !phonenumber::is_valid(&parsed) {
        return Err(ProviderError::new(
            ProviderErrorKind::InvalidDestination,
            "Phone number is not valid for its region",
        ));
    }

    let formatted = parsed.format().mode(Mode::E164).to_string();
    debug!(phone = %mask_phone_number(&formatted), "Validated phone number");
    Ok(formatted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formats_to_e164() {
        assert_eq!(to_e164("+91 98765 43210", "+91").unwrap(), "+919876543210");
        assert_eq!(to_e164("98765-43210", "+91").unwrap(), "+919876543210");
    }

    #[test]
    fn test_rejects_garbage() {
        for input in ["", "abc", "+91123"] {
            let err = to_e164(input, "+91").unwrap_err();
            assert_eq!(err.kind, ProviderErrorKind::InvalidDestination);
        }
    }
}
