use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::OnceLock;

fn phone_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+90[2-5]\d{9}$").ok())
        .as_ref()
}

/// Normalise Turkish numbers to `+90XXXXXXXXXX`.
///
/// Accepts `05xx...`, `5xx...`, `905xx...` and `+90 5xx ...` with any
/// spacing or punctuation. Other input is returned unchanged so that
/// validation can reject it.
pub fn format_tr_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() == 12 && digits.starts_with("90") {
        format!("+{digits}")
    } else if digits.len() == 11 && digits.starts_with('0') {
        format!("+9{digits}")
    } else if digits.len() == 10 {
        format!("+90{digits}")
    } else {
        phone.to_string()
    }
}

pub fn validate_tr_phone(phone: &str) -> AppResult<()> {
    if !phone_regex().is_some_and(|re| re.is_match(phone)) {
        return Err(AppError::ValidationError(
            "Invalid phone number, expected a Turkish number (+90XXXXXXXXXX)".to_string(),
        ));
    }
    Ok(())
}

/// Format then validate; returns the stored form.
pub fn normalize_phone(phone: &str) -> AppResult<String> {
    let formatted = format_tr_phone(phone);
    validate_tr_phone(&formatted)?;
    Ok(formatted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_tr_phone() {
        assert_eq!(format_tr_phone("0532 123 45 67"), "+905321234567");
        assert_eq!(format_tr_phone("5321234567"), "+905321234567");
        assert_eq!(format_tr_phone("+90 (532) 123-45-67"), "+905321234567");
        assert_eq!(format_tr_phone("905321234567"), "+905321234567");
        assert_eq!(format_tr_phone("12345"), "12345");
    }

    #[test]
    fn test_validate_tr_phone() {
        assert!(validate_tr_phone("+905321234567").is_ok());
        assert!(validate_tr_phone("+902121234567").is_ok());
        assert!(validate_tr_phone("+90532123456").is_err());
        assert!(validate_tr_phone("+15321234567").is_err());
        assert!(normalize_phone("0532 123 45 67").is_ok());
        assert!(normalize_phone("123").is_err());
    }
}
