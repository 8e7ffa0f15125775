//! Input validation for API requests.
//!
//! Each validator returns `Err(message)` describing the first problem it
//! finds. Handlers collect them with `ValidationErrorBuilder`.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Pragmatic email shape: local part, `@`, dotted domain
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9-]+(\.[a-zA-Z0-9-]+)*\.[a-zA-Z]{2,}$"
    ).unwrap();

    /// Digits with an optional leading `+` and common separators
    static ref PHONE_NUMBER_REGEX: Regex = Regex::new(
        r"^\+?[0-9][0-9 ()-]{4,19}$"
    ).unwrap();
}

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Validate a required free-text field such as a name or address
pub fn validate_text(value: &str, field_name: &str, max_len: usize) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", field_name));
    }

    if value.chars().count() > max_len {
        return Err(format!(
            "{} is too long (max {} characters)",
            field_name, max_len
        ));
    }

    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), String> {
    validate_text(name, "Name", 100)
}

pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email is too long (max 254 characters)".to_string());
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ));
    }

    Ok(())
}

pub fn validate_phone_number(phone_number: &str) -> Result<(), String> {
    if phone_number.is_empty() {
        return Err("Phone number is required".to_string());
    }

    if !PHONE_NUMBER_REGEX.is_match(phone_number) {
        return Err("Invalid phone number format".to_string());
    }

    Ok(())
}

/// Validate a required numeric value that must be greater than zero
pub fn validate_positive(value: Option<i64>, field_name: &str) -> Result<(), String> {
    match value {
        None => Err(format!("{} is required", field_name)),
        Some(v) if v <= 0 => Err(format!("{} must be greater than 0", field_name)),
        Some(_) => Ok(()),
    }
}

/// Validate an optional numeric value; only present values are checked
pub fn validate_optional_positive(value: Option<i64>, field_name: &str) -> Result<(), String> {
    match value {
        Some(_) => validate_positive(value, field_name),
        None => Ok(()),
    }
}

/// Validate an id taken from a request body
pub fn validate_id(id: Option<i64>, field_name: &str) -> Result<(), String> {
    match id {
        None => Err(format!("{} is required", field_name)),
        Some(v) if v <= 0 => Err(format!("Invalid {}", field_name)),
        Some(_) => Ok(()),
    }
}

/// Parse a comma-separated list of integers, e.g. `1,2,3`
pub fn parse_id_list(raw: &str, field_name: &str) -> Result<Vec<i64>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>()
                .map_err(|_| format!("{} must be a comma-separated list of integers", field_name))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("testUser@test.com").is_ok());
        assert!(validate_email("a.b+shop@mail.example.org").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign.com").is_err());
        assert!(validate_email("user@nodot").is_err());
        assert!(validate_email("user @test.com").is_err());
    }

    #[test]
    fn test_validate_phone_number() {
        assert!(validate_phone_number("123123123").is_ok());
        assert!(validate_phone_number("+7 (999) 123-45-67").is_ok());

        assert!(validate_phone_number("").is_err());
        assert!(validate_phone_number("12").is_err());
        assert!(validate_phone_number("call me").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("testpswd").is_ok());
        assert!(validate_password("").is_err());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn test_validate_text() {
        assert!(validate_name("Pepe").is_ok());
        assert!(validate_name("   ").is_err());
        assert!(validate_text(&"x".repeat(101), "Name", 100).is_err());
    }

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive(Some(1), "Price").is_ok());
        assert_eq!(validate_positive(None, "Price").unwrap_err(), "Price is required");
        assert!(validate_positive(Some(0), "Price").is_err());
        assert!(validate_positive(Some(-5), "Price").is_err());

        assert!(validate_optional_positive(None, "Price").is_ok());
        assert!(validate_optional_positive(Some(0), "Price").is_err());
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id(Some(3), "phone_id").is_ok());
        assert!(validate_id(None, "phone_id").is_err());
        assert!(validate_id(Some(0), "phone_id").is_err());
    }

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list("1,2, 3", "phoneids").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_id_list("", "phoneids").unwrap(), Vec::<i64>::new());
        assert!(parse_id_list("1,x", "phoneids").is_err());
    }
}
