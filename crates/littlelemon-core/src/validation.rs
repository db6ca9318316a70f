//! Profile field validation.
//!
//! Applied by callers before a save or continue action; the stores
//! themselves never validate.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::models::PersonalInfo;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a valid email address")]
    Email,

    #[error("First name may only contain letters")]
    FirstName,

    #[error("Please enter a valid phone number")]
    Phone,
}

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z]+$").expect("valid name pattern"))
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
        )
        .expect("valid email pattern")
    })
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\(?[0-9]{3}\)?[-.\s]?[0-9]{3}[-.\s]?[0-9]{4}$").expect("valid phone pattern")
    })
}

/// Non-empty, ASCII letters only.
pub fn validate_name(name: &str) -> bool {
    name_pattern().is_match(name)
}

pub fn validate_email(email: &str) -> bool {
    email_pattern().is_match(email)
}

/// Empty is allowed (the number is optional); otherwise a 10-digit
/// North American number with optional separators.
pub fn validate_phone(number: &str) -> bool {
    number.is_empty() || phone_pattern().is_match(number)
}

/// Check the fields a profile save depends on, reporting the first failure.
pub fn validate_personal_info(info: &PersonalInfo) -> Result<(), ValidationError> {
    if !validate_email(&info.email) {
        return Err(ValidationError::Email);
    }
    if !validate_name(&info.first_name) {
        return Err(ValidationError::FirstName);
    }
    if !validate_phone(&info.number) {
        return Err(ValidationError::Phone);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_info() -> PersonalInfo {
        PersonalInfo {
            first_name: "Tilly".to_string(),
            last_name: "Adams".to_string(),
            email: "tilly@littlelemon.com".to_string(),
            number: "(312) 555-0199".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Tilly"));
        assert!(!validate_name(""));
        assert!(!validate_name("O'Brien"));
        assert!(!validate_name("Anne Marie"));
        assert!(!validate_name("R2D2"));
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("tilly@littlelemon.com"));
        assert!(validate_email("first.last@mail.example.co"));
        assert!(validate_email("\"quoted name\"@example.com"));
        assert!(validate_email("admin@[192.168.0.1]"));
        assert!(!validate_email(""));
        assert!(!validate_email("tilly"));
        assert!(!validate_email("tilly@localhost"));
        assert!(!validate_email("tilly@@example.com"));
        assert!(!validate_email("ti lly@example.com"));
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone(""));
        assert!(validate_phone("3125550199"));
        assert!(validate_phone("312-555-0199"));
        assert!(validate_phone("(312) 555-0199"));
        assert!(validate_phone("312.555.0199"));
        assert!(!validate_phone("555-0199"));
        assert!(!validate_phone("phone"));
        assert!(!validate_phone("312-555-01999"));
    }

    #[test]
    fn test_validate_personal_info() {
        assert_eq!(validate_personal_info(&valid_info()), Ok(()));
    }

    #[test]
    fn test_invalid_phone_blocks_otherwise_valid_profile() {
        let mut info = valid_info();
        info.number = "12345".to_string();
        info.is_newsletter = true;
        assert_eq!(validate_personal_info(&info), Err(ValidationError::Phone));
    }

    #[test]
    fn test_first_failure_reported() {
        let mut info = valid_info();
        info.email = "nope".to_string();
        info.first_name = "O'Brien".to_string();
        assert_eq!(validate_personal_info(&info), Err(ValidationError::Email));

        info.email = "obrien@example.com".to_string();
        assert_eq!(validate_personal_info(&info), Err(ValidationError::FirstName));
    }
}
