// Common validation types and traits

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.is_valid = false;
        self.errors.push(ValidationError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    /// Records an error when `value` is blank or longer than `max` characters
    pub fn check_text(&mut self, field: &str, value: &str, max: usize) {
        if value.trim().is_empty() {
            self.add_error(field, &format!("{} is required", field));
        } else if value.chars().count() > max {
            self.add_error(field, &format!("{} must be at most {} characters", field, max));
        }
    }

    /// Converts into `Err(ApiError::ValidationError)` when any check failed
    pub fn into_result(self) -> Result<(), super::ApiError> {
        if self.is_valid {
            Ok(())
        } else {
            Err(self.into())
        }
    }
}

pub trait Validator<T> {
    fn validate(&self, data: &T) -> ValidationResult;
}

pub fn is_valid_email(email: &str) -> bool {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE
        .get_or_init(|| {
            Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$")
                .expect("email regex is valid")
        })
        .is_match(email)
}

/// E.164 phone numbers: leading `+`, 8 to 15 digits
pub fn is_valid_phone(phone: &str) -> bool {
    static PHONE_RE: OnceLock<Regex> = OnceLock::new();
    PHONE_RE
        .get_or_init(|| Regex::new(r"^\+[1-9][0-9]{7,14}$").expect("phone regex is valid"))
        .is_match(phone)
}

pub fn parse_date(date_str: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("artist@andaction.in"));
        assert!(is_valid_email("first.last+tag@mail.example.com"));
        assert!(!is_valid_email("missing-at.example.com"));
        assert!(!is_valid_email("user@nodot"));
    }

    #[test]
    fn test_phone_validation() {
        assert!(is_valid_phone("+919876543210"));
        assert!(!is_valid_phone("9876543210"));
        assert!(!is_valid_phone("+0123456789"));
        assert!(!is_valid_phone("+12"));
    }

    #[test]
    fn test_check_text_bounds() {
        let mut result = ValidationResult::new();
        result.check_text("title", "   ", 10);
        result.check_text("location", "a very long location", 5);
        result.check_text("event_type", "Wedding", 50);

        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors[0].field, "title");
        assert_eq!(result.errors[1].field, "location");
    }

    #[test]
    fn test_parse_date() {
        assert!(parse_date("2026-12-31").is_some());
        assert!(parse_date("31/12/2026").is_none());
    }
}
