// src/auth/validators.rs

use super::models::*;
use super::password::MIN_PASSWORD_LENGTH;
use crate::common::validation::{is_valid_email, is_valid_phone};
use crate::common::{ValidationResult, Validator};

const MAX_PASSWORD_LENGTH: usize = 128;

fn check_password(result: &mut ValidationResult, field: &str, password: &str) {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        result.add_error(
            field,
            &format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
        );
    } else if password.chars().count() > MAX_PASSWORD_LENGTH {
        result.add_error(
            field,
            &format!("Password must be at most {} characters", MAX_PASSWORD_LENGTH),
        );
    }
}

fn check_email(result: &mut ValidationResult, email: &str) {
    if email.trim().is_empty() {
        result.add_error("email", "Email is required");
    } else if !is_valid_email(email.trim()) {
        result.add_error("email", "Email address is invalid");
    }
}

pub struct CredentialsValidator;

impl Validator<SignupRequest> for CredentialsValidator {
    fn validate(&self, data: &SignupRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        check_email(&mut result, &data.email);
        check_password(&mut result, "password", &data.password);

        if let Some(name) = &data.name {
            if name.chars().count() > 100 {
                result.add_error("name", "Name must be less than 100 characters");
            }
        }

        if data.role == Some(Role::Admin) {
            result.add_error("role", "Role must be user or artist");
        }

        result
    }
}

impl Validator<LoginRequest> for CredentialsValidator {
    fn validate(&self, data: &LoginRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        check_email(&mut result, &data.email);
        if data.password.is_empty() {
            result.add_error("password", "Password is required");
        }
        result
    }
}

impl Validator<ResetPasswordRequest> for CredentialsValidator {
    fn validate(&self, data: &ResetPasswordRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        if data.token.trim().is_empty() {
            result.add_error("token", "Reset token is required");
        }
        check_password(&mut result, "password", &data.password);
        result
    }
}

pub struct OtpValidator;

impl Validator<SendOtpRequest> for OtpValidator {
    fn validate(&self, data: &SendOtpRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        if !is_valid_phone(&data.phone) {
            result.add_error("phone", "Phone must be in E.164 format, e.g. +919876543210");
        }
        result
    }
}

impl Validator<VerifyOtpRequest> for OtpValidator {
    fn validate(&self, data: &VerifyOtpRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        if !is_valid_phone(&data.phone) {
            result.add_error("phone", "Phone must be in E.164 format, e.g. +919876543210");
        }
        if data.code.len() != 6 || !data.code.chars().all(|c| c.is_ascii_digit()) {
            result.add_error("code", "Code must be 6 digits");
        }
        result
    }
}
