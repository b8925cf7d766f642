//! User validation utilities

use thiserror::Error;

use crate::domain::validation::{has_min_chars, is_valid_email};

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Password is too short. Minimum length is {0} characters")]
    PasswordTooShort(usize),

    #[error("Password exceeds maximum length of {0} characters")]
    PasswordTooLong(usize),

    #[error("Full name must be at least {0} characters")]
    FullNameTooShort(usize),

    #[error("Company must be at least {0} characters")]
    CompanyTooShort(usize),
}

const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;
const MIN_PROFILE_FIELD_LENGTH: usize = 2;

/// Validate an email address used as a login
pub fn validate_email(email: &str) -> Result<(), UserValidationError> {
    if !is_valid_email(email) {
        return Err(UserValidationError::InvalidEmail);
    }

    Ok(())
}

/// Validate a password
///
/// Rules:
/// - Minimum 8 characters
/// - Maximum 128 characters
pub fn validate_password(password: &str) -> Result<(), UserValidationError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooShort(MIN_PASSWORD_LENGTH));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooLong(MAX_PASSWORD_LENGTH));
    }

    Ok(())
}

/// Validate the profile written to metadata at sign-up
pub fn validate_profile(full_name: &str, company: &str) -> Result<(), UserValidationError> {
    if !has_min_chars(full_name.trim(), MIN_PROFILE_FIELD_LENGTH) {
        return Err(UserValidationError::FullNameTooShort(MIN_PROFILE_FIELD_LENGTH));
    }

    if !has_min_chars(company.trim(), MIN_PROFILE_FIELD_LENGTH) {
        return Err(UserValidationError::CompanyTooShort(MIN_PROFILE_FIELD_LENGTH));
    }

    Ok(())
}
