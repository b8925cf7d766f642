//! Field rules shared by sign-up and the registration form

use once_cell::sync::Lazy;
use regex::Regex;

/// Pragmatic email shape: local part, `@`, dotted domain with an alphabetic TLD
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*\.[A-Za-z]{2,}$")
        .unwrap()
});

/// Check whether an email address is well-formed
pub fn is_valid_email(email: &str) -> bool {
    !email.contains("..") && EMAIL_PATTERN.is_match(email)
}

/// Check a minimum length counted in characters, not bytes
pub fn has_min_chars(value: &str, min: usize) -> bool {
    value.chars().count() >= min
}
