use std::sync::LazyLock;

use regex::Regex;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Returns `message` as the error when `value` is blank.
pub fn require_non_empty(value: &str, message: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(message.to_string());
    }
    Ok(())
}

/// Like [`require_non_empty`] but for fields that may be omitted.
pub fn optional_non_empty(value: Option<&str>, message: &str) -> Result<(), String> {
    match value {
        Some(v) => require_non_empty(v, message),
        None => Ok(()),
    }
}
