//! Input validation helpers shared by request DTOs.

use validator::{ValidateEmail, ValidationErrors};

use crate::error::CoreError;

/// True for empty or whitespace-only strings.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// True when every value is present and non-blank.
pub fn all_present(values: &[Option<&str>]) -> bool {
    values.iter().all(|v| v.is_some_and(|s| !is_blank(s)))
}

/// Validate an email address, returning a [`CoreError::Validation`] on failure.
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    if email.validate_email() {
        Ok(())
    } else {
        Err(CoreError::Validation(format!("Invalid email '{email}'")))
    }
}

/// Split a comma-separated form value into trimmed, non-empty items.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Flatten `validator` errors into one readable message.
pub fn describe_errors(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let detail = errs
                .iter()
                .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| "is invalid".to_string());
            format!("{field} {detail}")
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

impl From<ValidationErrors> for CoreError {
    fn from(errors: ValidationErrors) -> Self {
        CoreError::Validation(describe_errors(&errors))
    }
}
