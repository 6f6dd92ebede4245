//! Input validation utilities.
//!
//! Centralized validation helpers used across API routes.

use validator::Validate;

use crate::error::ModuleHubError;

/// Validate a request body, returning a ModuleHubError::Validation on failure.
pub fn validate_request<T: Validate>(body: &T) -> Result<(), ModuleHubError> {
    body.validate().map_err(|e| ModuleHubError::Validation {
        message: format_validation_errors(e),
    })
}

/// Format validation errors into a human-readable string.
fn format_validation_errors(errors: validator::ValidationErrors) -> String {
    let mut messages = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for '{field}'"))
            })
        })
        .collect::<Vec<_>>();
    messages.sort();
    messages.join("; ")
}

/// Validate an owner or repository name as GitHub accepts them
/// (letters, digits, `-`, `_`, `.`), so it can be placed in an API path.
pub fn validate_repository_segment(name: &str) -> Result<(), ModuleHubError> {
    if name.is_empty() || name == "." || name == ".." {
        return Err(ModuleHubError::Validation {
            message: format!("'{name}' is not a valid owner or repository name"),
        });
    }

    let valid = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.');

    if !valid {
        return Err(ModuleHubError::Validation {
            message: format!("'{name}' is not a valid owner or repository name"),
        });
    }

    Ok(())
}
