//! Account identity helpers.

use crate::error::CoreError;

/// Normalize an email address for storage and lookup (trimmed, lower-cased).
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Reject blank credentials before touching the account store.
///
/// Password complexity is not checked here.
pub fn require_credentials(email: &str, password: &str) -> Result<(), CoreError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(CoreError::Validation("Missing fields".into()));
    }
    Ok(())
}
