//! Services - validation, slug derivation and error classification in front
//! of the repositories.

mod category_service;
mod post_service;

pub use category_service::{CategoryService, MIN_NAME_LEN};
pub use post_service::{MIN_TITLE_LEN, PostService};

use crate::error::{DomainError, RepoError};

/// Reject `value` when it has fewer than `min` characters.
fn require_min_chars(field: &str, value: &str, min: usize) -> Result<(), DomainError> {
    if value.chars().count() < min {
        return Err(DomainError::Validation(format!(
            "{field} must be at least {min} characters long"
        )));
    }
    Ok(())
}

/// Storage failures with no business meaning. Detail stays in the error for
/// server-side logging; the transport layer decides what the caller sees.
fn internal(err: RepoError) -> DomainError {
    tracing::error!(error = %err, "Storage operation failed");
    DomainError::Internal(err.to_string())
}
