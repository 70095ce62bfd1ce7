//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is recoverable by the caller and carries a stable `kind()`
/// so transports can map it without string matching.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// No (or no valid) identity was attached to the request.
    #[error("authentication required")]
    Unauthenticated,

    /// Role, ownership or self-rating rule rejected the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A referenced user, store or rating does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// A field constraint was violated.
    #[error("validation failed on '{field}': {rule}")]
    Validation { field: String, rule: String },

    /// A uniqueness rule was violated (e.g. duplicate email).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The persistence layer could not complete the operation.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl DomainError {
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn validation(field: impl Into<String>, rule: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            rule: rule.into(),
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::StorageUnavailable(msg.into())
    }

    /// Stable machine-readable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::Unauthenticated => "unauthenticated",
            DomainError::Forbidden(_) => "forbidden",
            DomainError::NotFound(_) => "not_found",
            DomainError::Validation { .. } => "validation_failed",
            DomainError::Conflict(_) => "conflict",
            DomainError::StorageUnavailable(_) => "storage_unavailable",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_names_field_and_rule() {
        let err = DomainError::validation("name", "must be between 20 and 60 characters");
        assert_eq!(err.kind(), "validation_failed");
        assert_eq!(
            err.to_string(),
            "validation failed on 'name': must be between 20 and 60 characters"
        );
    }

    #[test]
    fn not_found_reads_naturally() {
        assert_eq!(DomainError::not_found("store").to_string(), "store not found");
    }
}
