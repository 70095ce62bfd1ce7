//! Field validation rules shared by every write path.
//!
//! Each check returns `DomainError::Validation` naming the offending field and
//! the rule it broke. Lengths are counted in characters, not bytes.

use crate::error::{DomainError, DomainResult};

pub const NAME_MIN_CHARS: usize = 20;
pub const NAME_MAX_CHARS: usize = 60;
pub const ADDRESS_MAX_CHARS: usize = 400;
pub const CREDENTIAL_MIN_CHARS: usize = 8;
pub const CREDENTIAL_MAX_CHARS: usize = 16;

/// Punctuation accepted as the mandatory credential symbol.
pub const CREDENTIAL_SYMBOLS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Display name of a user or store: 20–60 characters.
pub fn validate_name(field: &str, value: &str) -> DomainResult<()> {
    let len = value.chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&len) {
        return Err(DomainError::validation(
            field,
            format!("must be between {NAME_MIN_CHARS} and {NAME_MAX_CHARS} characters"),
        ));
    }
    Ok(())
}

/// Postal address: at most 400 characters.
pub fn validate_address(field: &str, value: &str) -> DomainResult<()> {
    if value.chars().count() > ADDRESS_MAX_CHARS {
        return Err(DomainError::validation(
            field,
            format!("must not exceed {ADDRESS_MAX_CHARS} characters"),
        ));
    }
    Ok(())
}

/// Email address: `local@domain.tld`, no whitespace, one `@`.
pub fn validate_email(field: &str, value: &str) -> DomainResult<()> {
    let invalid = || DomainError::validation(field, "must be a well-formed email address");

    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = value.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return Err(invalid());
    }

    Ok(())
}

/// Plain-text credential: 8–16 characters, one uppercase letter, one symbol.
pub fn validate_credential(field: &str, value: &str) -> DomainResult<()> {
    let len = value.chars().count();
    if !(CREDENTIAL_MIN_CHARS..=CREDENTIAL_MAX_CHARS).contains(&len) {
        return Err(DomainError::validation(
            field,
            format!("must be between {CREDENTIAL_MIN_CHARS} and {CREDENTIAL_MAX_CHARS} characters"),
        ));
    }
    if !value.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(DomainError::validation(
            field,
            "must contain at least one uppercase letter",
        ));
    }
    if !value.chars().any(|c| CREDENTIAL_SYMBOLS.contains(c)) {
        return Err(DomainError::validation(
            field,
            format!("must contain at least one of {CREDENTIAL_SYMBOLS}"),
        ));
    }
    Ok(())
}
