//! `storerate-auth` - pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod authorize;
pub mod claims;
pub mod credential;
pub mod identity;
pub mod operation;
pub mod roles;

pub use authorize::{
    AuthorizationExplanation, AuthzError, DenialKind, authorize, explain_authorization,
};
pub use claims::{
    Hs256Jwt, JwtClaims, JwtValidator, TokenIssueError, TokenValidationError, validate_claims,
};
pub use credential::{Argon2Hasher, CredentialError, CredentialHasher};
pub use identity::Identity;
pub use operation::{Operation, Policy};
pub use roles::Role;
