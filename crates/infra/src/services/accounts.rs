//! Self-service accounts: registration, login and credential change.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::instrument;

use storerate_auth::{CredentialHasher, Hs256Jwt, Identity, Operation, Role};
use storerate_catalog::{NewUser, User, UserProfile, normalize_email};
use storerate_core::validation::validate_credential;
use storerate_core::{DomainError, DomainResult};

use super::guard;
use super::users::insert_new_user;
use crate::repository::Repository;

/// A signed-in user and their access token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: UserProfile,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct AccountService {
    repo: Arc<dyn Repository>,
    hasher: Arc<dyn CredentialHasher>,
    jwt: Arc<Hs256Jwt>,
}

impl AccountService {
    pub fn new(repo: Arc<dyn Repository>, hasher: Arc<dyn CredentialHasher>, jwt: Arc<Hs256Jwt>) -> Self {
        Self { repo, hasher, jwt }
    }

    fn open_session(&self, user: &User) -> DomainResult<Session> {
        let now = Utc::now();
        let access_token = self
            .jwt
            .issue(user.id, &user.email, user.role, now)
            .map_err(|e| DomainError::storage(e.to_string()))?;
        Ok(Session {
            user: UserProfile::from(user),
            access_token,
            expires_at: now + self.jwt.ttl(),
        })
    }

    /// Create a `USER` account for an anonymous caller. The requested role is
    /// ignored.
    #[instrument(skip(self, input), err)]
    pub async fn register(&self, input: NewUser) -> DomainResult<Session> {
        let input = NewUser {
            role: Role::User,
            ..input
        }
        .validated()?;
        let user = insert_new_user(self.repo.as_ref(), self.hasher.as_ref(), input).await?;
        self.open_session(&user)
    }

    /// Unknown email and wrong credential fail identically.
    #[instrument(skip(self, email, credential), err)]
    pub async fn login(&self, email: &str, credential: &str) -> DomainResult<Session> {
        let email = normalize_email(email);
        let Some(user) = self.repo.find_user_by_email(&email).await? else {
            tracing::debug!("login rejected: unknown email");
            return Err(DomainError::Unauthenticated);
        };

        let matches = self.hasher.verify(credential, &user.credential_hash).unwrap_or_else(|e| {
            tracing::warn!(user_id = %user.id, error = %e, "stored credential hash unusable");
            false
        });
        if !matches {
            tracing::debug!(user_id = %user.id, "login rejected: credential mismatch");
            return Err(DomainError::Unauthenticated);
        }

        tracing::info!(user_id = %user.id, "login");
        self.open_session(&user)
    }

    /// Replace the caller's credential.
    #[instrument(skip(self, identity, new_credential), err)]
    pub async fn change_password(
        &self,
        identity: Option<&Identity>,
        new_credential: &str,
    ) -> DomainResult<()> {
        let caller = guard(identity, Operation::ChangePassword, None)?;
        validate_credential("password", new_credential)?;

        let hash = self
            .hasher
            .hash(new_credential)
            .map_err(|e| DomainError::storage(e.to_string()))?;
        if !self.repo.update_credential(caller.user_id, hash).await? {
            return Err(DomainError::not_found(format!("user {}", caller.user_id)));
        }
        tracing::info!(user_id = %caller.user_id, "credential changed");
        Ok(())
    }
}
