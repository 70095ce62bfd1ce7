use std::sync::Arc;

use storerate_auth::{Argon2Hasher, CredentialHasher, Hs256Jwt};
use storerate_infra::{InMemoryRepository, Repository, Services};

/// Everything a handler can reach: the service layer plus the token codec
/// used by the identity middleware.
#[derive(Clone)]
pub struct AppServices {
    pub services: Services,
    pub jwt: Arc<Hs256Jwt>,
    pub backend: &'static str,
}

impl AppServices {
    pub fn new(
        repo: Arc<dyn Repository>,
        hasher: Arc<dyn CredentialHasher>,
        jwt: Arc<Hs256Jwt>,
        backend: &'static str,
    ) -> Self {
        Self {
            services: Services::new(repo, hasher, jwt.clone()),
            jwt,
            backend,
        }
    }

    /// In-memory wiring with Argon2 credentials. Used when no database is
    /// configured and by the black-box tests.
    pub fn in_memory(jwt: Arc<Hs256Jwt>) -> (Self, Arc<InMemoryRepository>) {
        let repo = Arc::new(InMemoryRepository::new());
        let services = Self::new(repo.clone(), Arc::new(Argon2Hasher), jwt, "memory");
        (services, repo)
    }
}
