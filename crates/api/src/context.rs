use storerate_auth::Identity;

/// Caller context for a request.
///
/// Always present on routed requests. Anonymous when no bearer token was
/// sent; the services then answer `Unauthenticated` for guarded operations.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct CallerContext {
    identity: Option<Identity>,
}

impl CallerContext {
    pub fn anonymous() -> Self {
        Self { identity: None }
    }

    pub fn authenticated(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }
}
