//! Request Credentials
//!
//! The identity and service catalog of the operator making the current
//! request. Built by the web layer and passed to every API client.

use crate::api::catalog::ServiceCatalog;
use std::fmt;

/// Authenticated operator identity
#[derive(Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub username: String,
    pub token_id: String,
    pub tenant_id: String,
}

impl UserIdentity {
    /// Shortened token, safe to log
    pub fn token_hint(&self) -> String {
        let prefix: String = self.token_id.chars().take(8).collect();
        format!("{}...", prefix)
    }
}

// Tokens stay out of Debug output
impl fmt::Debug for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserIdentity")
            .field("username", &self.username)
            .field("token_id", &self.token_hint())
            .field("tenant_id", &self.tenant_id)
            .finish()
    }
}

/// Credentials and catalog for one inbound request
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user: UserIdentity,
    pub catalog: ServiceCatalog,
}

impl RequestContext {
    pub fn new(user: UserIdentity, catalog: ServiceCatalog) -> Self {
        Self { user, catalog }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_token() {
        let user = UserIdentity {
            username: "admin".into(),
            token_id: "gAAAAABlongsecrettoken".into(),
            tenant_id: "t1".into(),
        };
        let rendered = format!("{:?}", user);
        assert!(rendered.contains("gAAAAABl..."));
        assert!(!rendered.contains("secrettoken"));
    }
}
