//! Authentication and authorization core
//!
//! Two collaborating components behind one facade: the token service mints
//! and validates encrypted bearer credentials, and the access control
//! evaluator decides allow/deny from the role hierarchy and resource
//! ownership. Route handlers resolve an [`Identity`] once per request and
//! thread it through the call chain; the inbound request payload is never
//! mutated.

pub mod access;
pub mod envelope;
pub mod password;
pub mod token;

use crate::config::AuthConfig;
use crate::storage::{OwnershipRecord, ResourceStore, UserStore};
use crate::utils::error::{AuthError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

pub use access::AccessControl;
pub use token::{Claims, TokenKind, TokenPair, TokenService};

/// User id and role carried by unauthenticated requests
pub const ANONYMOUS: &str = "anonymous";

/// Resolved principal for a request.
///
/// Constructed fresh per request by the token service and immutable after
/// construction. An absent or anonymous token resolves to the anonymous
/// sentinel rather than an error; whether anonymous access suffices is the
/// evaluator's decision, made per resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Numeric user id as string, or the anonymous sentinel
    pub user_id: String,
    /// Role name from the configured hierarchy, or the anonymous sentinel
    pub role: String,
}

impl Identity {
    /// The identity of an unauthenticated request
    pub fn anonymous() -> Self {
        Self {
            user_id: ANONYMOUS.to_string(),
            role: ANONYMOUS.to_string(),
        }
    }

    /// Whether this is the anonymous sentinel
    pub fn is_anonymous(&self) -> bool {
        self.user_id == ANONYMOUS
    }
}

/// Main authentication system
///
/// Owns the token service and access control evaluator, plus the user-store
/// collaborator needed by the sign-in flow. Cheap to clone; all components
/// are behind `Arc`s and hold only read-only state.
#[derive(Clone)]
pub struct AuthSystem {
    /// Authentication configuration
    config: Arc<AuthConfig>,
    /// Token service
    tokens: Arc<TokenService>,
    /// Access control evaluator
    access: Arc<AccessControl>,
    /// User lookup collaborator
    users: Arc<dyn UserStore>,
}

impl AuthSystem {
    /// Create a new authentication system from validated configuration
    pub fn new(config: &AuthConfig, users: Arc<dyn UserStore>) -> Result<Self> {
        config.validate()?;

        let tokens = Arc::new(TokenService::new(config));
        let access = Arc::new(AccessControl::new(&config.roles));

        info!("authentication system initialized");

        Ok(Self {
            config: Arc::new(config.clone()),
            tokens,
            access,
            users,
        })
    }

    /// Sign a user in with email and password, minting a credential pair.
    ///
    /// An unknown email and a wrong password produce the same error, so the
    /// response does not reveal which emails are registered.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<TokenPair> {
        let user = self
            .users
            .find_user_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !password::verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        info!(user_id = user.id, "user signed in");

        self.tokens
            .issue_token_pair(&user.id.to_string(), &user.username, &user.role)
    }

    /// Exchange a refresh credential for a fresh pair
    pub fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        self.tokens.refresh(refresh_token)
    }

    /// Resolve the identity asserted by an optional request token
    pub fn resolve_identity(&self, token: Option<&str>) -> Result<Identity> {
        self.tokens.resolve_identity(token)
    }

    /// Authorize an identity against a stored resource.
    ///
    /// Resource existence is checked first, uniformly: a missing resource is
    /// a 404 regardless of who asks, and only an existing resource can yield
    /// a 403. The fetched ownership record is returned so the caller does
    /// not look it up twice.
    pub async fn authorize_item(
        &self,
        resources: &dyn ResourceStore,
        identity: &Identity,
        resource_id: &str,
        is_read: bool,
    ) -> Result<OwnershipRecord> {
        let resource = resources
            .find_resource_by_id(resource_id)
            .await?
            .ok_or_else(|| AuthError::not_found(format!("resource {} not found", resource_id)))?;

        self.access.require_item_access(identity, &resource, is_read)?;
        Ok(resource)
    }

    /// Get the authentication configuration
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Get the token service
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Get the access control evaluator
    pub fn access(&self) -> &AccessControl {
        &self.access
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryUserStore, UserRecord};

    fn test_config() -> AuthConfig {
        AuthConfig {
            signing_secret: "unit_test_signing_secret_0123456789abcdef".to_string(),
            encryption_secret: "unit_test_encryption_secret_0123456789ab".to_string(),
            ..AuthConfig::default()
        }
    }

    fn system_with_user(email: &str, password: &str, role: &str) -> AuthSystem {
        let users = MemoryUserStore::with_users([UserRecord {
            id: 42,
            username: "ada".to_string(),
            email: email.to_string(),
            role: role.to_string(),
            password_hash: password::hash_password(password).unwrap(),
        }]);
        AuthSystem::new(&test_config(), Arc::new(users)).unwrap()
    }

    #[test]
    fn test_identity_anonymous() {
        let identity = Identity::anonymous();
        assert!(identity.is_anonymous());
        assert_eq!(identity.role, ANONYMOUS);
    }

    #[tokio::test]
    async fn test_sign_in_success() {
        let auth = system_with_user("a@b.com", "pw", "user");
        let pair = auth.sign_in("a@b.com", "pw").await.unwrap();

        let identity = auth.resolve_identity(Some(&pair.access_token)).unwrap();
        assert_eq!(identity.user_id, "42");
        assert_eq!(identity.role, "user");
    }

    #[tokio::test]
    async fn test_sign_in_failures_are_indistinguishable() {
        let auth = system_with_user("a@b.com", "pw", "user");

        let unknown = auth.sign_in("x@y.com", "pw").await.unwrap_err();
        let wrong = auth.sign_in("a@b.com", "nope").await.unwrap_err();

        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn test_invalid_config_rejected_at_construction() {
        let config = AuthConfig {
            signing_secret: "short".to_string(),
            ..test_config()
        };
        let users = Arc::new(MemoryUserStore::new());
        assert!(AuthSystem::new(&config, users).is_err());
    }
}
