//! Access control evaluator
//!
//! Yes/no decisions for an (identity, action, resource) triple. Every
//! decision is a pure function of the resolved identity, the configured role
//! hierarchy, and the resource's ownership record; the evaluator holds no
//! mutable state and performs no I/O.
//!
//! Rules are evaluated in a fixed order and the first match wins. The public
//! read short-circuit comes first unconditionally: a read of a non-private
//! resource never consults the identity at all, so it succeeds even for
//! anonymous requests.

use super::Identity;
use crate::config::RoleConfig;
use crate::storage::OwnershipRecord;
use crate::utils::error::{AuthError, Result};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Role-tiered access control evaluator
#[derive(Debug, Clone)]
pub struct AccessControl {
    /// Role with implicit access to everything
    superuser_role: String,
    /// Roles with access to all resources
    admin_roles: HashSet<String>,
    /// Roles with access to owned and public resources
    editor_roles: HashSet<String>,
}

impl AccessControl {
    /// Build an evaluator from the configured role hierarchy
    pub fn new(roles: &RoleConfig) -> Self {
        Self {
            superuser_role: roles.superuser_role.clone(),
            admin_roles: roles.admin_roles.iter().cloned().collect(),
            editor_roles: roles.editor_roles.iter().cloned().collect(),
        }
    }

    /// Allow only the superuser. Guards role changes and other
    /// administrative actions no admin tier may perform.
    pub fn require_superuser(&self, identity: &Identity) -> Result<()> {
        if identity.role == self.superuser_role {
            return Ok(());
        }

        warn!(user_id = %identity.user_id, role = %identity.role, "superuser check denied");
        Err(AuthError::forbidden(
            identity.user_id.clone(),
            "superuser-only action".to_string(),
        ))
    }

    /// Allow admins, the superuser, or the profile's own user.
    /// Editor roles get no profile access.
    pub fn require_profile_access(&self, identity: &Identity, target_user_id: &str) -> Result<()> {
        if self.is_elevated(&identity.role) || same_user(&identity.user_id, target_user_id) {
            return Ok(());
        }

        warn!(
            user_id = %identity.user_id,
            target = %target_user_id,
            "profile access denied"
        );
        Err(AuthError::forbidden(
            identity.user_id.clone(),
            format!("profile {}", target_user_id),
        ))
    }

    /// Decide access to an item (post, album, photo).
    ///
    /// Fixed rule order, first match wins:
    /// 1. public read — `is_read` and the resource is not private; the
    ///    identity is not consulted, so anonymous reads of public items pass
    /// 2. admin roles (and the superuser)
    /// 3. editor roles
    /// 4. ownership, compared numerically after coercing the identity's
    ///    user id
    pub fn require_item_access(
        &self,
        identity: &Identity,
        resource: &OwnershipRecord,
        is_read: bool,
    ) -> Result<()> {
        if is_read && !resource.is_private {
            return Ok(());
        }

        if self.is_elevated(&identity.role)
            || self.editor_roles.contains(&identity.role)
            || self.is_owner(identity, resource.owner_id)
        {
            debug!(
                user_id = %identity.user_id,
                resource_id = %resource.id,
                "item access granted"
            );
            return Ok(());
        }

        warn!(
            user_id = %identity.user_id,
            resource_id = %resource.id,
            is_read,
            "item access denied"
        );
        Err(AuthError::forbidden(
            identity.user_id.clone(),
            resource.id.clone(),
        ))
    }

    /// Ownership test used for mixed listing decisions: owners (and elevated
    /// roles) see private and public items, everyone else public only.
    /// Never denies; the caller picks the query variant.
    pub fn is_owner(&self, identity: &Identity, owner_id: i64) -> bool {
        identity
            .user_id
            .parse::<i64>()
            .map(|id| id == owner_id)
            .unwrap_or(false)
    }

    /// Superuser or admin tier
    fn is_elevated(&self, role: &str) -> bool {
        role == self.superuser_role || self.admin_roles.contains(role)
    }
}

/// Identity-to-identity comparison: numeric when both sides coerce,
/// string equality otherwise. The anonymous sentinel never coerces.
fn same_user(a: &str, b: &str) -> bool {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x == y,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluator() -> AccessControl {
        AccessControl::new(&RoleConfig::default())
    }

    fn identity(user_id: &str, role: &str) -> Identity {
        Identity {
            user_id: user_id.to_string(),
            role: role.to_string(),
        }
    }

    fn resource(id: &str, owner_id: i64, is_private: bool) -> OwnershipRecord {
        OwnershipRecord {
            id: id.to_string(),
            owner_id,
            is_private,
        }
    }

    #[test]
    fn test_public_read_allows_everyone() {
        let access = evaluator();
        let public = resource("post-1", 7, false);

        for who in [
            Identity::anonymous(),
            identity("5", "user"),
            identity("7", "user"),
            identity("1", "admin"),
            identity("2", "editor"),
            identity("3", "superuser"),
        ] {
            assert!(access.require_item_access(&who, &public, true).is_ok());
        }
    }

    #[test]
    fn test_public_write_still_needs_a_tier() {
        let access = evaluator();
        let public = resource("post-1", 7, false);

        // The short-circuit is for reads only; writes fall through to the
        // role and ownership rules.
        assert!(access
            .require_item_access(&identity("5", "user"), &public, false)
            .is_err());
        assert!(access
            .require_item_access(&identity("7", "user"), &public, false)
            .is_ok());
        assert!(access
            .require_item_access(&Identity::anonymous(), &public, false)
            .is_err());
    }

    #[test]
    fn test_private_item_denied_to_strangers() {
        let access = evaluator();
        let private = resource("album-9", 7, true);

        let err = access
            .require_item_access(&identity("5", "user"), &private, true)
            .unwrap_err();
        match err {
            AuthError::Forbidden {
                user_id,
                resource_id,
            } => {
                assert_eq!(user_id, "5");
                assert_eq!(resource_id, "album-9");
            }
            other => panic!("expected Forbidden, got {:?}", other),
        }
    }

    #[test]
    fn test_private_item_allowed_to_owner_editor_admin() {
        let access = evaluator();
        let private = resource("album-9", 7, true);

        assert!(access
            .require_item_access(&identity("7", "user"), &private, true)
            .is_ok());
        assert!(access
            .require_item_access(&identity("5", "editor"), &private, false)
            .is_ok());
        assert!(access
            .require_item_access(&identity("5", "admin"), &private, false)
            .is_ok());
        assert!(access
            .require_item_access(&identity("5", "superuser"), &private, false)
            .is_ok());
    }

    #[test]
    fn test_anonymous_private_read_is_forbidden() {
        let access = evaluator();
        let private = resource("photo-3", 7, true);

        assert!(matches!(
            access.require_item_access(&Identity::anonymous(), &private, true),
            Err(AuthError::Forbidden { .. })
        ));
    }

    #[test]
    fn test_profile_access() {
        let access = evaluator();

        assert!(access
            .require_profile_access(&identity("5", "user"), "5")
            .is_ok());
        assert!(access
            .require_profile_access(&identity("5", "user"), "6")
            .is_err());
        assert!(access
            .require_profile_access(&identity("1", "admin"), "6")
            .is_ok());
        // Editors get no profile access.
        assert!(access
            .require_profile_access(&identity("5", "editor"), "6")
            .is_err());
    }

    #[test]
    fn test_superuser_check() {
        let access = evaluator();

        assert!(access.require_superuser(&identity("1", "superuser")).is_ok());
        assert!(access.require_superuser(&identity("1", "admin")).is_err());
        assert!(access.require_superuser(&Identity::anonymous()).is_err());
    }

    #[test]
    fn test_is_owner_coercion() {
        let access = evaluator();

        assert!(access.is_owner(&identity("7", "user"), 7));
        assert!(!access.is_owner(&identity("8", "user"), 7));
        assert!(!access.is_owner(&Identity::anonymous(), 7));
    }

    #[test]
    fn test_unknown_role_gets_no_tier() {
        let access = evaluator();
        let private = resource("post-2", 7, true);

        assert!(access
            .require_item_access(&identity("5", "moderator"), &private, true)
            .is_err());
    }
}
