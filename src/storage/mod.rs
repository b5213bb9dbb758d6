//! Storage collaborator seams
//!
//! The auth core performs no persistence of its own. Sign-in needs a user
//! lookup and item authorization needs an ownership view of the resource;
//! both are reached through these traits, implemented by the host
//! application's data layer.

pub mod memory;

use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use memory::{MemoryResourceStore, MemoryUserStore};

/// Stored user as seen by the sign-in flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Numeric user identifier
    pub id: i64,
    /// Display name, carried into credential claims
    pub username: String,
    /// Sign-in email address
    pub email: String,
    /// Role name from the configured hierarchy
    pub role: String,
    /// Argon2 password hash (PHC string)
    pub password_hash: String,
}

/// Ownership view of a domain entity (post, album, photo) used for access
/// decisions. The core only reads these two fields; everything else about the
/// entity stays with its owning service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipRecord {
    /// Resource identifier, echoed into denial errors for audit logs
    pub id: String,
    /// Numeric id of the owning user
    pub owner_id: i64,
    /// Private resources are visible only to their owner and elevated roles
    pub is_private: bool,
}

/// User lookup for the sign-in flow
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user by email. `Ok(None)` means no such user; the caller folds
    /// that into the same error as a wrong password.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>>;
}

/// Ownership lookup for protected entities
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Fetch the ownership record for a resource. `Ok(None)` means the
    /// resource does not exist.
    async fn find_resource_by_id(&self, id: &str) -> Result<Option<OwnershipRecord>>;
}
