//! # portal-auth
//!
//! Authentication and access-control core for a multi-tenant photo/blog
//! portal. The REST layer, ORM models, and front-end clients live elsewhere;
//! this crate owns the two pieces with a security contract:
//!
//! - **Token service**: issues access/refresh credential pairs signed with
//!   HMAC-SHA-512 and sealed into AES-256-GCM envelopes, resolves inbound
//!   tokens to an [`Identity`] (anonymous when absent), and rotates pairs on
//!   refresh.
//! - **Access control evaluator**: allow/deny for profile, item, and
//!   superuser-only actions from a fixed role hierarchy
//!   (superuser > admin > editor > user > anonymous) plus ownership.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use portal_auth::{AuthConfig, AuthSystem};
//! use portal_auth::storage::{MemoryResourceStore, MemoryUserStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AuthConfig::from_env()?;
//!     let users = Arc::new(MemoryUserStore::new());
//!     let auth = AuthSystem::new(&config, users)?;
//!
//!     // Sign-in mints an encrypted credential pair.
//!     let pair = auth.sign_in("a@b.com", "pw").await?;
//!
//!     // Per request: resolve the (optional) token, then evaluate access.
//!     let identity = auth.resolve_identity(Some(&pair.access_token))?;
//!     let resources = MemoryResourceStore::new();
//!     let record = auth
//!         .authorize_item(&resources, &identity, "album-1", true)
//!         .await?;
//!     println!("allowed on resource owned by {}", record.owner_id);
//!
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod auth;
pub mod config;
pub mod storage;
pub mod utils;

// Re-export main types
pub use auth::{AccessControl, AuthSystem, Claims, Identity, TokenKind, TokenPair, TokenService};
pub use config::{AuthConfig, RoleConfig};
pub use storage::{OwnershipRecord, ResourceStore, UserRecord, UserStore};
pub use utils::error::{AuthError, ErrorResponse, InvalidTokenReason, Result};
pub use utils::logging::init_logging;

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(VERSION, env!("CARGO_PKG_VERSION"));
        assert_eq!(NAME, "portal-auth");
    }
}
