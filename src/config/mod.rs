//! Authentication configuration
//!
//! Secrets, credential lifetimes, and the role hierarchy. Loaded once at
//! startup and passed into the token service and access control evaluator by
//! reference; the components never reach for globals.

use crate::utils::error::{AuthError, Result};
use rand::distributions::Alphanumeric;
use rand::{Rng, thread_rng};
use serde::{Deserialize, Serialize};

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign credentials (HMAC-SHA-512)
    pub signing_secret: String,
    /// Secret used to encrypt signed credentials into wire envelopes
    pub encryption_secret: String,
    /// Access credential lifetime in seconds
    #[serde(default = "default_access_token_ttl")]
    pub access_token_ttl: u64,
    /// Refresh credential lifetime in seconds
    #[serde(default = "default_refresh_token_ttl")]
    pub refresh_token_ttl: u64,
    /// Issuer claim stamped into every credential
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// Role hierarchy
    #[serde(default)]
    pub roles: RoleConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            signing_secret: generate_secure_secret(),
            encryption_secret: generate_secure_secret(),
            access_token_ttl: default_access_token_ttl(),
            refresh_token_ttl: default_refresh_token_ttl(),
            issuer: default_issuer(),
            roles: RoleConfig::default(),
        }
    }
}

impl AuthConfig {
    /// Load configuration from the environment.
    ///
    /// Reads `PORTAL_*` variables (e.g. `PORTAL_SIGNING_SECRET`,
    /// `PORTAL_ACCESS_TOKEN_TTL`), with `.env` file support for development.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix("PORTAL").separator("__"))
            .build()
            .map_err(|e| AuthError::config(format!("failed to read environment: {}", e)))?;

        let cfg: AuthConfig = settings
            .try_deserialize()
            .map_err(|e| AuthError::config(format!("invalid configuration: {}", e)))?;

        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.signing_secret.len() < 32 {
            return Err(AuthError::config(
                "signing secret must be at least 32 characters long",
            ));
        }

        if self.encryption_secret.len() < 32 {
            return Err(AuthError::config(
                "encryption secret must be at least 32 characters long",
            ));
        }

        if self.signing_secret == "change-me" || self.encryption_secret == "change-me" {
            return Err(AuthError::config(
                "secrets must not use placeholder values; generate random secrets",
            ));
        }

        if self.access_token_ttl < 60 {
            return Err(AuthError::config(
                "access token lifetime should be at least 60 seconds",
            ));
        }

        if self.access_token_ttl > 86_400 {
            return Err(AuthError::config(
                "access token lifetime should not exceed 24 hours",
            ));
        }

        if self.refresh_token_ttl <= self.access_token_ttl {
            return Err(AuthError::config(
                "refresh token lifetime must exceed the access token lifetime",
            ));
        }

        self.roles.validate()
    }
}

/// Role hierarchy configuration
///
/// Tiers, from widest to narrowest: superuser (everything, including role
/// changes), admin roles (all resources), editor roles (own plus public
/// resources, no profile access), the baseline authenticated role, and the
/// implicit anonymous tier (public reads only).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleConfig {
    /// Role with implicit access to everything
    #[serde(default = "default_superuser_role")]
    pub superuser_role: String,
    /// Roles with access to all resources except superuser-only actions
    #[serde(default = "default_admin_roles")]
    pub admin_roles: Vec<String>,
    /// Roles with access to owned and public resources
    #[serde(default = "default_editor_roles")]
    pub editor_roles: Vec<String>,
    /// Baseline role assigned to newly registered users
    #[serde(default = "default_role")]
    pub default_role: String,
}

impl Default for RoleConfig {
    fn default() -> Self {
        Self {
            superuser_role: default_superuser_role(),
            admin_roles: default_admin_roles(),
            editor_roles: default_editor_roles(),
            default_role: default_role(),
        }
    }
}

impl RoleConfig {
    fn validate(&self) -> Result<()> {
        if self.superuser_role.is_empty() || self.default_role.is_empty() {
            return Err(AuthError::config("role names cannot be empty"));
        }

        if self.admin_roles.contains(&self.superuser_role) {
            return Err(AuthError::config(
                "the superuser role must not also appear among admin roles",
            ));
        }

        Ok(())
    }
}

fn default_access_token_ttl() -> u64 {
    900 // 15 minutes
}

fn default_refresh_token_ttl() -> u64 {
    604_800 // 7 days
}

fn default_issuer() -> String {
    "portal-auth".to_string()
}

fn default_superuser_role() -> String {
    "superuser".to_string()
}

fn default_admin_roles() -> Vec<String> {
    vec!["admin".to_string()]
}

fn default_editor_roles() -> Vec<String> {
    vec!["editor".to_string()]
}

fn default_role() -> String {
    "user".to_string()
}

/// Generate a secure random secret
fn generate_secure_secret() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AuthConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.access_token_ttl, 900);
        assert_eq!(config.roles.default_role, "user");
    }

    #[test]
    fn test_generated_secrets_differ() {
        let config = AuthConfig::default();
        assert_ne!(config.signing_secret, config.encryption_secret);
        assert_eq!(config.signing_secret.len(), 64);
    }

    #[test]
    fn test_short_secret_rejected() {
        let config = AuthConfig {
            signing_secret: "short".to_string(),
            ..AuthConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_refresh_ttl_must_exceed_access_ttl() {
        let config = AuthConfig {
            access_token_ttl: 900,
            refresh_token_ttl: 900,
            ..AuthConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_superuser_not_in_admin_roles() {
        let config = AuthConfig {
            roles: RoleConfig {
                admin_roles: vec!["admin".to_string(), "superuser".to_string()],
                ..RoleConfig::default()
            },
            ..AuthConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
