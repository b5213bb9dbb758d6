//! Error handling for the auth core
//!
//! This module defines the error taxonomy shared by the token service and the
//! access control evaluator, together with the portal's wire contract for
//! failed requests.

#![allow(missing_docs)]

use crate::auth::token::TokenKind;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

/// Result type alias for the auth core
pub type Result<T> = std::result::Result<T, AuthError>;

/// Main error type for the auth core
#[derive(Error, Debug)]
pub enum AuthError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential minting failed; not expected in normal operation
    #[error("Credential signing failed: {0}")]
    Signing(String),

    /// Envelope cannot be unprotected (corrupt, truncated, or wrong key)
    #[error("Envelope decryption failed: {0}")]
    Decryption(String),

    /// Signature invalid, credential expired, or wrong credential kind
    #[error("Invalid token: {0}")]
    InvalidToken(InvalidTokenReason),

    /// Sign-in rejected; unknown email and wrong password are indistinguishable
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Identity resolved but lacks permission for the resource
    #[error("User {user_id} denied access to resource {resource_id}")]
    Forbidden {
        /// Acting user id (may be the anonymous sentinel)
        user_id: String,
        /// Identifier of the resource the access was attempted on
        resource_id: String,
    },

    /// Resource missing; checked before any access evaluation
    #[error("Not found: {0}")]
    NotFound(String),

    /// Cryptographic operation failed (hashing, key handling)
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Storage collaborator failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Why a credential was rejected during verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidTokenReason {
    /// The credential's expiry window has passed
    Expired {
        /// Which credential kind expired
        kind: TokenKind,
    },
    /// Signature does not verify under the signing secret
    BadSignature,
    /// Not a parseable credential at all
    Malformed,
    /// A credential of the wrong kind was presented (e.g. refresh where
    /// access was expected)
    WrongKind,
}

impl InvalidTokenReason {
    /// An expired access credential is recoverable via the refresh operation.
    /// Everything else, including an expired refresh credential, requires the
    /// client to re-authenticate.
    pub fn is_refreshable(&self) -> bool {
        matches!(
            self,
            InvalidTokenReason::Expired {
                kind: TokenKind::Access
            }
        )
    }
}

impl std::fmt::Display for InvalidTokenReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidTokenReason::Expired {
                kind: TokenKind::Access,
            } => write!(f, "access credential expired"),
            InvalidTokenReason::Expired {
                kind: TokenKind::Refresh,
            } => write!(f, "refresh credential expired"),
            InvalidTokenReason::BadSignature => write!(f, "signature verification failed"),
            InvalidTokenReason::Malformed => write!(f, "malformed credential"),
            InvalidTokenReason::WrongKind => write!(f, "wrong credential kind"),
        }
    }
}

/// Response body for failed requests: `{"success": false, "description": ...}`
/// plus a stable error flag so clients can tell "access token expired, call
/// refresh" apart from "refresh token expired, re-authenticate" — both are 401.
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub description: String,
    pub error: &'static str,
    pub timestamp: i64,
}

impl AuthError {
    /// Stable machine-readable flag for the response body
    pub fn error_flag(&self) -> &'static str {
        match self {
            AuthError::Config(_) => "config_error",
            AuthError::Signing(_) => "signing_error",
            AuthError::Decryption(_) => "invalid_envelope",
            AuthError::InvalidToken(reason) => {
                if reason.is_refreshable() {
                    "token_expired"
                } else if matches!(
                    reason,
                    InvalidTokenReason::Expired {
                        kind: TokenKind::Refresh
                    }
                ) {
                    "session_expired"
                } else {
                    "invalid_token"
                }
            }
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::Forbidden { .. } => "forbidden",
            AuthError::NotFound(_) => "not_found",
            AuthError::Crypto(_) => "crypto_error",
            AuthError::Storage(_) => "storage_error",
            AuthError::Internal(_) => "internal_error",
        }
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Decryption(_)
            | AuthError::InvalidToken(_)
            | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AuthError::NotFound(_) => StatusCode::NOT_FOUND,
            AuthError::Config(_)
            | AuthError::Signing(_)
            | AuthError::Crypto(_)
            | AuthError::Storage(_)
            | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = ErrorResponse {
            success: false,
            description: self.to_string(),
            error: self.error_flag(),
            timestamp: chrono::Utc::now().timestamp(),
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

/// Helper functions for creating specific errors
impl AuthError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn signing<S: Into<String>>(message: S) -> Self {
        Self::Signing(message.into())
    }

    pub fn decryption<S: Into<String>>(message: S) -> Self {
        Self::Decryption(message.into())
    }

    pub fn forbidden<S: Into<String>>(user_id: S, resource_id: S) -> Self {
        Self::Forbidden {
            user_id: user_id.into(),
            resource_id: resource_id.into(),
        }
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound(message.into())
    }

    pub fn crypto<S: Into<String>>(message: S) -> Self {
        Self::Crypto(message.into())
    }

    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }
}
