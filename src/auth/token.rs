//! Token service
//!
//! Mints, protects, and validates bearer credentials. A credential is a
//! HS512-signed assertion of subject and role with a fixed lifetime window;
//! its wire form is an encrypted envelope (see [`super::envelope`]). The
//! service is stateless: there is no session store and no revocation list, so
//! a credential is invalidated only by its expiry.

use super::Identity;
use super::envelope::EnvelopeCipher;
use crate::config::AuthConfig;
use crate::utils::error::{AuthError, InvalidTokenReason, Result};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};
use uuid::Uuid;

/// Credential claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (numeric user id, as string)
    pub sub: String,
    /// Username at issuance time
    pub username: String,
    /// Role at issuance time
    pub role: String,
    /// Issued at timestamp
    pub iat: u64,
    /// Expiration timestamp
    pub exp: u64,
    /// Issuer
    pub iss: String,
    /// Audience, tied to the credential kind
    pub aud: String,
    /// Credential ID
    pub jti: String,
    /// Credential kind
    pub kind: TokenKind,
}

/// Credential kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Short-lived credential presented on every request
    Access,
    /// Longer-lived credential exchanged for a fresh pair
    Refresh,
}

impl TokenKind {
    fn audience(self) -> &'static str {
        match self {
            TokenKind::Access => "api",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// Credential pair handed to the client after sign-in or refresh.
/// Both members are encrypted envelopes, opaque to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access credential envelope
    pub access_token: String,
    /// Refresh credential envelope
    pub refresh_token: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// Access credential lifetime in seconds
    pub expires_in: u64,
}

/// Token service for credential operations
#[derive(Clone)]
pub struct TokenService {
    /// Encoding key for signing credentials
    encoding_key: EncodingKey,
    /// Decoding key for verifying credentials
    decoding_key: DecodingKey,
    /// Signature algorithm (HMAC-SHA-512)
    algorithm: Algorithm,
    /// Access credential lifetime in seconds
    access_ttl: u64,
    /// Refresh credential lifetime in seconds
    refresh_ttl: u64,
    /// Issuer claim
    issuer: String,
    /// Envelope cipher for the wire form
    cipher: EnvelopeCipher,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &self.algorithm)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("issuer", &self.issuer)
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl TokenService {
    /// Create a new token service from validated configuration
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.signing_secret.as_bytes();

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS512,
            access_ttl: config.access_token_ttl,
            refresh_ttl: config.refresh_token_ttl,
            issuer: config.issuer.clone(),
            cipher: EnvelopeCipher::new(config.encryption_secret.as_bytes()),
        }
    }

    /// Mint an access + refresh pair for a subject, both sealed into
    /// envelopes. Fails with a signing error only if the encode step itself
    /// fails, which is not expected in normal operation.
    pub fn issue_token_pair(
        &self,
        user_id: &str,
        username: &str,
        role: &str,
    ) -> Result<TokenPair> {
        let access = self.sign(user_id, username, role, TokenKind::Access)?;
        let refresh = self.sign(user_id, username, role, TokenKind::Refresh)?;

        debug!(user_id, role, "issued credential pair");

        Ok(TokenPair {
            access_token: self.protect(&access)?,
            refresh_token: self.protect(&refresh)?,
            token_type: "Bearer".to_string(),
            expires_in: self.access_ttl,
        })
    }

    /// Encrypt a signed credential into its wire envelope
    pub fn protect(&self, credential: &str) -> Result<String> {
        self.cipher.seal(credential)
    }

    /// Decrypt a wire envelope back into the signed credential
    pub fn unprotect(&self, envelope: &str) -> Result<String> {
        self.cipher.open(envelope)
    }

    /// Resolve the identity asserted by a request token.
    ///
    /// An absent token is not an error: anonymous access is a first-class
    /// outcome, and the access decision is deferred to the evaluator. A
    /// present token must unprotect, verify, and be of the access kind.
    pub fn resolve_identity(&self, token: Option<&str>) -> Result<Identity> {
        let Some(envelope) = token else {
            return Ok(Identity::anonymous());
        };

        let credential = self.unprotect(envelope)?;
        let claims = self.verify(&credential, TokenKind::Access)?;

        debug!(user_id = %claims.sub, role = %claims.role, "resolved identity");

        Ok(Identity {
            user_id: claims.sub,
            role: claims.role,
        })
    }

    /// Exchange a refresh credential for a brand-new pair (rotation, not
    /// reuse). An invalid or expired refresh credential is terminal for the
    /// client session; the client must sign in again.
    pub fn refresh(&self, refresh_envelope: &str) -> Result<TokenPair> {
        let credential = self.unprotect(refresh_envelope)?;
        let claims = self.verify(&credential, TokenKind::Refresh)?;

        debug!(user_id = %claims.sub, "refreshed credential pair");

        self.issue_token_pair(&claims.sub, &claims.username, &claims.role)
    }

    /// Access credential lifetime in seconds
    pub fn access_ttl(&self) -> u64 {
        self.access_ttl
    }

    /// Sign a credential of the given kind
    fn sign(&self, user_id: &str, username: &str, role: &str, kind: TokenKind) -> Result<String> {
        let now = current_time()?;
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            role: role.to_string(),
            iat: now,
            exp: now + ttl,
            iss: self.issuer.clone(),
            aud: kind.audience().to_string(),
            jti: Uuid::new_v4().to_string(),
            kind,
        };

        let header = Header::new(self.algorithm);
        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| AuthError::signing(e.to_string()))
    }

    /// Verify signature, expiry, issuer, and kind of a signed credential.
    /// Expiry is compared against current time with zero leeway.
    fn verify(&self, credential: &str, expected: TokenKind) -> Result<Claims> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[expected.audience()]);

        let token_data =
            decode::<Claims>(credential, &self.decoding_key, &validation).map_err(|e| {
                warn!(error = %e, "credential verification failed");
                map_decode_error(&e, expected)
            })?;

        if token_data.claims.kind != expected {
            return Err(AuthError::InvalidToken(InvalidTokenReason::WrongKind));
        }

        Ok(token_data.claims)
    }
}

/// Translate jsonwebtoken failures into the credential error taxonomy.
/// The expiry reason carries the kind the caller expected, so an expired
/// access credential reports as refreshable while an expired refresh
/// credential reports as terminal.
fn map_decode_error(error: &jsonwebtoken::errors::Error, expected: TokenKind) -> AuthError {
    use jsonwebtoken::errors::ErrorKind;

    let reason = match error.kind() {
        ErrorKind::ExpiredSignature => InvalidTokenReason::Expired { kind: expected },
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
            InvalidTokenReason::BadSignature
        }
        ErrorKind::InvalidAudience => InvalidTokenReason::WrongKind,
        _ => InvalidTokenReason::Malformed,
    };

    AuthError::InvalidToken(reason)
}

fn current_time() -> Result<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| AuthError::internal(format!("system time error: {}", e)))
}
