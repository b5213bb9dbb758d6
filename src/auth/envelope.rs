//! Envelope encryption for signed credentials
//!
//! Signed credentials never travel in the clear: the wire form is an
//! AES-256-GCM envelope under a server-held secret, opaque to the client and
//! round-tripped byte-for-byte. Each seal uses a fresh random nonce, so two
//! envelopes of the same credential differ; authentication rejects tampering
//! before any plaintext is produced.
//!
//! Output format: `base64(nonce || ciphertext || tag)`
//! - nonce: 12 bytes (randomly generated)
//! - ciphertext: variable length
//! - tag: 16 bytes

use crate::utils::error::{AuthError, Result};
use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, KeyInit},
};
use base64::{Engine as _, engine::general_purpose};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// AES-256-GCM nonce size (96 bits as recommended by NIST)
const NONCE_SIZE: usize = 12;

/// AES-256-GCM authentication tag size
const TAG_SIZE: usize = 16;

/// Symmetric cipher for protecting signed credentials
#[derive(Clone)]
pub struct EnvelopeCipher {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for EnvelopeCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvelopeCipher")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl EnvelopeCipher {
    /// Create a cipher from an arbitrary-length secret. The 256-bit key is
    /// derived with SHA-256 so the configured secret need not be exactly
    /// 32 bytes.
    pub fn new(secret: &[u8]) -> Self {
        let derived: [u8; 32] = Sha256::digest(secret).into();
        let key = Key::<Aes256Gcm>::from_slice(&derived);

        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    /// Encrypt a signed credential string into its wire envelope.
    pub fn seal(&self, credential: &str) -> Result<String> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, credential.as_bytes())
            .map_err(|e| AuthError::crypto(format!("envelope encryption failed: {}", e)))?;

        let mut output = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        output.extend_from_slice(&nonce_bytes);
        output.extend_from_slice(&ciphertext);

        Ok(general_purpose::STANDARD.encode(&output))
    }

    /// Decrypt a wire envelope back into the signed credential string.
    ///
    /// Fails with a decryption error when the envelope is malformed,
    /// truncated, tampered with, or was sealed under a different secret.
    pub fn open(&self, envelope: &str) -> Result<String> {
        let bytes = general_purpose::STANDARD
            .decode(envelope)
            .map_err(|e| AuthError::decryption(format!("envelope is not valid base64: {}", e)))?;

        if bytes.len() < NONCE_SIZE + TAG_SIZE {
            return Err(AuthError::decryption(
                "envelope too short; possible corruption or tampering",
            ));
        }

        let nonce = Nonce::from_slice(&bytes[..NONCE_SIZE]);
        let ciphertext = &bytes[NONCE_SIZE..];

        let plaintext = self.cipher.decrypt(nonce, ciphertext).map_err(|_| {
            AuthError::decryption("envelope rejected; tampered data or wrong key")
        })?;

        String::from_utf8(plaintext)
            .map_err(|e| AuthError::decryption(format!("envelope payload is not UTF-8: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> EnvelopeCipher {
        EnvelopeCipher::new(b"test_envelope_secret_with_enough_length")
    }

    #[test]
    fn test_seal_open_round_trip() {
        let c = cipher();
        let credential = "header.payload.signature";

        let envelope = c.seal(credential).unwrap();
        assert_ne!(envelope, credential);
        assert_eq!(c.open(&envelope).unwrap(), credential);
    }

    #[test]
    fn test_fresh_nonce_per_seal() {
        let c = cipher();
        let credential = "same credential sealed twice";

        let e1 = c.seal(credential).unwrap();
        let e2 = c.seal(credential).unwrap();
        assert_ne!(e1, e2);

        assert_eq!(c.open(&e1).unwrap(), credential);
        assert_eq!(c.open(&e2).unwrap(), credential);
    }

    #[test]
    fn test_wrong_key_rejected() {
        let envelope = cipher().seal("secret credential").unwrap();
        let other = EnvelopeCipher::new(b"a_completely_different_secret_value_here");

        assert!(matches!(
            other.open(&envelope),
            Err(AuthError::Decryption(_))
        ));
    }

    #[test]
    fn test_tampered_envelope_rejected() {
        let c = cipher();
        let envelope = c.seal("important credential").unwrap();

        let mut bytes = general_purpose::STANDARD.decode(&envelope).unwrap();
        if let Some(byte) = bytes.last_mut() {
            *byte ^= 0xFF;
        }
        let tampered = general_purpose::STANDARD.encode(&bytes);

        assert!(matches!(c.open(&tampered), Err(AuthError::Decryption(_))));
    }

    #[test]
    fn test_garbage_and_short_input_rejected() {
        let c = cipher();

        assert!(c.open("not base64 at all!!!").is_err());

        let short = general_purpose::STANDARD.encode([0u8; 10]);
        assert!(matches!(c.open(&short), Err(AuthError::Decryption(_))));
    }

    #[test]
    fn test_debug_redacts_key() {
        let repr = format!("{:?}", cipher());
        assert!(repr.contains("[REDACTED]"));
    }
}
