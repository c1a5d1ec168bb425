//! Merchant credentials and encryption key derivation
//!
//! The gateway decrypts charge payloads with a key it derives from the
//! merchant's secret key. The derivation (MD5 included) is fixed by the
//! gateway's wire format and must be reproduced exactly; it is not a
//! general-purpose key derivation function.

use crate::error::{RaveError, RaveResult};
use md5::{Digest, Md5};
use std::fmt;

/// Prefix carried by every Rave secret key.
pub const SECRET_KEY_PREFIX: &str = "FLWSECK-";

/// Length in bytes of a triple-DES (EDE3) key.
pub const ENCRYPTION_KEY_LEN: usize = 24;

const HALF_LEN: usize = 12;

/// 24-byte key used to encrypt charge payloads.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionKey(String);

impl EncryptionKey {
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey(<redacted>)")
    }
}

/// Derive the payload encryption key from a secret key.
///
/// First 12 characters of the secret key without its `FLWSECK-` prefix,
/// followed by the last 12 hex digits of the MD5 of the full secret key.
pub fn derive_encryption_key(secret_key: &str) -> RaveResult<EncryptionKey> {
    if secret_key.is_empty() {
        return Err(RaveError::configuration(
            "A secret key is required to derive the encryption key",
        ));
    }

    let hashed = hex::encode(Md5::digest(secret_key.as_bytes()));
    let hashed_last12 = &hashed[hashed.len() - HALF_LEN..];

    let adjusted = secret_key.replace(SECRET_KEY_PREFIX, "");
    let adjusted_first12: String = adjusted.chars().take(HALF_LEN).collect();

    let key = format!("{}{}", adjusted_first12, hashed_last12);
    if key.len() != ENCRYPTION_KEY_LEN {
        return Err(RaveError::configuration(format!(
            "Secret key is too short to derive a {}-byte encryption key",
            ENCRYPTION_KEY_LEN
        )));
    }

    Ok(EncryptionKey(key))
}

/// Public/secret key pair with the encryption key derived once at construction.
#[derive(Clone)]
pub struct Credentials {
    public_key: String,
    secret_key: String,
    encryption_key: EncryptionKey,
}

impl Credentials {
    pub fn new(public_key: impl Into<String>, secret_key: impl Into<String>) -> RaveResult<Self> {
        let public_key = public_key.into();
        let secret_key = secret_key.into();

        if public_key.trim().is_empty() {
            return Err(RaveError::configuration("A public key is required"));
        }
        if secret_key.trim().is_empty() {
            return Err(RaveError::configuration("A secret key is required"));
        }

        let encryption_key = derive_encryption_key(&secret_key)?;

        Ok(Self {
            public_key,
            secret_key,
            encryption_key,
        })
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Only sent to the direct-secret endpoints (verify, capture, void, refund).
    pub(crate) fn secret_key(&self) -> &str {
        &self.secret_key
    }

    pub fn encryption_key(&self) -> &EncryptionKey {
        &self.encryption_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("public_key", &self.public_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}
