//! Sealing of the backend bearer token
//!
//! The token is encrypted with AES-256-GCM and bound to the backend it was
//! issued by: the normalized base URL is authenticated as associated data,
//! so a credentials file copied next to another backend's settings does not
//! open there.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::{FieldSalesError, FieldSalesResult};

use super::DerivedKey;

const NONCE_SIZE: usize = 12;

/// Layout version; 1 was an unbound token
const SEAL_VERSION: u8 = 2;

/// An encrypted token and the backend it belongs to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SealedToken {
    /// Base URL the token was issued for, kept readable for `auth status`
    pub backend: String,
    pub nonce: String,
    pub ciphertext: String,
    #[serde(default)]
    pub version: u8,
}

impl SealedToken {
    /// Whether the token was sealed for this backend
    pub fn is_for(&self, backend: &str) -> bool {
        self.backend == normalize_backend(backend)
    }
}

/// Trailing slashes and letter case of the scheme and host don't change
/// which backend is meant
pub fn normalize_backend(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    match url.split_once("://") {
        Some((scheme, rest)) => {
            let (host, path) = rest.split_at(rest.find('/').unwrap_or(rest.len()));
            format!("{}://{}{}", scheme.to_lowercase(), host.to_lowercase(), path)
        }
        None => url.to_string(),
    }
}

fn cipher(key: &DerivedKey) -> FieldSalesResult<Aes256Gcm> {
    Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| FieldSalesError::Encryption(format!("Failed to create cipher: {}", e)))
}

fn decode(value: &str, what: &str) -> FieldSalesResult<Vec<u8>> {
    STANDARD
        .decode(value)
        .map_err(|e| FieldSalesError::Encryption(format!("Invalid {} encoding: {}", what, e)))
}

/// Encrypt a token for one backend
pub fn seal_token(token: &str, backend: &str, key: &DerivedKey) -> FieldSalesResult<SealedToken> {
    let backend = normalize_backend(backend);
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);

    let ciphertext = cipher(key)?
        .encrypt(
            Nonce::from_slice(&nonce_bytes),
            Payload {
                msg: token.as_bytes(),
                aad: backend.as_bytes(),
            },
        )
        .map_err(|e| FieldSalesError::Encryption(format!("Encryption failed: {}", e)))?;

    Ok(SealedToken {
        backend,
        nonce: STANDARD.encode(nonce_bytes),
        ciphertext: STANDARD.encode(ciphertext),
        version: SEAL_VERSION,
    })
}

/// Decrypt a token sealed for `backend`
pub fn open_token(sealed: &SealedToken, backend: &str, key: &DerivedKey) -> FieldSalesResult<Zeroizing<String>> {
    if sealed.version != SEAL_VERSION {
        return Err(FieldSalesError::Encryption(format!(
            "Stored token uses layout version {}; log in again",
            sealed.version
        )));
    }
    if !sealed.is_for(backend) {
        return Err(FieldSalesError::Encryption(format!(
            "Stored token belongs to {}, not {}",
            sealed.backend,
            normalize_backend(backend)
        )));
    }

    let nonce_bytes = decode(&sealed.nonce, "nonce")?;
    if nonce_bytes.len() != NONCE_SIZE {
        return Err(FieldSalesError::Encryption(format!(
            "Invalid nonce size: expected {}, got {}",
            NONCE_SIZE,
            nonce_bytes.len()
        )));
    }
    let ciphertext = decode(&sealed.ciphertext, "ciphertext")?;

    let plaintext = Zeroizing::new(
        cipher(key)?
            .decrypt(
                Nonce::from_slice(&nonce_bytes),
                Payload {
                    msg: &ciphertext,
                    aad: sealed.backend.as_bytes(),
                },
            )
            .map_err(|_| {
                FieldSalesError::Encryption("Decryption failed: wrong passphrase or corrupted data".into())
            })?,
    );

    std::str::from_utf8(&plaintext)
        .map(|s| Zeroizing::new(s.to_string()))
        .map_err(|e| FieldSalesError::Encryption(format!("Stored token is not text: {}", e)))
}
