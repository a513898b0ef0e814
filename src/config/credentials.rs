//! Stored bearer token
//!
//! The token issued by the backend is kept in `credentials.json`, encrypted
//! under a key derived from a passphrase and bound to the backend URL it was
//! issued for. `FIELDSALES_TOKEN` bypasses the store entirely.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::paths::FieldSalesPaths;
use crate::crypto::{derive_key, open_token, seal_token, KeyDerivationParams, SealedToken};
use crate::error::{FieldSalesError, FieldSalesResult};

/// On-disk layout of `credentials.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredentials {
    /// Key derivation parameters used for this token
    pub key_params: KeyDerivationParams,
    /// The encrypted token
    pub token: SealedToken,
    /// When the token was stored
    pub saved_at: DateTime<Utc>,
}

/// Reads and writes the encrypted token file
pub struct CredentialStore {
    paths: FieldSalesPaths,
}

impl CredentialStore {
    pub fn new(paths: FieldSalesPaths) -> Self {
        Self { paths }
    }

    /// Whether a token has been stored
    pub fn exists(&self) -> bool {
        self.paths.credentials_file().exists()
    }

    /// Encrypt and persist a token for `backend`
    pub fn store(&self, token: &str, passphrase: &str, backend: &str) -> FieldSalesResult<()> {
        if token.trim().is_empty() {
            return Err(FieldSalesError::Validation("Token cannot be empty".into()));
        }
        if passphrase.is_empty() {
            return Err(FieldSalesError::Validation("Passphrase cannot be empty".into()));
        }

        let key_params = KeyDerivationParams::new();
        let key = derive_key(passphrase, &key_params)?;
        let stored = StoredCredentials {
            key_params,
            token: seal_token(token.trim(), backend, &key)?,
            saved_at: Utc::now(),
        };

        self.paths.ensure_directories()?;
        let contents = serde_json::to_string_pretty(&stored)?;
        std::fs::write(self.paths.credentials_file(), contents).map_err(|e| {
            FieldSalesError::Io(format!("Failed to write credentials file: {}", e))
        })?;
        Ok(())
    }

    /// Read the stored metadata without decrypting
    pub fn read(&self) -> FieldSalesResult<StoredCredentials> {
        let path = self.paths.credentials_file();
        if !path.exists() {
            return Err(FieldSalesError::Auth(
                "No stored token. Run 'fieldsales auth login' or set FIELDSALES_TOKEN".into(),
            ));
        }
        let contents = std::fs::read_to_string(&path).map_err(|e| {
            FieldSalesError::Io(format!("Failed to read credentials file: {}", e))
        })?;
        serde_json::from_str(&contents)
            .map_err(|e| FieldSalesError::Config(format!("Corrupt credentials file: {}", e)))
    }

    /// Decrypt the stored token for `backend`
    pub fn load(&self, passphrase: &str, backend: &str) -> FieldSalesResult<Zeroizing<String>> {
        let stored = self.read()?;
        if !stored.token.is_for(backend) {
            return Err(FieldSalesError::Auth(format!(
                "The stored token was issued by {}. Run 'fieldsales auth login' for this backend",
                stored.token.backend
            )));
        }
        let key = derive_key(passphrase, &stored.key_params)?;
        open_token(&stored.token, backend, &key).map_err(|_| {
            FieldSalesError::Auth("Could not unlock the stored token: wrong passphrase".into())
        })
    }

    /// Remove the stored token; returns whether one existed
    pub fn clear(&self) -> FieldSalesResult<bool> {
        let path = self.paths.credentials_file();
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&path).map_err(|e| {
            FieldSalesError::Io(format!("Failed to remove credentials file: {}", e))
        })?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const BACKEND: &str = "http://localhost:5000/api";

    fn store() -> (TempDir, CredentialStore) {
        let temp_dir = TempDir::new().unwrap();
        let paths = FieldSalesPaths::with_base_dir(temp_dir.path().to_path_buf());
        (temp_dir, CredentialStore::new(paths))
    }

    #[test]
    fn test_store_and_load() {
        let (_dir, store) = store();
        assert!(!store.exists());

        store.store("abc.def.ghi", "hunter2", BACKEND).unwrap();
        assert!(store.exists());

        let token = store.load("hunter2", BACKEND).unwrap();
        assert_eq!(token.as_str(), "abc.def.ghi");
    }

    #[test]
    fn test_wrong_passphrase_is_auth_error() {
        let (_dir, store) = store();
        store.store("abc", "right", BACKEND).unwrap();
        let err = store.load("wrong", BACKEND).unwrap_err();
        assert!(matches!(err, FieldSalesError::Auth(_)));
    }

    #[test]
    fn test_token_bound_to_backend() {
        let (_dir, store) = store();
        store.store("abc", "pw", BACKEND).unwrap();
        assert_eq!(store.read().unwrap().token.backend, BACKEND);

        let err = store.load("pw", "https://crm.example.com/api").unwrap_err();
        assert!(matches!(err, FieldSalesError::Auth(_)));
        assert!(err.to_string().contains("issued by http://localhost:5000/api"));
        assert!(store.load("pw", "http://localhost:5000/api/").is_ok());
    }

    #[test]
    fn test_token_not_written_in_clear() {
        let (dir, store) = store();
        store.store("very-secret-token", "pw", BACKEND).unwrap();
        let raw = std::fs::read_to_string(dir.path().join("credentials.json")).unwrap();
        assert!(!raw.contains("very-secret-token"));
    }

    #[test]
    fn test_clear() {
        let (_dir, store) = store();
        assert!(!store.clear().unwrap());
        store.store("abc", "pw", BACKEND).unwrap();
        assert!(store.clear().unwrap());
        assert!(store.load("pw", BACKEND).is_err());
    }
}
