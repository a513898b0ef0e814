//! Cryptographic functions for fieldsales
//!
//! Provides AES-256-GCM token sealing with Argon2id key derivation, used to
//! keep the backend bearer token encrypted at rest.

pub mod encryption;
pub mod key_derivation;

pub use encryption::{normalize_backend, open_token, seal_token, SealedToken};
pub use key_derivation::{derive_key, DerivedKey, KeyDerivationParams};
