//! Configuration module for fieldsales
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - User settings persistence with environment overrides
//! - The encrypted bearer-token store

pub mod credentials;
pub mod paths;
pub mod settings;

pub use credentials::CredentialStore;
pub use paths::FieldSalesPaths;
pub use settings::Settings;
