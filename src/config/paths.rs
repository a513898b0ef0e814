//! Path management for fieldsales
//!
//! Provides XDG-compliant path resolution for configuration, credentials,
//! column presets and exports.
//!
//! ## Path Resolution Order
//!
//! 1. `FIELDSALES_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/fieldsales` or `~/.config/fieldsales`
//! 3. Windows: `%APPDATA%\fieldsales`

use std::path::PathBuf;

use crate::error::FieldSalesError;

/// Manages all paths used by fieldsales
#[derive(Debug, Clone)]
pub struct FieldSalesPaths {
    /// Base directory for all fieldsales files
    base_dir: PathBuf,
}

impl FieldSalesPaths {
    /// Create a new FieldSalesPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, FieldSalesError> {
        let base_dir = if let Ok(custom) = std::env::var("FIELDSALES_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create FieldSalesPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.config/fieldsales/ or equivalent)
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the encrypted credentials file
    pub fn credentials_file(&self) -> PathBuf {
        self.base_dir.join("credentials.json")
    }

    /// Get the path to the audit log
    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// Directory holding saved column presets
    pub fn presets_dir(&self) -> PathBuf {
        self.base_dir.join("presets")
    }

    /// Default directory for generated spreadsheets and documents
    pub fn exports_dir(&self) -> PathBuf {
        self.base_dir.join("exports")
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<(), FieldSalesError> {
        std::fs::create_dir_all(&self.base_dir).map_err(|e| {
            FieldSalesError::Io(format!("Failed to create base directory: {}", e))
        })?;

        std::fs::create_dir_all(self.presets_dir()).map_err(|e| {
            FieldSalesError::Io(format!("Failed to create presets directory: {}", e))
        })?;

        std::fs::create_dir_all(self.exports_dir()).map_err(|e| {
            FieldSalesError::Io(format!("Failed to create exports directory: {}", e))
        })?;

        Ok(())
    }

    /// Check if fieldsales has been configured (settings file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

/// Resolve the default data directory path based on platform
#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, FieldSalesError> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg).join("fieldsales"));
    }
    let home = std::env::var("HOME")
        .map_err(|_| FieldSalesError::Config("HOME environment variable not set".into()))?;
    Ok(PathBuf::from(home).join(".config").join("fieldsales"))
}

/// Resolve the default data directory path based on platform
#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, FieldSalesError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| FieldSalesError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("fieldsales"))
}
