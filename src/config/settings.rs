//! User settings for fieldsales
//!
//! Manages the backend location, pagination size and date rendering
//! preferences. Values can be overridden from the environment (a `.env` file
//! is honored).

use serde::{Deserialize, Serialize};

use super::paths::FieldSalesPaths;
use crate::error::FieldSalesError;

/// Environment variable overriding the API base URL
pub const ENV_API_URL: &str = "FIELDSALES_API_URL";
/// Environment variable carrying a plain bearer token
pub const ENV_TOKEN: &str = "FIELDSALES_TOKEN";
/// Environment variable naming the actor printed in export summaries
pub const ENV_ACTOR: &str = "FIELDSALES_ACTOR";

/// User settings for fieldsales
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Base URL of the REST backend, without trailing slash
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Records requested per page when walking paginated lists
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Timestamp format used in exports (strftime format)
    #[serde(default = "default_datetime_format")]
    pub datetime_format: String,

    /// Where exports land when no output path is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<String>,

    /// Name printed as "Generated by" in export summaries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_name: Option<String>,

    /// Bearer token taken from the environment; never persisted
    #[serde(skip)]
    pub env_token: Option<String>,
}

fn default_schema_version() -> u32 {
    1
}

fn default_api_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_page_size() -> u32 {
    100
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_datetime_format() -> String {
    "%Y-%m-%d %H:%M".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            api_base_url: default_api_base_url(),
            page_size: default_page_size(),
            date_format: default_date_format(),
            datetime_format: default_datetime_format(),
            export_dir: None,
            actor_name: None,
            env_token: None,
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &FieldSalesPaths) -> Result<Self, FieldSalesError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                FieldSalesError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                FieldSalesError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Load settings, then apply `.env` and process environment overrides
    pub fn load_with_env(paths: &FieldSalesPaths) -> Result<Self, FieldSalesError> {
        dotenvy::dotenv().ok();
        let mut settings = Self::load_or_create(paths)?;
        settings.apply_overrides(
            std::env::var(ENV_API_URL).ok(),
            std::env::var(ENV_TOKEN).ok(),
            std::env::var(ENV_ACTOR).ok(),
        );
        Ok(settings)
    }

    /// Apply override values; empty strings are ignored
    pub fn apply_overrides(
        &mut self,
        api_url: Option<String>,
        token: Option<String>,
        actor: Option<String>,
    ) {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.env_token = Some(token);
        }
        if let Some(actor) = actor.filter(|a| !a.trim().is_empty()) {
            self.actor_name = Some(actor);
        }
        self.api_base_url = self.api_base_url.trim_end_matches('/').to_string();
    }

    /// Validate values that would otherwise fail late
    pub fn validate(&self) -> Result<(), FieldSalesError> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            return Err(FieldSalesError::Config(format!(
                "API base URL must start with http:// or https://: {}",
                self.api_base_url
            )));
        }
        if self.page_size == 0 {
            return Err(FieldSalesError::Config("Page size must be at least 1".into()));
        }
        Ok(())
    }

    /// Save settings to disk
    pub fn save(&self, paths: &FieldSalesPaths) -> Result<(), FieldSalesError> {
        paths.ensure_directories()?;

        let settings_path = paths.settings_file();
        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            FieldSalesError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(&settings_path, contents).map_err(|e| {
            FieldSalesError::Io(format!("Failed to write settings file: {}", e))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.api_base_url, "http://localhost:5000/api");
        assert_eq!(settings.page_size, 100);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = FieldSalesPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.api_base_url = "https://crm.example.com/api".into();
        settings.actor_name = Some("Admin".into());
        settings.env_token = Some("secret".into());

        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.api_base_url, "https://crm.example.com/api");
        assert_eq!(loaded.actor_name.as_deref(), Some("Admin"));
        // Environment tokens are never written to disk
        assert!(loaded.env_token.is_none());
    }

    #[test]
    fn test_overrides() {
        let mut settings = Settings::default();
        settings.apply_overrides(
            Some("https://api.example.com/".into()),
            Some("tok".into()),
            Some(String::new()),
        );
        assert_eq!(settings.api_base_url, "https://api.example.com");
        assert_eq!(settings.env_token.as_deref(), Some("tok"));
        assert!(settings.actor_name.is_none());
    }

    #[test]
    fn test_invalid_url_rejected() {
        let mut settings = Settings::default();
        settings.api_base_url = "localhost:5000".into();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.date_format, "%Y-%m-%d");
        assert_eq!(settings.datetime_format, "%Y-%m-%d %H:%M");
    }
}
