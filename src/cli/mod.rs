//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod audit;
pub mod auth;
pub mod bulk;
pub mod export;
pub mod records;
pub mod report;

pub use audit::{handle_audit_command, AuditArgs};
pub use auth::{handle_auth_command, AuthCommands};
pub use bulk::{handle_bulk_command, BulkCommands};
pub use export::{handle_export_command, ExportCommands};
pub use records::{handle_records_command, RecordsCommands};
pub use report::{handle_report_command, ReportCommands};

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::warn;

use crate::api::ApiClient;
use crate::audit::{AuditEntry, AuditLogger};
use crate::config::{FieldSalesPaths, Settings};
use crate::error::{FieldSalesError, FieldSalesResult};
use crate::export::FormatOptions;
use crate::models::dates::parse_date;
use crate::models::DataType;

/// Paths and settings shared by every command
pub struct Session {
    pub paths: FieldSalesPaths,
    pub settings: Settings,
}

impl Session {
    pub fn new(paths: FieldSalesPaths, settings: Settings) -> Self {
        Self { paths, settings }
    }

    /// Client for the configured backend, authenticated when a token is available
    pub fn client(&self) -> FieldSalesResult<ApiClient> {
        self.settings.validate()?;
        let token = auth::resolve_token(self)?;
        ApiClient::from_settings(&self.settings, token)
    }

    pub fn actor(&self) -> Option<&str> {
        self.settings.actor_name.as_deref()
    }

    pub fn format_options(&self) -> FormatOptions {
        FormatOptions::from_settings(&self.settings)
    }

    /// Directory exports land in when no output path is given
    pub fn export_dir(&self) -> PathBuf {
        self.settings
            .export_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| self.paths.exports_dir())
    }

    /// Append to the audit log; the mutation already happened, so a failed
    /// write is only reported
    pub fn audit(&self, entry: AuditEntry) {
        let logger = AuditLogger::new(self.paths.audit_log());
        if let Err(e) = logger.log(&entry.actor(self.actor())) {
            warn!(error = %e, "failed to write audit entry");
        }
    }
}

/// Parse a data type argument
pub fn parse_data_type(s: &str) -> Result<DataType, String> {
    DataType::parse(s).ok_or_else(|| {
        format!(
            "unknown data type '{}'. Valid types: visits, machines, documents, \
             service-requests, call-logs, reports, quotations",
            s
        )
    })
}

/// Parse a date argument (YYYY-MM-DD and common variants)
pub fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).ok_or_else(|| format!("invalid date '{}', expected YYYY-MM-DD", s))
}

/// Reject a window whose start is after its end
pub fn check_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> FieldSalesResult<()> {
    match (start, end) {
        (Some(s), Some(e)) if s > e => Err(FieldSalesError::Validation(format!(
            "Start date {} is after end date {}",
            s, e
        ))),
        _ => Ok(()),
    }
}

/// Ask a yes/no question on the terminal
pub fn confirm(prompt: &str) -> FieldSalesResult<bool> {
    print!("{} [y/N] ", prompt);
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Write bytes to a file, creating its directory first
pub fn write_output(path: &Path, bytes: &[u8]) -> FieldSalesResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            FieldSalesError::Io(format!("Failed to create {}: {}", parent.display(), e))
        })?;
    }
    std::fs::write(path, bytes)
        .map_err(|e| FieldSalesError::Io(format!("Failed to write {}: {}", path.display(), e)))
}

/// Read a JSON document from a file
pub fn read_json(path: &Path) -> FieldSalesResult<serde_json::Value> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| FieldSalesError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&contents).map_err(|e| {
        FieldSalesError::Validation(format!("{} is not valid JSON: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_data_type() {
        assert_eq!(parse_data_type("call-logs"), Ok(DataType::CallLogs));
        assert!(parse_data_type("budgets").unwrap_err().contains("budgets"));
    }

    #[test]
    fn test_parse_date_arg() {
        assert_eq!(
            parse_date_arg("2025-10-01"),
            Ok(NaiveDate::from_ymd_opt(2025, 10, 1).unwrap())
        );
        assert!(parse_date_arg("tomorrow").is_err());
    }

    #[test]
    fn test_check_range() {
        let a = NaiveDate::from_ymd_opt(2025, 10, 1);
        let b = NaiveDate::from_ymd_opt(2025, 10, 31);
        assert!(check_range(a, b).is_ok());
        assert!(check_range(a, None).is_ok());
        assert!(check_range(b, a).unwrap_err().is_validation());
    }

    #[test]
    fn test_write_output_creates_directory() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out").join("file.csv");
        write_output(&path, b"a,b\n").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "a,b\n");
    }

    #[test]
    fn test_read_json_rejects_garbage() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.json");
        std::fs::write(&path, "{oops").unwrap();
        assert!(read_json(&path).unwrap_err().is_validation());
    }
}
