//! Append-only audit log
//!
//! One JSON line per entry, flushed as it is written. Reading streams the
//! file and keeps only the newest entries that pass an [`AuditFilter`], so a
//! long log is never held in memory whole.

use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::error::{FieldSalesError, FieldSalesResult};
use crate::models::DataType;

use super::entry::{AuditEntry, Operation};

/// Which entries to show; empty criteria match everything
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditFilter {
    pub data_type: Option<DataType>,
    pub record_id: Option<String>,
    pub operation: Option<Operation>,
    /// First UTC day to include
    pub since: Option<NaiveDate>,
}

impl AuditFilter {
    pub fn data_type(mut self, data_type: DataType) -> Self {
        self.data_type = Some(data_type);
        self
    }

    pub fn record(mut self, id: impl Into<String>) -> Self {
        self.record_id = Some(id.into());
        self
    }

    pub fn matches(&self, entry: &AuditEntry) -> bool {
        self.data_type.map_or(true, |t| entry.data_type == t)
            && self.operation.map_or(true, |op| entry.operation == op)
            && self
                .record_id
                .as_deref()
                .map_or(true, |id| entry.record_id.as_deref() == Some(id))
            && self
                .since
                .map_or(true, |day| entry.timestamp.date_naive() >= day)
    }
}

/// Handles writing audit entries to the audit log file
pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    /// Append an entry as one JSON line
    pub fn log(&self, entry: &AuditEntry) -> FieldSalesResult<()> {
        if let Some(parent) = self.log_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| FieldSalesError::Io(format!("Failed to create audit directory: {}", e)))?;
        }

        let line = serde_json::to_string(entry)
            .map_err(|e| FieldSalesError::Json(format!("Failed to serialize audit entry: {}", e)))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| FieldSalesError::Io(format!("Failed to open audit log: {}", e)))?;
        writeln!(file, "{}", line)
            .and_then(|_| file.flush())
            .map_err(|e| FieldSalesError::Io(format!("Failed to write audit entry: {}", e)))
    }

    /// Call `visit` with every entry in file order
    fn scan(&self, mut visit: impl FnMut(AuditEntry)) -> FieldSalesResult<()> {
        if !self.log_path.exists() {
            return Ok(());
        }
        let file = File::open(&self.log_path)
            .map_err(|e| FieldSalesError::Io(format!("Failed to open audit log: {}", e)))?;

        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line_num = index + 1;
            let line = line.map_err(|e| {
                FieldSalesError::Io(format!("Failed to read audit log line {}: {}", line_num, e))
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let entry = serde_json::from_str(&line).map_err(|e| {
                FieldSalesError::Json(format!("Failed to parse audit entry at line {}: {}", line_num, e))
            })?;
            visit(entry);
        }
        Ok(())
    }

    /// Every entry, oldest first
    pub fn read_all(&self) -> FieldSalesResult<Vec<AuditEntry>> {
        let mut entries = Vec::new();
        self.scan(|entry| entries.push(entry))?;
        Ok(entries)
    }

    /// The newest `count` entries, oldest first
    pub fn read_recent(&self, count: usize) -> FieldSalesResult<Vec<AuditEntry>> {
        self.read_matching(&AuditFilter::default(), count)
    }

    /// The newest `count` entries the filter accepts, oldest first
    pub fn read_matching(&self, filter: &AuditFilter, count: usize) -> FieldSalesResult<Vec<AuditEntry>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let mut kept = VecDeque::with_capacity(count.min(256));
        self.scan(|entry| {
            if filter.matches(&entry) {
                if kept.len() == count {
                    kept.pop_front();
                }
                kept.push_back(entry);
            }
        })?;
        Ok(kept.into())
    }

    /// Everything this tool did to one record, oldest first
    pub fn history(&self, data_type: DataType, record_id: &str) -> FieldSalesResult<Vec<AuditEntry>> {
        let filter = AuditFilter::default().data_type(data_type).record(record_id);
        let mut entries = Vec::new();
        self.scan(|entry| {
            if filter.matches(&entry) {
                entries.push(entry);
            }
        })?;
        Ok(entries)
    }

    pub fn exists(&self) -> bool {
        self.log_path.exists()
    }

    pub fn path(&self) -> &PathBuf {
        &self.log_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::entry::Operation;
    use crate::models::DataType;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_logger() -> (AuditLogger, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("audit.log");
        let logger = AuditLogger::new(log_path);
        (logger, temp_dir)
    }

    #[test]
    fn test_log_and_read() {
        let (logger, _temp) = create_test_logger();
        let entry = AuditEntry::new(Operation::Create, DataType::Visits)
            .record("v1")
            .payload(&json!({"client": {"name": "City Hospital"}}));

        logger.log(&entry).unwrap();

        let entries = logger.read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].operation, Operation::Create);
        assert_eq!(entries[0].data_type, DataType::Visits);
    }

    #[test]
    fn test_read_recent() {
        let (logger, _temp) = create_test_logger();

        for i in 0..10 {
            let entry = AuditEntry::new(Operation::Update, DataType::Machines).record(format!("m{}", i));
            logger.log(&entry).unwrap();
        }

        let recent = logger.read_recent(3).unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].record_id.as_deref(), Some("m7"));
        assert_eq!(recent[2].record_id.as_deref(), Some("m9"));
    }

    #[test]
    fn test_filter_by_data_type() {
        let (logger, _temp) = create_test_logger();
        for i in 0..6 {
            let data_type = if i % 2 == 0 { DataType::Visits } else { DataType::Quotations };
            logger
                .log(&AuditEntry::new(Operation::Update, data_type).record(format!("r{}", i)))
                .unwrap();
        }

        let filter = AuditFilter::default().data_type(DataType::Quotations);
        let entries = logger.read_matching(&filter, 2).unwrap();
        let ids: Vec<_> = entries.iter().filter_map(|e| e.record_id.as_deref()).collect();
        assert_eq!(ids, vec!["r3", "r5"]);

        let filter = AuditFilter::default().data_type(DataType::Machines);
        assert!(logger.read_matching(&filter, 10).unwrap().is_empty());
        assert!(logger.read_recent(0).unwrap().is_empty());
    }

    #[test]
    fn test_filter_by_operation_and_day() {
        let (logger, _temp) = create_test_logger();
        let mut old = AuditEntry::new(Operation::Delete, DataType::Visits).record("v1");
        old.timestamp = "2025-09-30T23:59:00Z".parse().unwrap();
        logger.log(&old).unwrap();
        let mut recent = AuditEntry::new(Operation::Delete, DataType::Visits).record("v2");
        recent.timestamp = "2025-10-01T00:01:00Z".parse().unwrap();
        logger.log(&recent).unwrap();
        logger
            .log(&AuditEntry::new(Operation::Create, DataType::Visits).record("v3"))
            .unwrap();

        let filter = AuditFilter {
            operation: Some(Operation::Delete),
            since: NaiveDate::from_ymd_opt(2025, 10, 1),
            ..AuditFilter::default()
        };
        let entries = logger.read_matching(&filter, 20).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].record_id.as_deref(), Some("v2"));
    }

    #[test]
    fn test_record_history() {
        let (logger, _temp) = create_test_logger();
        logger
            .log(&AuditEntry::new(Operation::Create, DataType::Reports).record("r1"))
            .unwrap();
        logger
            .log(&AuditEntry::new(Operation::Create, DataType::Reports).record("r2"))
            .unwrap();
        logger
            .log(&AuditEntry::new(Operation::Review, DataType::Reports).record("r1"))
            .unwrap();
        // same id, other collection
        logger
            .log(&AuditEntry::new(Operation::Delete, DataType::Visits).record("r1"))
            .unwrap();

        let history = logger.history(DataType::Reports, "r1").unwrap();
        let ops: Vec<_> = history.iter().map(|e| e.operation).collect();
        assert_eq!(ops, vec![Operation::Create, Operation::Review]);
    }

    #[test]
    fn test_empty_log() {
        let (logger, _temp) = create_test_logger();
        assert!(!logger.exists());
        assert!(logger.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_creates_missing_directory() {
        let temp = TempDir::new().unwrap();
        let logger = AuditLogger::new(temp.path().join("nested").join("audit.log"));
        logger
            .log(&AuditEntry::new(Operation::Delete, DataType::Documents))
            .unwrap();
        assert!(logger.exists());
    }

    #[test]
    fn test_corrupt_line_is_reported() {
        let (logger, _temp) = create_test_logger();
        std::fs::write(logger.path(), "{not json}\n").unwrap();
        let err = logger.read_all().unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }
}
