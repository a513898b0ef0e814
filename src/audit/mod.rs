//! Audit logging for fieldsales
//!
//! Every mutation sent to the backend through this tool (create, update,
//! delete, review, respond, bulk add) is appended to a local JSONL log
//! with its timestamp, data type, record id, actor and payload.
//!
//! # Example
//!
//! ```rust,ignore
//! use fieldsales::audit::{AuditEntry, AuditFilter, AuditLogger, Operation};
//! use fieldsales::models::DataType;
//!
//! let logger = AuditLogger::new(paths.audit_log());
//! let entry = AuditEntry::new(Operation::Delete, DataType::Visits)
//!     .record("65f0c0ffee")
//!     .actor(Some("admin"));
//! logger.log(&entry)?;
//!
//! let filter = AuditFilter::default().data_type(DataType::Visits);
//! let recent = logger.read_matching(&filter, 20)?;
//! ```

mod entry;
mod logger;

pub use entry::{AuditEntry, Operation};
pub use logger::{AuditFilter, AuditLogger};
