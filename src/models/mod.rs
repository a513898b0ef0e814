//! Core data models for fieldsales
//!
//! Typed copies of the records served by the backend (visits, machines,
//! documents, service requests, call logs, weekly reports, quotations),
//! plus the export vocabulary: data types, column specs and ISO weeks.

pub mod call_log;
pub mod column;
pub mod data_type;
pub mod dates;
pub mod document;
pub mod ids;
pub mod lenient;
pub mod machine;
pub mod quotation;
pub mod report;
pub mod service_request;
pub mod user;
pub mod validation;
pub mod visit;
pub mod week;

pub use call_log::CallLog;
pub use column::{ColumnPreset, ColumnSpec, ColumnType};
pub use data_type::DataType;
pub use document::MachineDocument;
pub use ids::{
    CallLogId, DocumentId, MachineId, QuotationId, ReportId, ServiceRequestId, UserId, VisitId,
};
pub use machine::{EngineeringService, Machine};
pub use quotation::{AdminResponse, Quotation, QuotationStatus};
pub use report::{ReviewStatus, WeeklyReport};
pub use service_request::{MachineRef, Priority, ServiceRequest, ServiceStatus};
pub use user::{UserRef, UserSummary};
pub use validation::{validate_payload, Record, RecordValidationError};
pub use visit::{Contact, Facility, Visit};
pub use week::IsoWeek;
