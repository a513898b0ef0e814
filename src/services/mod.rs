//! Service layer for fieldsales
//!
//! The service layer sits between the CLI and the backend client. It
//! validates requests, fetches through the [`RecordSource`](crate::api::RecordSource)
//! and [`RecordSink`](crate::api::RecordSink) seams, and hands assembled
//! data to the exporters and report renderers.

pub mod bulk;
pub mod export;
pub mod report;

pub use bulk::{parse_bulk_input, BulkFailure, BulkResult, BulkService};
pub use export::{ExportOutcome, ExportRequest, ExportService, TypeSelection};
pub use report::{RenderedReport, ReportService};
