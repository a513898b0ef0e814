//! Display formatting for terminal output
//!
//! Record tables, single-record detail and outcome summaries.

pub mod records;
pub mod summary;

pub use records::{format_record_detail, format_record_page, format_record_table, record_id};
pub use summary::{format_audit_entries, format_bulk_result, format_column_list, format_export_outcome};
