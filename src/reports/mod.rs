//! Reports module for fieldsales
//!
//! Printable documents: weekly rep reports and the per-employee activity
//! summary. Layout is computed first, then drawn to PDF.

pub mod layout;
pub mod pdf;
pub mod summary;
pub mod weekly;

pub use layout::{LaidOutDocument, LayoutEngine, Metric, Table};
pub use pdf::{render_pdf, save_pdf};
pub use summary::{EmployeeSummary, EmployeeSummaryReport};
pub use weekly::{
    format_amount, layout_report_set, layout_weekly_report, Lead, WeeklyMetrics, WeeklyReportData,
};
