//! Export module for fieldsales
//!
//! Turns fetched records into spreadsheets:
//! - `fields` and `format` resolve and render one cell
//! - `grouping` files records under ISO weeks and people
//! - `sheet` assembles a format-neutral workbook model
//! - `xlsx` and `csv` render that model

pub mod csv;
pub mod fields;
pub mod filename;
pub mod format;
pub mod grouping;
pub mod sheet;
pub mod xlsx;

pub use self::csv::{export_workbook_csv, render_csv};
pub use fields::resolve_field;
pub use filename::{export_filename, sanitize_sheet_name, unique_sheet_names};
pub use format::{format_value, CellValue, FormatOptions};
pub use grouping::{group_by_person, group_by_week, record_date, PersonGroup, WeekBucket};
pub use sheet::{
    build_workbook, DataSet, PersonSheet, Row, RowKind, SheetLayout, SheetModel, SheetOptions,
    SummaryInfo, WorkbookModel,
};
pub use xlsx::{render_xlsx, save_xlsx};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Spreadsheet output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "xlsx" | "excel" => Some(Self::Xlsx),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    /// Render a workbook in this format
    pub fn render(&self, model: &WorkbookModel) -> crate::error::FieldSalesResult<Vec<u8>> {
        match self {
            Self::Xlsx => render_xlsx(model),
            Self::Csv => Ok(render_csv(model)?.into_bytes()),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
