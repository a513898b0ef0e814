//! Record display formatting
//!
//! Tables go through the same column specs and cell formatter as the
//! spreadsheet exporter, so a terminal listing matches the exported sheet.

use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::api::Page;
use crate::error::FieldSalesResult;
use crate::export::{format_value, resolve_field, FormatOptions};
use crate::models::{ColumnSpec, DataType};

/// Longest cell shown in a terminal table
const MAX_CELL_WIDTH: usize = 40;

fn clip(text: String) -> String {
    if text.chars().count() <= MAX_CELL_WIDTH {
        return text;
    }
    let mut clipped: String = text.chars().take(MAX_CELL_WIDTH - 3).collect();
    clipped.push_str("...");
    clipped
}

/// Format records as a table with one column per spec
pub fn format_record_table(
    records: &[Value],
    columns: &[ColumnSpec],
    options: &FormatOptions,
) -> String {
    if records.is_empty() {
        return "No records found.\n".to_string();
    }

    let mut builder = Builder::default();
    builder.push_record(columns.iter().map(|c| c.label.clone()));
    for record in records {
        builder.push_record(columns.iter().map(|column| {
            let value = resolve_field(record, &column.key);
            clip(format_value(&value, column, options).to_string().replace('\n', " "))
        }));
    }

    let mut table = builder.build();
    table.with(Style::psql());
    format!("{}\n", table)
}

/// Format one page of a listing, with its position in the collection
pub fn format_record_page(
    data_type: DataType,
    page: &Page<Value>,
    columns: &[ColumnSpec],
    options: &FormatOptions,
) -> String {
    let mut output = format_record_table(&page.items, columns, options);
    output.push_str(&format!(
        "{} {} of {} (page {} of {})\n",
        page.items.len(),
        data_type.label().to_lowercase(),
        page.total,
        page.page,
        page.pages.max(1)
    ));
    output
}

/// Full record as indented JSON
pub fn format_record_detail(record: &Value) -> FieldSalesResult<String> {
    Ok(format!("{}\n", serde_json::to_string_pretty(record)?))
}

/// Id of a record as returned by the backend
pub fn record_id(record: &Value) -> Option<&str> {
    record
        .get("_id")
        .or_else(|| record.get("id"))
        .and_then(Value::as_str)
}
