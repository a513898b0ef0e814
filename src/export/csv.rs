//! CSV export functionality
//!
//! Renders the same workbook model as the xlsx writer. Sheets follow each
//! other, separated by a blank record and introduced by their name when
//! there is more than one.

use std::io::Write;

use super::sheet::{RowKind, WorkbookModel};
use crate::error::FieldSalesResult;

/// Write a workbook as CSV
pub fn export_workbook_csv<W: Write>(model: &WorkbookModel, writer: W) -> FieldSalesResult<()> {
    let mut csv_writer = csv::WriterBuilder::new().flexible(true).from_writer(writer);
    let announce = model.sheets.len() > 1;

    for (i, sheet) in model.sheets.iter().enumerate() {
        if i > 0 {
            csv_writer.write_record(std::iter::empty::<&str>())?;
        }
        if announce {
            csv_writer.write_record([sheet.name.as_str()])?;
        }
        for row in &sheet.rows {
            if row.kind == RowKind::Blank {
                csv_writer.write_record(std::iter::empty::<&str>())?;
                continue;
            }
            csv_writer.write_record(row.cells.iter().map(|c| c.to_string()))?;
        }
    }

    csv_writer.flush()?;
    Ok(())
}

/// Render a workbook to a CSV string
pub fn render_csv(model: &WorkbookModel) -> FieldSalesResult<String> {
    let mut buffer = Vec::new();
    export_workbook_csv(model, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::sheet::{build_workbook, DataSet, SheetOptions};
    use crate::models::{ColumnSpec, ColumnType, DataType};
    use serde_json::json;

    fn visits() -> DataSet {
        DataSet {
            data_type: DataType::Visits,
            columns: vec![
                ColumnSpec::new("client.name", "Client", ColumnType::Text),
                ColumnSpec::new("contacts", "Contacts", ColumnType::Array),
                ColumnSpec::new("potentialValue", "Value", ColumnType::Number),
            ],
            records: vec![json!({
                "client": {"name": "City Hospital, Main"},
                "contacts": [{"name": "A", "role": "Matron"}],
                "potentialValue": 1500
            })],
        }
    }

    #[test]
    fn test_single_sheet() {
        let model = build_workbook(&[visits()], &SheetOptions::default());
        let csv = render_csv(&model).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Client,Contacts,Value");
        assert_eq!(lines[1], "\"City Hospital, Main\",A (Matron),1500");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_multiple_sheets_are_announced() {
        let mut reports = visits();
        reports.data_type = DataType::Reports;
        let model = build_workbook(&[visits(), reports], &SheetOptions::default());
        let csv = render_csv(&model).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Visits");
        assert!(lines.contains(&"Weekly Reports"));
    }
}
