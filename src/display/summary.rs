//! Outcome summaries
//!
//! Formats the results of bulk runs, exports and the audit log for the
//! terminal.

use std::path::Path;

use tabled::builder::Builder;
use tabled::settings::Style;

use crate::audit::AuditEntry;
use crate::models::{ColumnSpec, DataType};
use crate::services::{BulkResult, ExportOutcome};

/// "5 succeeded, 2 failed" followed by one line per failure
pub fn format_bulk_result(data_type: DataType, result: &BulkResult) -> String {
    let mut output = format!(
        "{}: {} succeeded, {} failed\n",
        data_type.label(),
        result.successful,
        result.failed
    );

    for failure in &result.failures {
        output.push_str(&format!("  item {}: {}\n", failure.index + 1, failure.reason));
    }

    output
}

/// Per-type record counts of an export and where it was written
pub fn format_export_outcome(outcome: &ExportOutcome, path: &Path) -> String {
    let mut output = format!(
        "Exported {} records to {}\n",
        outcome.record_count(),
        path.display()
    );

    for (data_type, count) in &outcome.counts {
        output.push_str(&format!("  {:<18} {:>6}\n", data_type.label(), count));
    }

    if !outcome.failed.is_empty() {
        output.push_str("\nCould not fetch (exported empty):\n");
        for (data_type, reason) in &outcome.failed {
            output.push_str(&format!("  {}: {}\n", data_type.label(), reason));
        }
    }

    output
}

/// Column catalogue of a data type; `defaults` are marked with `*`
pub fn format_column_list(columns: &[ColumnSpec], defaults: &[ColumnSpec]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["", "Key", "Label", "Type"]);
    for column in columns {
        let marker = if defaults.iter().any(|d| d.key == column.key) {
            "*"
        } else {
            ""
        };
        builder.push_record([
            marker.to_string(),
            column.key.clone(),
            column.label.clone(),
            column.column_type.to_string(),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::blank());
    format!(
        "{}\n\n* exported when no columns are given. Any dotted path (e.g. client.location) is also accepted.\n",
        table
    )
}

pub fn format_audit_entries(entries: &[AuditEntry]) -> String {
    if entries.is_empty() {
        return "No audit entries.\n".to_string();
    }
    let mut output = String::new();
    for entry in entries {
        output.push_str(&entry.format_human_readable());
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::Operation;
    use crate::export::WorkbookModel;
    use crate::models::ColumnType;
    use crate::services::BulkFailure;

    #[test]
    fn test_bulk_result() {
        let result = BulkResult {
            successful: 5,
            failed: 2,
            failures: vec![
                BulkFailure {
                    index: 1,
                    reason: "missing client name".into(),
                },
                BulkFailure {
                    index: 6,
                    reason: "API error (400): bad date".into(),
                },
            ],
            created: Vec::new(),
        };
        let output = format_bulk_result(DataType::Visits, &result);
        assert!(output.starts_with("Visits: 5 succeeded, 2 failed"));
        assert!(output.contains("item 2: missing client name"));
        assert!(output.contains("item 7:"));
    }

    #[test]
    fn test_export_outcome_lists_failures() {
        let outcome = ExportOutcome {
            workbook: WorkbookModel::default(),
            counts: vec![(DataType::Visits, 3), (DataType::CallLogs, 0)],
            failed: vec![(DataType::CallLogs, "Network error: refused".into())],
        };
        let output = format_export_outcome(&outcome, Path::new("out.xlsx"));
        assert!(output.starts_with("Exported 3 records to out.xlsx"));
        assert!(output.contains("Call Logs: Network error: refused"));
    }

    #[test]
    fn test_column_list_marks_defaults() {
        let columns = vec![
            ColumnSpec::new("client.name", "Client", ColumnType::Text),
            ColumnSpec::new("notes", "Notes", ColumnType::Text),
        ];
        let output = format_column_list(&columns, &columns[..1]);
        let client_line = output.lines().find(|l| l.contains("client.name")).unwrap();
        assert!(client_line.contains('*'));
        let notes_line = output.lines().find(|l| l.contains("Notes")).unwrap();
        assert!(!notes_line.contains('*'));
    }

    #[test]
    fn test_audit_entries() {
        assert_eq!(format_audit_entries(&[]), "No audit entries.\n");
        let entry = AuditEntry::new(Operation::Create, DataType::Machines).record("m1");
        assert!(format_audit_entries(&[entry]).contains("CREATE Machine m1"));
    }
}
