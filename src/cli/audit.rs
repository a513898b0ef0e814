//! Audit log CLI command

use chrono::NaiveDate;
use clap::Args;

use super::{parse_data_type, parse_date_arg, Session};
use crate::audit::{AuditFilter, AuditLogger, Operation};
use crate::display::format_audit_entries;
use crate::error::FieldSalesResult;
use crate::models::DataType;

/// Options of `fieldsales audit`
#[derive(Debug, Args)]
pub struct AuditArgs {
    /// Number of entries to show
    #[arg(short = 'n', long, default_value = "20")]
    pub count: usize,

    /// Only this data type (visits, machines, call-logs...)
    #[arg(short = 't', long = "type", value_parser = parse_data_type)]
    pub data_type: Option<DataType>,

    /// Only this record ID
    #[arg(long)]
    pub record: Option<String>,

    /// Only this kind of change
    #[arg(long, value_enum)]
    pub operation: Option<Operation>,

    /// Only entries from this day on (YYYY-MM-DD, UTC)
    #[arg(long, value_parser = parse_date_arg)]
    pub since: Option<NaiveDate>,
}

impl AuditArgs {
    fn filter(&self) -> AuditFilter {
        AuditFilter {
            data_type: self.data_type,
            record_id: self.record.clone(),
            operation: self.operation,
            since: self.since,
        }
    }
}

/// Print the most recent audit entries that match the options
pub fn handle_audit_command(session: &Session, args: AuditArgs) -> FieldSalesResult<()> {
    let logger = AuditLogger::new(session.paths.audit_log());
    if !logger.exists() {
        println!("No audit log yet at {}", logger.path().display());
        return Ok(());
    }

    let entries = logger.read_matching(&args.filter(), args.count)?;
    print!("{}", format_audit_entries(&entries));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditEntry;
    use crate::config::{FieldSalesPaths, Settings};
    use tempfile::TempDir;

    #[test]
    fn test_args_become_filter() {
        let args = AuditArgs {
            count: 5,
            data_type: Some(DataType::Quotations),
            record: Some("q1".into()),
            operation: Some(Operation::Respond),
            since: None,
        };
        let filter = args.filter();
        assert!(filter.matches(&AuditEntry::new(Operation::Respond, DataType::Quotations).record("q1")));
        assert!(!filter.matches(&AuditEntry::new(Operation::Respond, DataType::Visits).record("q1")));
        assert!(!filter.matches(&AuditEntry::new(Operation::Delete, DataType::Quotations).record("q1")));
    }

    #[test]
    fn test_filtered_listing_runs() {
        let temp = TempDir::new().unwrap();
        let session = Session::new(
            FieldSalesPaths::with_base_dir(temp.path().to_path_buf()),
            Settings::default(),
        );
        session.audit(AuditEntry::new(Operation::Create, DataType::Visits).record("v1"));
        let args = AuditArgs {
            count: 20,
            data_type: Some(DataType::Visits),
            record: None,
            operation: None,
            since: None,
        };
        assert!(handle_audit_command(&session, args).is_ok());
    }
}
