//! Bulk CLI commands

use std::path::PathBuf;

use clap::Subcommand;

use super::{parse_data_type, Session};
use crate::audit::{AuditEntry, Operation};
use crate::display::format_bulk_result;
use crate::error::{FieldSalesError, FieldSalesResult};
use crate::models::DataType;
use crate::services::{parse_bulk_input, BulkService};

/// Bulk subcommands
#[derive(Subcommand)]
pub enum BulkCommands {
    /// Create many records from a JSON array or a CSV file
    Add {
        #[arg(value_parser = parse_data_type)]
        data_type: DataType,
        /// Input file (.json or .csv)
        file: PathBuf,
        /// Read the file as CSV regardless of its extension
        #[arg(long)]
        csv: bool,
    },
}

fn is_csv(file: &std::path::Path) -> bool {
    file.extension()
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

/// Handle a bulk command
pub async fn handle_bulk_command(session: &Session, cmd: BulkCommands) -> FieldSalesResult<()> {
    match cmd {
        BulkCommands::Add {
            data_type,
            file,
            csv,
        } => {
            let contents = std::fs::read_to_string(&file).map_err(|e| {
                FieldSalesError::Io(format!("Failed to read {}: {}", file.display(), e))
            })?;
            let items = parse_bulk_input(&contents, csv || is_csv(&file))?;
            if items.is_empty() {
                println!("{} holds no records.", file.display());
                return Ok(());
            }

            let client = session.client()?;
            println!(
                "Adding {} {}...",
                items.len(),
                data_type.label().to_lowercase()
            );
            let result = BulkService::new(&client).bulk_add(data_type, &items).await;
            print!("{}", format_bulk_result(data_type, &result));

            if result.successful > 0 {
                session.audit(
                    AuditEntry::new(Operation::BulkAdd, data_type)
                        .payload(&result.created)
                        .summary(format!(
                            "{} succeeded, {} failed",
                            result.successful, result.failed
                        )),
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_csv_detection() {
        assert!(is_csv(Path::new("visits.CSV")));
        assert!(!is_csv(Path::new("visits.json")));
        assert!(!is_csv(Path::new("visits")));
    }
}
