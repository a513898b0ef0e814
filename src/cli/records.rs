//! Record CLI commands
//!
//! Browse and change the records of any data type. Every mutation prints a
//! status line before the request and the outcome after it, and is written
//! to the audit log once the backend accepted it.

use std::path::PathBuf;

use clap::Subcommand;
use chrono::NaiveDate;
use serde_json::Value;

use super::{check_range, confirm, parse_data_type, parse_date_arg, read_json, Session};
use crate::api::ListQuery;
use crate::audit::{AuditEntry, Operation};
use crate::display::{format_record_detail, format_record_page, format_record_table, record_id};
use crate::error::{FieldSalesError, FieldSalesResult};
use crate::models::column::{default_columns, select_columns};
use crate::models::{
    validate_payload, AdminResponse, DataType, QuotationId, ReportId, ReviewStatus, UserId,
};

fn parse_review_status(s: &str) -> Result<ReviewStatus, String> {
    match ReviewStatus::parse(s) {
        Some(ReviewStatus::Pending) | None => {
            Err(format!("invalid status '{}', expected approved or rejected", s))
        }
        Some(status) => Ok(status),
    }
}

fn parse_filter(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("invalid filter '{}', expected key=value", s))
}

/// Record subcommands
#[derive(Subcommand)]
pub enum RecordsCommands {
    /// List records of a data type
    List {
        /// Data type (visits, machines, documents, service-requests, call-logs, reports, quotations)
        #[arg(value_parser = parse_data_type)]
        data_type: DataType,
        /// Free-text search
        #[arg(short, long)]
        search: Option<String>,
        /// Earliest date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        start: Option<NaiveDate>,
        /// Latest date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        end: Option<NaiveDate>,
        /// Only records of this user (repeatable)
        #[arg(short, long = "user")]
        users: Vec<String>,
        /// Endpoint filter as key=value (repeatable)
        #[arg(short, long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
        /// Page to show
        #[arg(short, long, default_value = "1")]
        page: u32,
        /// Records per page (defaults to the configured page size)
        #[arg(short, long)]
        limit: Option<u32>,
        /// Walk every page instead of showing one
        #[arg(short, long, conflicts_with = "page")]
        all: bool,
        /// Comma-separated column keys
        #[arg(short, long)]
        columns: Option<String>,
    },
    /// Show one record as JSON
    Get {
        #[arg(value_parser = parse_data_type)]
        data_type: DataType,
        id: String,
    },
    /// Create a record from a JSON file
    Create {
        #[arg(value_parser = parse_data_type)]
        data_type: DataType,
        /// JSON file holding the record
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Update a record with the fields of a JSON file
    Update {
        #[arg(value_parser = parse_data_type)]
        data_type: DataType,
        id: String,
        /// JSON file holding the changed fields
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Delete a record
    Delete {
        #[arg(value_parser = parse_data_type)]
        data_type: DataType,
        id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Approve or reject a weekly report
    Review {
        /// Report ID
        id: String,
        /// approved or rejected
        #[arg(short, long, value_parser = parse_review_status)]
        status: ReviewStatus,
        /// Notes for the rep
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Answer a quotation request
    Respond {
        /// Quotation ID
        id: String,
        /// Response text
        #[arg(short, long)]
        message: String,
        /// Quoted price
        #[arg(long)]
        price: Option<f64>,
    },
}

/// Handle a records command
pub async fn handle_records_command(session: &Session, cmd: RecordsCommands) -> FieldSalesResult<()> {
    match cmd {
        RecordsCommands::List {
            data_type,
            search,
            start,
            end,
            users,
            filters,
            page,
            limit,
            all,
            columns,
        } => {
            check_range(start, end)?;
            let columns = match columns {
                Some(keys) => select_columns(data_type, &keys.split(',').collect::<Vec<_>>()),
                None => default_columns(data_type),
            };
            if columns.is_empty() {
                return Err(FieldSalesError::Validation(
                    "Select at least one column to show".into(),
                ));
            }

            let mut query = ListQuery::new().date_range(start, end);
            if let Some(term) = search {
                query = query.search(term);
            }
            for user in users {
                query = query.user(UserId::new(user));
            }
            for (key, value) in filters {
                query = query.filter(key, value);
            }

            let client = session.client()?;
            let options = session.format_options();
            if all {
                let records = client.list_all(data_type, &query).await?;
                print!("{}", format_record_table(&records, &columns, &options));
                println!("{} {}", records.len(), data_type.label().to_lowercase());
            } else {
                let query = query
                    .page(page)
                    .limit(limit.unwrap_or(session.settings.page_size));
                let page = client.list(data_type, &query).await?;
                print!("{}", format_record_page(data_type, &page, &columns, &options));
            }
        }

        RecordsCommands::Get { data_type, id } => {
            let client = session.client()?;
            let record: Value = client.get(data_type, &id).await?;
            print!("{}", format_record_detail(&record)?);
        }

        RecordsCommands::Create { data_type, file } => {
            let payload = read_json(&file)?;
            let payload = validate_payload(data_type, &payload).map_err(|reason| {
                FieldSalesError::Validation(format!(
                    "{} in {} is invalid: {}",
                    data_type.entity_name(),
                    file.display(),
                    reason
                ))
            })?;

            let client = session.client()?;
            println!("Creating {}...", data_type.entity_name().to_lowercase());
            let created = client.create(data_type, &payload).await?;
            let id = record_id(&created).unwrap_or("?").to_string();
            println!("Created {}: {}", data_type.entity_name().to_lowercase(), id);

            session.audit(
                AuditEntry::new(Operation::Create, data_type)
                    .record(id)
                    .payload(&payload),
            );
        }

        RecordsCommands::Update {
            data_type,
            id,
            file,
        } => {
            let payload = read_json(&file)?;
            if !payload.is_object() {
                return Err(FieldSalesError::Validation(format!(
                    "{} must hold a JSON object of fields to change",
                    file.display()
                )));
            }

            let client = session.client()?;
            println!("Updating {} {}...", data_type.entity_name().to_lowercase(), id);
            client.update(data_type, &id, &payload).await?;
            println!("Updated {} {}", data_type.entity_name().to_lowercase(), id);

            session.audit(
                AuditEntry::new(Operation::Update, data_type)
                    .record(id)
                    .payload(&payload),
            );
        }

        RecordsCommands::Delete { data_type, id, yes } => {
            let client = session.client()?;
            let record: Value = client.get(data_type, &id).await?;

            if !yes {
                print!("{}", format_record_detail(&record)?);
                let prompt = format!("Delete this {}?", data_type.entity_name().to_lowercase());
                if !confirm(&prompt)? {
                    println!("Aborted.");
                    return Ok(());
                }
            }

            println!("Deleting {} {}...", data_type.entity_name().to_lowercase(), id);
            let message = client.delete(data_type, &id).await?;
            println!(
                "{}",
                message.unwrap_or_else(|| format!(
                    "Deleted {} {}",
                    data_type.entity_name().to_lowercase(),
                    id
                ))
            );

            session.audit(
                AuditEntry::new(Operation::Delete, data_type)
                    .record(id)
                    .payload(&record),
            );
        }

        RecordsCommands::Review { id, status, notes } => {
            let client = session.client()?;
            println!("Marking report {} as {}...", id, status.as_str());
            let report = client
                .review_report(&ReportId::new(id.clone()), status, notes.as_deref())
                .await?;
            println!(
                "Report for {} ({} to {}) is now {}",
                report.rep_name(),
                report.week_start,
                report.week_end,
                status.as_str()
            );

            session.audit(
                AuditEntry::new(Operation::Review, DataType::Reports)
                    .record(id)
                    .payload(&serde_json::json!({
                        "status": status.as_str(),
                        "adminNotes": notes,
                    })),
            );
        }

        RecordsCommands::Respond { id, message, price } => {
            let mut response = AdminResponse::new(message);
            response.quoted_price = price;

            let client = session.client()?;
            println!("Sending response to quotation {}...", id);
            client
                .respond_quotation(&QuotationId::new(id.clone()), &response)
                .await?;
            println!("Quotation {} answered", id);

            session.audit(
                AuditEntry::new(Operation::Respond, DataType::Quotations)
                    .record(id)
                    .payload(&response),
            );
        }
    }

    Ok(())
}
