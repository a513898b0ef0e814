//! Report CLI commands
//!
//! Printable weekly reports and the per-employee activity summary.

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{Subcommand, ValueEnum};

use super::{check_range, parse_date_arg, write_output, Session};
use crate::error::{FieldSalesError, FieldSalesResult};
use crate::reports::save_pdf;
use crate::services::ReportService;

/// Output format for the employee summary
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SummaryFormat {
    /// Table on the terminal
    Terminal,
    /// CSV file (stdout without --output)
    Csv,
    /// PDF document
    Pdf,
}

/// Report subcommands
#[derive(Subcommand)]
pub enum ReportCommands {
    /// Render weekly reports to PDF: one by ID, or every report in a window
    Weekly {
        /// Report ID
        #[arg(required_unless_present_all = ["start", "end"], conflicts_with_all = ["start", "end"])]
        id: Option<String>,
        /// First week start to include (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg, requires = "end")]
        start: Option<NaiveDate>,
        /// Last week start to include (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg, requires = "start")]
        end: Option<NaiveDate>,
        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Visits, new clients and quotations per employee
    Employees {
        /// Start date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        start: NaiveDate,
        /// End date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        end: NaiveDate,
        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: SummaryFormat,
        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Footer stamp of generated documents
fn generated_stamp(session: &Session) -> String {
    let now = Local::now().format("%Y-%m-%d %H:%M");
    match session.actor() {
        Some(actor) => format!("Generated {} by {}", now, actor),
        None => format!("Generated {}", now),
    }
}

/// Handle report commands
pub async fn handle_report_command(session: &Session, cmd: ReportCommands) -> FieldSalesResult<()> {
    match cmd {
        ReportCommands::Weekly {
            id,
            start,
            end,
            output,
        } => {
            let client = session.client()?;
            let service = ReportService::new(&client);
            let generated = generated_stamp(session);

            let rendered = match (id, start, end) {
                (Some(id), _, _) => service.weekly_pdf(&id, &generated).await?,
                (None, Some(start), Some(end)) => {
                    check_range(Some(start), Some(end))?;
                    service.weekly_set_pdf(start, end, &generated).await?
                }
                _ => {
                    return Err(FieldSalesError::Validation(
                        "Give a report ID or both --start and --end".into(),
                    ))
                }
            };

            if rendered.reports == 0 {
                println!("No weekly reports in that window.");
                return Ok(());
            }

            let path = output.unwrap_or_else(|| session.export_dir().join(&rendered.file_name));
            write_output(&path, &rendered.bytes)?;
            println!(
                "Wrote {} report(s), {} page(s) to {}",
                rendered.reports,
                rendered.pages,
                path.display()
            );
        }

        ReportCommands::Employees {
            start,
            end,
            format,
            output,
        } => {
            check_range(Some(start), Some(end))?;
            let client = session.client()?;
            let report = ReportService::new(&client)
                .employee_summary(start, end)
                .await?;

            match format {
                SummaryFormat::Terminal => print!("{}", report.format_terminal()),
                SummaryFormat::Csv => match output {
                    Some(path) => {
                        let mut buffer = Vec::new();
                        report.export_csv(&mut buffer)?;
                        write_output(&path, &buffer)?;
                        println!("Employee summary written to {}", path.display());
                    }
                    None => report.export_csv(std::io::stdout().lock())?,
                },
                SummaryFormat::Pdf => {
                    let path = output.unwrap_or_else(|| {
                        session
                            .export_dir()
                            .join(format!("employee-summary_{}_to_{}.pdf", start, end))
                    });
                    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                        std::fs::create_dir_all(parent)?;
                    }
                    save_pdf(&report.layout(&generated_stamp(session)), &path)?;
                    println!("Employee summary written to {}", path.display());
                }
            }
        }
    }

    Ok(())
}
