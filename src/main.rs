use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fieldsales::cli::{
    handle_audit_command, handle_auth_command, handle_bulk_command, handle_export_command,
    handle_records_command, handle_report_command, Session,
};
use fieldsales::config::{FieldSalesPaths, Settings};
use fieldsales::FieldSalesError;

#[derive(Parser)]
#[command(
    name = "fieldsales",
    author = "Kaylee Beyene",
    version,
    about = "Terminal administration and report export for the field-sales backend",
    long_about = "fieldsales talks to the field-sales REST backend. It lists and edits \
                  visits, machines, documents, service requests, call logs, weekly \
                  reports and quotations, adds records in bulk, and exports them to \
                  spreadsheets and PDF reports."
)]
struct Cli {
    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Backend base URL, overriding the configured one
    #[arg(long, global = true, env = "FIELDSALES_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse and change records
    #[command(subcommand, alias = "rec")]
    Records(fieldsales::cli::RecordsCommands),

    /// Create many records at once
    #[command(subcommand)]
    Bulk(fieldsales::cli::BulkCommands),

    /// Spreadsheet export
    #[command(subcommand)]
    Export(fieldsales::cli::ExportCommands),

    /// Printable reports
    #[command(subcommand)]
    Report(fieldsales::cli::ReportCommands),

    /// Manage the stored API token
    #[command(subcommand)]
    Auth(fieldsales::cli::AuthCommands),

    /// Show recent changes made through this tool
    Audit(fieldsales::cli::AuditArgs),

    /// Show or change configuration
    Config {
        /// Set the backend base URL
        #[arg(long)]
        set_api_url: Option<String>,
        /// Set the name shown as "Generated by"
        #[arg(long)]
        set_actor: Option<String>,
        /// Set the page size used when walking lists
        #[arg(long)]
        set_page_size: Option<u32>,
        /// Set the default export directory
        #[arg(long)]
        set_export_dir: Option<String>,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "fieldsales=warn",
        1 => "fieldsales=info",
        _ => "fieldsales=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            if let Some(hint) = err.downcast_ref::<FieldSalesError>().and_then(|e| e.hint()) {
                eprintln!("{}", hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let paths = FieldSalesPaths::new()?;
    let mut settings = Settings::load_with_env(&paths)?;
    settings.apply_overrides(cli.api_url, None, None);
    let session = Session::new(paths, settings);

    match cli.command {
        Some(Commands::Records(cmd)) => handle_records_command(&session, cmd).await?,
        Some(Commands::Bulk(cmd)) => handle_bulk_command(&session, cmd).await?,
        Some(Commands::Export(cmd)) => handle_export_command(&session, cmd).await?,
        Some(Commands::Report(cmd)) => handle_report_command(&session, cmd).await?,
        Some(Commands::Auth(cmd)) => handle_auth_command(&session, cmd)?,
        Some(Commands::Audit(args)) => handle_audit_command(&session, args)?,
        Some(Commands::Config {
            set_api_url,
            set_actor,
            set_page_size,
            set_export_dir,
        }) => {
            let Session { paths, settings } = session;
            // Persist from the file, not from the env-merged view
            let mut stored = Settings::load_or_create(&paths)?;
            let changed = set_api_url.is_some()
                || set_actor.is_some()
                || set_page_size.is_some()
                || set_export_dir.is_some();

            if changed {
                if let Some(url) = set_api_url {
                    stored.api_base_url = url.trim_end_matches('/').to_string();
                }
                if let Some(actor) = set_actor {
                    stored.actor_name = Some(actor).filter(|a| !a.trim().is_empty());
                }
                if let Some(size) = set_page_size {
                    stored.page_size = size;
                }
                if let Some(dir) = set_export_dir {
                    stored.export_dir = Some(dir).filter(|d| !d.trim().is_empty());
                }
                stored.validate()?;
                stored.save(&paths)?;
                println!("Settings saved to {}", paths.settings_file().display());
                println!();
            }

            let shown = if changed { &stored } else { &settings };
            println!("fieldsales Configuration");
            println!("========================");
            println!("Config directory: {}", paths.base_dir().display());
            println!("Settings file:    {}", paths.settings_file().display());
            println!("Audit log:        {}", paths.audit_log().display());
            println!("Presets:          {}", paths.presets_dir().display());
            println!(
                "Exports:          {}",
                shown
                    .export_dir
                    .clone()
                    .unwrap_or_else(|| paths.exports_dir().display().to_string())
            );
            println!();
            println!("Settings:");
            println!("  API base URL: {}", shown.api_base_url);
            println!("  Page size:    {}", shown.page_size);
            println!("  Date format:  {}", shown.date_format);
            println!(
                "  Actor:        {}",
                shown.actor_name.as_deref().unwrap_or("(not set)")
            );
        }
        None => {
            println!("fieldsales - field-sales backend administration");
            println!();
            println!("Run 'fieldsales --help' for usage information.");
        }
    }

    Ok(())
}
