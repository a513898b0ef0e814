//! CLI commands for spreadsheet export
//!
//! `export sheet` writes the selected data types to an `.xlsx` workbook or
//! a `.csv` file; `export columns` shows which columns can be picked.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::Subcommand;
use tracing::warn;

use super::{parse_data_type, parse_date_arg, write_output, Session};
use crate::display::{format_column_list, format_export_outcome};
use crate::error::{FieldSalesError, FieldSalesResult};
use crate::export::{export_filename, ExportFormat, SheetLayout};
use crate::models::column::{available_columns, default_columns, select_columns};
use crate::models::{ColumnPreset, ColumnSpec, DataType};
use crate::services::{ExportRequest, ExportService, TypeSelection};

fn parse_format(s: &str) -> Result<ExportFormat, String> {
    ExportFormat::parse(s).ok_or_else(|| format!("unknown format '{}', expected xlsx or csv", s))
}

/// Export subcommands
#[derive(Subcommand)]
pub enum ExportCommands {
    /// Export records to a spreadsheet
    Sheet {
        /// Comma-separated data types, or "all"
        #[arg(short, long)]
        types: String,
        /// Comma-separated column keys, applied to every type
        #[arg(short, long, conflicts_with = "preset")]
        columns: Option<String>,
        /// Column preset file (YAML or JSON, repeatable)
        #[arg(short, long)]
        preset: Vec<PathBuf>,
        /// Group rows by ISO week
        #[arg(short = 'w', long)]
        group_by_week: bool,
        /// Put every data type on one sheet
        #[arg(long)]
        combined: bool,
        /// Only records of this user (repeatable)
        #[arg(long = "person")]
        people: Vec<String>,
        /// Add one sheet per --person
        #[arg(long, requires = "people")]
        person_sheets: bool,
        /// Earliest date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        start: Option<NaiveDate>,
        /// Latest date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        end: Option<NaiveDate>,
        /// Free-text search passed to the backend
        #[arg(short, long)]
        search: Option<String>,
        /// Append a summary block
        #[arg(long)]
        summary: bool,
        /// Output format (xlsx or csv)
        #[arg(short, long, default_value = "xlsx", value_parser = parse_format)]
        format: ExportFormat,
        /// Output file (defaults to a dated name in the export directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the columns available for a data type
    Columns {
        #[arg(value_parser = parse_data_type)]
        data_type: DataType,
        /// Write the default columns to a preset file to edit
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

fn parse_types(types: &str) -> FieldSalesResult<Vec<DataType>> {
    if types.trim().eq_ignore_ascii_case("all") {
        return Ok(DataType::ALL.to_vec());
    }
    DataType::parse_list(types).map_err(FieldSalesError::Validation)
}

/// Columns per data type: explicit keys, then a preset, then the defaults
fn selections(
    data_types: &[DataType],
    columns: Option<&str>,
    presets: &[PathBuf],
) -> FieldSalesResult<Vec<TypeSelection>> {
    let mut preset_columns: HashMap<DataType, Vec<ColumnSpec>> = HashMap::new();
    for path in presets {
        let preset = ColumnPreset::load(path)?;
        if !data_types.contains(&preset.data_type) {
            warn!(preset = %preset.name, data_type = %preset.data_type, "preset is for a type not being exported");
        }
        preset_columns.insert(preset.data_type, preset.columns);
    }

    let keys: Option<Vec<&str>> = columns.map(|c| c.split(',').collect());
    Ok(data_types
        .iter()
        .map(|&data_type| TypeSelection {
            data_type,
            columns: match &keys {
                Some(keys) => select_columns(data_type, keys),
                None => preset_columns
                    .get(&data_type)
                    .cloned()
                    .unwrap_or_else(|| default_columns(data_type)),
            },
        })
        .collect())
}

/// Handle export commands
pub async fn handle_export_command(session: &Session, cmd: ExportCommands) -> FieldSalesResult<()> {
    match cmd {
        ExportCommands::Sheet {
            types,
            columns,
            preset,
            group_by_week,
            combined,
            people,
            person_sheets,
            start,
            end,
            search,
            summary,
            format,
            output,
        } => {
            let data_types = parse_types(&types)?;
            let request = ExportRequest {
                selections: selections(&data_types, columns.as_deref(), &preset)?,
                start_date: start,
                end_date: end,
                search,
                user_ids: people,
                per_person_sheets: person_sheets,
                layout: if combined {
                    SheetLayout::Combined
                } else {
                    SheetLayout::PerType
                },
                group_by_week,
                include_summary: summary,
                actor: session.actor().map(str::to_string),
            };
            request.validate()?;

            let path = output.unwrap_or_else(|| {
                session.export_dir().join(export_filename(
                    &data_types,
                    start,
                    end,
                    Local::now().date_naive(),
                    format.extension(),
                ))
            });

            let client = session.client()?;
            println!("Fetching {} data type(s)...", data_types.len());
            let outcome = ExportService::new(&client, session.format_options())
                .build(&request)
                .await?;

            let bytes = format.render(&outcome.workbook)?;
            write_output(&path, &bytes)?;
            print!("{}", format_export_outcome(&outcome, &path));
        }

        ExportCommands::Columns { data_type, save } => {
            let defaults = default_columns(data_type);
            print!(
                "{}",
                format_column_list(&available_columns(data_type), &defaults)
            );

            if let Some(path) = save {
                let name = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("preset")
                    .to_string();
                let preset = ColumnPreset {
                    name,
                    data_type,
                    columns: defaults,
                };
                preset.save(&path)?;
                println!("Preset written to {}", path.display());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_types() {
        assert_eq!(parse_types("all").unwrap().len(), DataType::ALL.len());
        assert_eq!(
            parse_types("visits, calllogs").unwrap(),
            vec![DataType::Visits, DataType::CallLogs]
        );
        assert!(parse_types("visits,budgets").unwrap_err().is_validation());
    }

    #[test]
    fn test_empty_column_list_selects_nothing() {
        let selected = selections(&[DataType::Visits], Some(""), &[]).unwrap();
        assert!(selected[0].columns.is_empty());
    }

    #[test]
    fn test_defaults_without_columns() {
        let selected = selections(&[DataType::Machines], None, &[]).unwrap();
        assert_eq!(selected[0].columns, default_columns(DataType::Machines));
    }

    #[test]
    fn test_preset_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("visits.yaml");
        ColumnPreset {
            name: "short".into(),
            data_type: DataType::Visits,
            columns: select_columns(DataType::Visits, &["client.name"]),
        }
        .save(&path)
        .unwrap();

        let selected =
            selections(&[DataType::Visits, DataType::Machines], None, &[path]).unwrap();
        assert_eq!(selected[0].columns.len(), 1);
        assert_eq!(selected[0].columns[0].key, "client.name");
        assert_eq!(selected[1].columns, default_columns(DataType::Machines));
    }
}
