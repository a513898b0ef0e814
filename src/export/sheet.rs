//! Workbook assembly
//!
//! Builds a format-neutral [`WorkbookModel`] from fetched records and the
//! selected columns. The xlsx and csv writers only render what is here.

use chrono::{DateTime, Local, NaiveDate};
use serde_json::Value;

use super::fields::resolve_field;
use super::filename::unique_sheet_names;
use super::format::{format_value, CellValue, FormatOptions};
use super::grouping::{group_by_week, owned_by, NO_DATE_LABEL};
use crate::models::{ColumnSpec, DataType};

/// Kind of a sheet row, which drives its styling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// Data-type heading in combined and per-person sheets
    Title,
    /// Column labels
    Header,
    Data,
    /// Record count closing a block
    Count,
    /// Week bucket heading
    Section,
    Blank,
    Summary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub kind: RowKind,
    pub cells: Vec<CellValue>,
}

impl Row {
    fn new(kind: RowKind, cells: Vec<CellValue>) -> Self {
        Self { kind, cells }
    }

    fn blank() -> Self {
        Self::new(RowKind::Blank, Vec::new())
    }

    fn label(kind: RowKind, text: impl Into<String>) -> Self {
        Self::new(kind, vec![CellValue::text(text)])
    }

    fn count(count: usize) -> Self {
        Self::new(
            RowKind::Count,
            vec![CellValue::text("Total records"), CellValue::Number(count as f64)],
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetModel {
    pub name: String,
    pub rows: Vec<Row>,
    /// Number of data records placed on the sheet
    pub record_count: usize,
}

impl SheetModel {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
            record_count: 0,
        }
    }

    /// Widest row, in cells
    pub fn width(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
    }

    pub fn rows_of(&self, kind: RowKind) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(move |r| r.kind == kind)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorkbookModel {
    pub sheets: Vec<SheetModel>,
}

impl WorkbookModel {
    pub fn record_count(&self) -> usize {
        self.sheets.iter().map(|s| s.record_count).sum()
    }
}

/// Records of one data type with the columns chosen for them
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    pub data_type: DataType,
    pub columns: Vec<ColumnSpec>,
    pub records: Vec<Value>,
}

/// How data types are spread over sheets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SheetLayout {
    /// One sheet per data type
    #[default]
    PerType,
    /// Every data type on one sheet, separated by headings
    Combined,
}

/// Trailing metadata block
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryInfo {
    pub generated_at: DateTime<Local>,
    pub actor: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl SummaryInfo {
    fn date_range(&self) -> String {
        let fmt = |d: Option<NaiveDate>| {
            d.map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "…".to_string())
        };
        match (self.start, self.end) {
            (None, None) => "All dates".to_string(),
            (start, end) => format!("{} to {}", fmt(start), fmt(end)),
        }
    }
}

/// A person who gets a sheet of their own
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonSheet {
    pub user_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct SheetOptions {
    pub layout: SheetLayout,
    pub group_by_week: bool,
    pub people: Vec<PersonSheet>,
    pub summary: Option<SummaryInfo>,
    pub format: FormatOptions,
}

fn header_row(columns: &[ColumnSpec]) -> Row {
    Row::new(
        RowKind::Header,
        columns.iter().map(|c| CellValue::text(c.label.clone())).collect(),
    )
}

fn data_row(record: &Value, columns: &[ColumnSpec], options: &FormatOptions) -> Row {
    Row::new(
        RowKind::Data,
        columns
            .iter()
            .map(|column| format_value(&resolve_field(record, &column.key), column, options))
            .collect(),
    )
}

/// Emit the rows for one data type's records into a sheet
fn push_block(
    sheet: &mut SheetModel,
    data_type: DataType,
    columns: &[ColumnSpec],
    records: &[Value],
    options: &SheetOptions,
) {
    sheet.record_count += records.len();

    if options.group_by_week {
        for bucket in group_by_week(records, data_type) {
            sheet.rows.push(Row::label(RowKind::Section, bucket.label()));
            sheet.rows.push(header_row(columns));
            for record in &bucket.records {
                sheet.rows.push(data_row(record, columns, &options.format));
            }
            sheet.rows.push(Row::count(bucket.len()));
            sheet.rows.push(Row::blank());
        }
        if records.is_empty() {
            sheet.rows.push(header_row(columns));
            sheet.rows.push(Row::count(0));
        }
        return;
    }

    sheet.rows.push(header_row(columns));
    for record in records {
        sheet.rows.push(data_row(record, columns, &options.format));
    }
}

fn push_summary(sheet: &mut SheetModel, info: &SummaryInfo) {
    sheet.rows.push(Row::blank());
    let mut lines = vec![
        ("Record count", CellValue::Number(sheet.record_count as f64)),
        (
            "Generated",
            CellValue::text(info.generated_at.format("%Y-%m-%d %H:%M").to_string()),
        ),
    ];
    if let Some(actor) = &info.actor {
        lines.push(("Generated by", CellValue::text(actor.clone())));
    }
    lines.push(("Date range", CellValue::text(info.date_range())));

    for (label, value) in lines {
        sheet
            .rows
            .push(Row::new(RowKind::Summary, vec![CellValue::text(label), value]));
    }
}

fn combined_sheet<'a>(
    name: &str,
    datasets: impl Iterator<Item = (&'a DataSet, Vec<Value>)>,
    options: &SheetOptions,
) -> SheetModel {
    let mut sheet = SheetModel::new(name);
    for (dataset, records) in datasets {
        sheet.rows.push(Row::label(
            RowKind::Title,
            format!("{} ({})", dataset.data_type.label(), records.len()),
        ));
        push_block(&mut sheet, dataset.data_type, &dataset.columns, &records, options);
        if !options.group_by_week {
            sheet.rows.push(Row::blank());
        }
    }
    sheet
}

/// Assemble the workbook for the given data sets
pub fn build_workbook(datasets: &[DataSet], options: &SheetOptions) -> WorkbookModel {
    let mut sheets = Vec::new();

    match options.layout {
        SheetLayout::PerType => {
            for dataset in datasets {
                let mut sheet = SheetModel::new(dataset.data_type.label());
                push_block(
                    &mut sheet,
                    dataset.data_type,
                    &dataset.columns,
                    &dataset.records,
                    options,
                );
                sheets.push(sheet);
            }
        }
        SheetLayout::Combined => {
            let all = datasets.iter().map(|d| (d, d.records.clone()));
            sheets.push(combined_sheet("All Data", all, options));
        }
    }

    for person in &options.people {
        let ids = [person.user_id.clone()];
        let theirs = datasets.iter().map(|d| {
            let records: Vec<Value> = d
                .records
                .iter()
                .filter(|r| owned_by(r, d.data_type, &ids))
                .cloned()
                .collect();
            (d, records)
        });
        sheets.push(combined_sheet(&person.name, theirs, options));
    }

    if let Some(info) = &options.summary {
        for sheet in &mut sheets {
            push_summary(sheet, info);
        }
    }

    let names: Vec<String> = sheets.iter().map(|s| s.name.clone()).collect();
    for (sheet, name) in sheets.iter_mut().zip(unique_sheet_names(&names)) {
        sheet.name = name;
    }

    WorkbookModel { sheets }
}

/// Whether a section row is the undated bucket
pub fn is_no_date_section(row: &Row) -> bool {
    row.kind == RowKind::Section
        && matches!(row.cells.first(), Some(CellValue::Text(t)) if t == NO_DATE_LABEL)
}
