//! XLSX rendering with rust_xlsxwriter

use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, Worksheet};
use std::path::Path;
use tracing::debug;

use super::format::CellValue;
use super::sheet::{RowKind, SheetModel, WorkbookModel};
use crate::error::FieldSalesResult;

const MIN_COLUMN_WIDTH: usize = 8;
const MAX_COLUMN_WIDTH: usize = 60;

struct Styles {
    title: Format,
    header: Format,
    section: Format,
    count: Format,
    summary_label: Format,
    plain: Format,
    number: Format,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Format::new().set_bold().set_font_size(13),
            header: Format::new()
                .set_bold()
                .set_background_color(Color::RGB(0xD9E1F2))
                .set_border(FormatBorder::Thin),
            section: Format::new()
                .set_bold()
                .set_font_color(Color::White)
                .set_background_color(Color::RGB(0x1F4E78)),
            count: Format::new().set_italic().set_bold(),
            summary_label: Format::new().set_bold(),
            plain: Format::new(),
            number: Format::new().set_num_format("#,##0.##"),
        }
    }

    fn for_cell(&self, kind: RowKind, column: usize, cell: &CellValue) -> &Format {
        match (kind, cell) {
            (RowKind::Title, _) => &self.title,
            (RowKind::Header, _) => &self.header,
            (RowKind::Section, _) => &self.section,
            (RowKind::Count, _) => &self.count,
            (RowKind::Summary, _) if column == 0 => &self.summary_label,
            (_, CellValue::Number(_)) => &self.number,
            _ => &self.plain,
        }
    }
}

/// Column widths, in characters, fitted to content
fn column_widths(sheet: &SheetModel) -> Vec<usize> {
    let mut widths = vec![MIN_COLUMN_WIDTH; sheet.width()];
    for row in &sheet.rows {
        // Headings span the sheet and should not widen the first column
        if matches!(row.kind, RowKind::Title | RowKind::Section) {
            continue;
        }
        for (i, cell) in row.cells.iter().enumerate() {
            let len = cell.to_string().chars().count() + 2;
            widths[i] = widths[i].max(len.min(MAX_COLUMN_WIDTH));
        }
    }
    widths
}

fn write_sheet(worksheet: &mut Worksheet, sheet: &SheetModel, styles: &Styles) -> FieldSalesResult<()> {
    worksheet.set_name(&sheet.name)?;

    for (r, row) in sheet.rows.iter().enumerate() {
        let r = r as u32;
        for (c, cell) in row.cells.iter().enumerate() {
            let format = styles.for_cell(row.kind, c, cell);
            let c = c as u16;
            match cell {
                CellValue::Number(n) => {
                    worksheet.write_number_with_format(r, c, *n, format)?;
                }
                CellValue::Text(s) => {
                    worksheet.write_string_with_format(r, c, s, format)?;
                }
                CellValue::Empty if row.kind == RowKind::Header => {
                    worksheet.write_string_with_format(r, c, "", format)?;
                }
                CellValue::Empty => {}
            }
        }
    }

    for (c, width) in column_widths(sheet).into_iter().enumerate() {
        worksheet.set_column_width(c as u16, width as f64)?;
    }

    // Freeze the header of plain sheets, where it is the first row
    if sheet.rows.first().map(|r| r.kind) == Some(RowKind::Header) {
        worksheet.set_freeze_panes(1, 0)?;
    }

    Ok(())
}

fn build(model: &WorkbookModel) -> FieldSalesResult<Workbook> {
    let styles = Styles::new();
    let mut workbook = Workbook::new();
    for sheet in &model.sheets {
        let worksheet = workbook.add_worksheet();
        write_sheet(worksheet, sheet, &styles)?;
    }
    if model.sheets.is_empty() {
        workbook.add_worksheet().set_name("Empty")?;
    }
    Ok(workbook)
}

/// Render a workbook to xlsx bytes
pub fn render_xlsx(model: &WorkbookModel) -> FieldSalesResult<Vec<u8>> {
    let mut workbook = build(model)?;
    let buffer = workbook.save_to_buffer()?;
    debug!(sheets = model.sheets.len(), bytes = buffer.len(), "xlsx rendered");
    Ok(buffer)
}

/// Render a workbook and write it to a file
pub fn save_xlsx(model: &WorkbookModel, path: &Path) -> FieldSalesResult<()> {
    let bytes = render_xlsx(model)?;
    std::fs::write(path, bytes)?;
    Ok(())
}
