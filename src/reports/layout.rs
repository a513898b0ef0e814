//! Page layout for printable reports
//!
//! Content is placed top to bottom with a vertical cursor. Before anything
//! is placed the engine checks that it fits above the footer band and
//! starts a new page when it does not. Tables repeat their header row on
//! every page they span. The result is a list of positioned elements per
//! page, which the PDF writer draws verbatim.
//!
//! Coordinates are PDF points with the origin at the bottom left.

/// A4 portrait, in points
pub const A4_WIDTH: f32 = 595.0;
pub const A4_HEIGHT: f32 = 842.0;

const LINE_SPACING: f32 = 1.35;
const CELL_PADDING: f32 = 4.0;
const TABLE_FONT_SIZE: f32 = 9.0;
const METRIC_BOX_HEIGHT: f32 = 54.0;
const METRIC_GAP: f32 = 10.0;
const METRICS_PER_ROW: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    /// Band below the top margin holding title and subtitle
    pub header_height: f32,
    /// Band above the bottom margin holding page number and stamp
    pub footer_height: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

impl PageGeometry {
    pub fn a4() -> Self {
        Self {
            width: A4_WIDTH,
            height: A4_HEIGHT,
            margin: 40.0,
            header_height: 40.0,
            footer_height: 26.0,
        }
    }

    pub fn content_left(&self) -> f32 {
        self.margin
    }

    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    /// Highest y content may reach
    pub fn content_top(&self) -> f32 {
        self.height - self.margin - self.header_height
    }

    /// Lowest y content may reach
    pub fn content_bottom(&self) -> f32 {
        self.margin + self.footer_height
    }

    pub fn printable_height(&self) -> f32 {
        self.content_top() - self.content_bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

/// Fill styles for rectangles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shade {
    /// Pale background for metric boxes
    Light,
    /// Table header background
    Accent,
    /// Outline only
    Border,
}

/// A positioned drawing instruction
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// `y` is the text baseline
    Text {
        x: f32,
        y: f32,
        size: f32,
        font: Font,
        text: String,
    },
    /// `y` is the bottom edge
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        shade: Shade,
    },
    /// Horizontal rule
    Rule { x1: f32, x2: f32, y: f32 },
}

impl Element {
    /// Lowest point the element paints
    pub fn bottom(&self) -> f32 {
        match self {
            // Descenders reach about a quarter of the font size below the baseline
            Self::Text { y, size, .. } => y - size * 0.25,
            Self::Rect { y, .. } => *y,
            Self::Rule { y, .. } => *y,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } => Some(text.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub elements: Vec<Element>,
}

impl Page {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(Element::text)
    }
}

/// A fully laid out document
#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutDocument {
    pub title: String,
    pub geometry: PageGeometry,
    pub pages: Vec<Page>,
}

/// A headline number shown in a box
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub label: String,
    pub value: String,
}

impl Metric {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableColumn {
    pub header: String,
    /// Relative width
    pub weight: f32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: &[(&str, f32)]) -> Self {
        Self {
            columns: columns
                .iter()
                .map(|(header, weight)| TableColumn {
                    header: header.to_string(),
                    weight: *weight,
                })
                .collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }
}

/// Estimated advance width of a string in Helvetica
pub fn text_width(text: &str, size: f32, font: Font) -> f32 {
    let em: f32 = text
        .chars()
        .map(|c| match c {
            'i' | 'j' | 'l' | '.' | ',' | '\'' | '|' | '!' | ':' | ';' => 0.28,
            ' ' | 'f' | 't' | 'r' | 'I' | '(' | ')' | '-' | '/' => 0.33,
            'm' | 'w' | 'M' | 'W' | '@' | '%' => 0.86,
            c if c.is_ascii_uppercase() => 0.68,
            c if c.is_ascii_digit() => 0.56,
            _ => 0.52,
        })
        .sum();
    let weight = match font {
        Font::Regular => 1.0,
        Font::Bold => 1.06,
    };
    em * size * weight
}

/// Break text into lines no wider than `max_width`.
///
/// Explicit newlines are kept; words wider than a line are split.
pub fn wrap_text(text: &str, size: f32, font: Font, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };
            if text_width(&candidate, size, font) <= max_width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            // The word alone may still be too wide
            for c in word.chars() {
                current.push(c);
                if text_width(&current, size, font) > max_width && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(c);
                }
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

/// Places content onto pages
pub struct LayoutEngine {
    geometry: PageGeometry,
    title: String,
    subtitle: String,
    pages: Vec<Page>,
    cursor: f32,
}

impl LayoutEngine {
    pub fn new(title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self::with_geometry(title, subtitle, PageGeometry::a4())
    }

    pub fn with_geometry(
        title: impl Into<String>,
        subtitle: impl Into<String>,
        geometry: PageGeometry,
    ) -> Self {
        Self {
            geometry,
            title: title.into(),
            subtitle: subtitle.into(),
            pages: vec![Page::default()],
            cursor: geometry.content_top(),
        }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn cursor(&self) -> f32 {
        self.cursor
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn push(&mut self, element: Element) {
        if let Some(page) = self.pages.last_mut() {
            page.elements.push(element);
        }
    }

    fn page_is_empty(&self) -> bool {
        self.pages.last().map_or(true, |p| p.elements.is_empty())
    }

    fn remaining(&self) -> f32 {
        self.cursor - self.geometry.content_bottom()
    }

    pub fn page_break(&mut self) {
        self.pages.push(Page::default());
        self.cursor = self.geometry.content_top();
    }

    /// Start a new page unless `height` still fits on this one
    fn ensure(&mut self, height: f32) {
        if height > self.remaining() && !self.page_is_empty() {
            self.page_break();
        }
    }

    fn line(&mut self, x: f32, text: String, size: f32, font: Font) {
        let height = size * LINE_SPACING;
        self.ensure(height);
        if height > self.remaining() {
            // Taller than an empty page; nothing sensible to draw
            return;
        }
        self.push(Element::Text {
            x,
            y: self.cursor - size,
            size,
            font,
            text,
        });
        self.cursor -= height;
    }

    /// Section heading; level 1 is the largest
    pub fn heading(&mut self, text: &str, level: u8) {
        let size = match level {
            0 | 1 => 16.0,
            2 => 13.0,
            _ => 11.0,
        };
        let lines = wrap_text(text, size, Font::Bold, self.geometry.content_width());
        // Keep the heading together with at least one line of what follows
        self.ensure(size * LINE_SPACING * lines.len().max(1) as f32 + 12.0 * LINE_SPACING);
        for line in lines {
            self.line(self.geometry.content_left(), line, size, Font::Bold);
        }
        self.spacer(size * 0.3);
    }

    /// Wrapped body text
    pub fn paragraph(&mut self, text: &str, size: f32) {
        let lines = wrap_text(text, size, Font::Regular, self.geometry.content_width());
        for line in lines {
            self.line(self.geometry.content_left(), line, size, Font::Regular);
        }
        self.spacer(size * 0.6);
    }

    /// A "Label: value" line, bold label
    pub fn labeled(&mut self, label: &str, value: &str, size: f32) {
        let label = format!("{}:", label);
        let offset = text_width(&label, size, Font::Bold) + 4.0;
        let x = self.geometry.content_left();
        let lines = wrap_text(value, size, Font::Regular, self.geometry.content_width() - offset);
        let height = size * LINE_SPACING;
        self.ensure(height);
        let y = self.cursor - size;
        self.push(Element::Text {
            x,
            y,
            size,
            font: Font::Bold,
            text: label,
        });
        let mut lines = lines.into_iter();
        match lines.next() {
            Some(first) => {
                self.push(Element::Text {
                    x: x + offset,
                    y,
                    size,
                    font: Font::Regular,
                    text: first,
                });
                self.cursor -= height;
            }
            None => self.cursor -= height,
        }
        for line in lines {
            self.line(x + offset, line, size, Font::Regular);
        }
    }

    /// Vertical gap; never moves the cursor past the bottom of the page
    pub fn spacer(&mut self, height: f32) {
        self.cursor = (self.cursor - height).max(self.geometry.content_bottom());
    }

    /// A row of boxes, each with a large value and a small label
    pub fn metric_boxes(&mut self, metrics: &[Metric]) {
        for chunk in metrics.chunks(METRICS_PER_ROW) {
            self.ensure(METRIC_BOX_HEIGHT);
            let count = chunk.len() as f32;
            let width = (self.geometry.content_width() - METRIC_GAP * (count - 1.0)) / count;
            let top = self.cursor;

            for (i, metric) in chunk.iter().enumerate() {
                let x = self.geometry.content_left() + i as f32 * (width + METRIC_GAP);
                self.push(Element::Rect {
                    x,
                    y: top - METRIC_BOX_HEIGHT,
                    width,
                    height: METRIC_BOX_HEIGHT,
                    shade: Shade::Light,
                });
                self.push(Element::Text {
                    x: x + 8.0,
                    y: top - 26.0,
                    size: 18.0,
                    font: Font::Bold,
                    text: metric.value.clone(),
                });
                let label = wrap_text(&metric.label, 9.0, Font::Regular, width - 16.0)
                    .into_iter()
                    .next()
                    .unwrap_or_default();
                self.push(Element::Text {
                    x: x + 8.0,
                    y: top - 44.0,
                    size: 9.0,
                    font: Font::Regular,
                    text: label,
                });
            }
            self.cursor = top - METRIC_BOX_HEIGHT;
            self.spacer(12.0);
        }
    }

    fn column_widths(&self, table: &Table) -> Vec<f32> {
        let total: f32 = table.columns.iter().map(|c| c.weight.max(0.0)).sum();
        let width = self.geometry.content_width();
        table
            .columns
            .iter()
            .map(|c| {
                if total > 0.0 {
                    width * c.weight.max(0.0) / total
                } else {
                    width / table.columns.len() as f32
                }
            })
            .collect()
    }

    fn wrap_cells(cells: &[String], widths: &[f32], font: Font) -> Vec<Vec<String>> {
        widths
            .iter()
            .enumerate()
            .map(|(i, width)| {
                let text = cells.get(i).map(String::as_str).unwrap_or("");
                wrap_text(text, TABLE_FONT_SIZE, font, width - 2.0 * CELL_PADDING)
            })
            .collect()
    }

    fn row_height(cells: &[Vec<String>]) -> f32 {
        let lines = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);
        lines as f32 * TABLE_FONT_SIZE * LINE_SPACING + 2.0 * CELL_PADDING
    }

    fn draw_row(&mut self, cells: &[Vec<String>], widths: &[f32], header: bool) {
        let height = Self::row_height(cells);
        let top = self.cursor;
        let left = self.geometry.content_left();
        let font = if header { Font::Bold } else { Font::Regular };

        if header {
            self.push(Element::Rect {
                x: left,
                y: top - height,
                width: self.geometry.content_width(),
                height,
                shade: Shade::Accent,
            });
        }

        let mut x = left;
        for (lines, width) in cells.iter().zip(widths) {
            for (k, line) in lines.iter().enumerate() {
                self.push(Element::Text {
                    x: x + CELL_PADDING,
                    y: top - CELL_PADDING - TABLE_FONT_SIZE - k as f32 * TABLE_FONT_SIZE * LINE_SPACING,
                    size: TABLE_FONT_SIZE,
                    font,
                    text: line.clone(),
                });
            }
            x += width;
        }

        self.push(Element::Rule {
            x1: left,
            x2: left + self.geometry.content_width(),
            y: top - height,
        });
        self.cursor = top - height;
    }

    /// Keep the lines that fit in `available` points and return the rest
    /// of each cell, or `None` when the whole row fits
    fn split_row(cells: &mut [Vec<String>], available: f32) -> Option<Vec<Vec<String>>> {
        let line_height = TABLE_FONT_SIZE * LINE_SPACING;
        let max_lines = ((available - 2.0 * CELL_PADDING) / line_height).floor().max(1.0) as usize;
        if cells.iter().all(|lines| lines.len() <= max_lines) {
            return None;
        }
        Some(
            cells
                .iter_mut()
                .map(|lines| {
                    if lines.len() > max_lines {
                        lines.split_off(max_lines)
                    } else {
                        Vec::new()
                    }
                })
                .collect(),
        )
    }

    /// A table with a header row repeated on every page it spans
    pub fn table(&mut self, table: &Table) {
        if table.columns.is_empty() {
            return;
        }
        let widths = self.column_widths(table);
        let headers: Vec<String> = table.columns.iter().map(|c| c.header.clone()).collect();
        let header_cells = Self::wrap_cells(&headers, &widths, Font::Bold);
        let header_height = Self::row_height(&header_cells);

        if table.rows.is_empty() {
            self.ensure(header_height + TABLE_FONT_SIZE * LINE_SPACING);
            self.draw_row(&header_cells, &widths, true);
            self.spacer(4.0);
            self.paragraph("No records.", TABLE_FONT_SIZE);
            return;
        }

        let mut header_drawn = false;
        for row in &table.rows {
            let mut cells = Self::wrap_cells(row, &widths, Font::Regular);
            let height = Self::row_height(&cells);

            let needed = if header_drawn { height } else { header_height + height };
            if needed > self.remaining() {
                if !self.page_is_empty() {
                    self.page_break();
                }
                header_drawn = false;
            }
            if !header_drawn {
                self.draw_row(&header_cells, &widths, true);
                header_drawn = true;
            }
            // Longer than a whole page: the rest continues under a repeated header
            while let Some(rest) = Self::split_row(&mut cells, self.remaining()) {
                self.draw_row(&cells, &widths, false);
                self.page_break();
                self.draw_row(&header_cells, &widths, true);
                cells = rest;
            }
            self.draw_row(&cells, &widths, false);
        }
        self.spacer(10.0);
    }

    /// Add header and footer bands to every page and return the document
    pub fn finish(self, generated: &str) -> LaidOutDocument {
        let geometry = self.geometry;
        let total = self.pages.len();
        let left = geometry.content_left();
        let right = geometry.width - geometry.margin;
        let mut pages = self.pages;

        for (i, page) in pages.iter_mut().enumerate() {
            let mut bands = vec![
                Element::Text {
                    x: left,
                    y: geometry.height - geometry.margin - 14.0,
                    size: 12.0,
                    font: Font::Bold,
                    text: self.title.clone(),
                },
                Element::Text {
                    x: left,
                    y: geometry.height - geometry.margin - 28.0,
                    size: 9.0,
                    font: Font::Regular,
                    text: self.subtitle.clone(),
                },
                Element::Rule {
                    x1: left,
                    x2: right,
                    y: geometry.content_top() + 4.0,
                },
                Element::Rule {
                    x1: left,
                    x2: right,
                    y: geometry.content_bottom() - 6.0,
                },
                Element::Text {
                    x: left,
                    y: geometry.margin + 6.0,
                    size: 8.0,
                    font: Font::Regular,
                    text: generated.to_string(),
                },
            ];
            let number = format!("Page {} of {}", i + 1, total);
            bands.push(Element::Text {
                x: right - text_width(&number, 8.0, Font::Regular),
                y: geometry.margin + 6.0,
                size: 8.0,
                font: Font::Regular,
                text: number,
            });
            bands.append(&mut page.elements);
            page.elements = bands;
        }

        LaidOutDocument {
            title: self.title,
            geometry,
            pages,
        }
    }
}
