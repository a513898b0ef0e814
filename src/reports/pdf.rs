//! PDF output with lopdf
//!
//! Draws a [`LaidOutDocument`] using the standard Helvetica fonts, so no
//! font files are embedded.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::path::Path;
use tracing::debug;

use super::layout::{Element, Font, LaidOutDocument, Shade};
use crate::error::FieldSalesResult;

const REGULAR_FONT: &str = "F1";
const BOLD_FONT: &str = "F2";

fn int(value: f32) -> Object {
    Object::Integer(value.round() as i64)
}

/// Text as WinAnsi bytes; characters outside Latin-1 become '?'
fn pdf_string(text: &str) -> Object {
    let bytes: Vec<u8> = text
        .chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => b'\'',
            '\u{201C}' | '\u{201D}' => b'"',
            '\u{2013}' | '\u{2014}' => b'-',
            c if (c as u32) < 256 && !c.is_control() => c as u32 as u8,
            _ => b'?',
        })
        .collect();
    Object::String(bytes, StringFormat::Literal)
}

fn fill_color(shade: Shade) -> Vec<Object> {
    match shade {
        Shade::Light => vec![Object::Real(0.94), Object::Real(0.96), Object::Real(0.99)],
        Shade::Accent => vec![Object::Real(0.85), Object::Real(0.88), Object::Real(0.95)],
        Shade::Border => vec![Object::Real(0.6), Object::Real(0.6), Object::Real(0.6)],
    }
}

fn element_operations(element: &Element, ops: &mut Vec<Operation>) {
    match element {
        Element::Rect {
            x,
            y,
            width,
            height,
            shade,
        } => {
            let rect = vec![int(*x), int(*y), int(*width), int(*height)];
            ops.push(Operation::new("q", vec![]));
            match shade {
                Shade::Border => {
                    ops.push(Operation::new("RG", fill_color(*shade)));
                    ops.push(Operation::new("re", rect));
                    ops.push(Operation::new("S", vec![]));
                }
                _ => {
                    ops.push(Operation::new("rg", fill_color(*shade)));
                    ops.push(Operation::new("re", rect));
                    ops.push(Operation::new("f", vec![]));
                }
            }
            ops.push(Operation::new("Q", vec![]));
        }
        Element::Rule { x1, x2, y } => {
            ops.push(Operation::new("q", vec![]));
            ops.push(Operation::new("G", vec![Object::Real(0.7)]));
            ops.push(Operation::new("m", vec![int(*x1), int(*y)]));
            ops.push(Operation::new("l", vec![int(*x2), int(*y)]));
            ops.push(Operation::new("S", vec![]));
            ops.push(Operation::new("Q", vec![]));
        }
        Element::Text {
            x,
            y,
            size,
            font,
            text,
        } => {
            let name = match font {
                Font::Regular => REGULAR_FONT,
                Font::Bold => BOLD_FONT,
            };
            ops.push(Operation::new("BT", vec![]));
            ops.push(Operation::new("Tf", vec![name.into(), int(*size)]));
            ops.push(Operation::new("Td", vec![int(*x), int(*y)]));
            ops.push(Operation::new("Tj", vec![pdf_string(text)]));
            ops.push(Operation::new("ET", vec![]));
        }
    }
}

fn add_font(doc: &mut Document, base_font: &str) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    })
}

/// Build the PDF document object
fn build(layout: &LaidOutDocument) -> FieldSalesResult<Document> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = add_font(&mut doc, "Helvetica");
    let bold = add_font(&mut doc, "Helvetica-Bold");
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            REGULAR_FONT => regular,
            BOLD_FONT => bold,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(layout.pages.len());
    for page in &layout.pages {
        let mut operations = Vec::new();
        for element in &page.elements {
            element_operations(element, &mut operations);
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let geometry = layout.geometry;
    let pages = dictionary! {
        "Type" => "Pages",
        "Count" => Object::Integer(kids.len() as i64),
        "Kids" => kids,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            int(geometry.width),
            int(geometry.height),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let info_id = doc.add_object(dictionary! {
        "Title" => pdf_string(&layout.title),
        "Producer" => pdf_string(concat!("fieldsales ", env!("CARGO_PKG_VERSION"))),
    });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    Ok(doc)
}

/// Render a laid out document to PDF bytes
pub fn render_pdf(layout: &LaidOutDocument) -> FieldSalesResult<Vec<u8>> {
    let mut doc = build(layout)?;
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    debug!(pages = layout.pages.len(), bytes = buffer.len(), "pdf rendered");
    Ok(buffer)
}

/// Render a laid out document and write it to a file
pub fn save_pdf(layout: &LaidOutDocument, path: &Path) -> FieldSalesResult<()> {
    let bytes = render_pdf(layout)?;
    std::fs::write(path, bytes)?;
    Ok(())
}
