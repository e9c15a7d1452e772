//! Serialises a [`Layout`] to PDF bytes.
//!
//! Uses the base-14 Helvetica faces with WinAnsi encoding, so no font files
//! are embedded. Output carries no timestamps or random IDs and is therefore
//! byte-identical for identical layouts.

use anyhow::Result;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::layout::engine::{Color, DrawOp, Layout};
use crate::layout::font_metrics::{win_ansi_code, Font, BULLET_CODE};

pub fn render_pdf(layout: &Layout, title: &str) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = add_font(&mut doc, Font::Regular);
    let bold_id = add_font(&mut doc, Font::Bold);
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            Font::Regular.resource_name() => regular_id,
            Font::Bold.resource_name() => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(layout.pages.len());
    for page in &layout.pages {
        let operations: Vec<Operation> = page
            .body
            .iter()
            .chain(page.footer.iter())
            .flat_map(draw_operations)
            .collect();
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Count" => Object::Integer(kids.len() as i64),
        "Kids" => kids,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            layout.page_width.into(),
            layout.page_height.into(),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(encode_win_ansi(title)),
        "Producer" => Object::string_literal("Gatehouse site"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

fn add_font(doc: &mut Document, font: Font) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => font.base_font(),
        "Encoding" => "WinAnsiEncoding",
    })
}

fn set_fill(color: Color) -> Operation {
    Operation::new("rg", vec![color.r.into(), color.g.into(), color.b.into()])
}

fn show_text(font: Font, size: f32, x: f32, y: f32, bytes: Vec<u8>) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![font.resource_name().into(), size.into()]),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new("Tj", vec![Object::string_literal(bytes)]),
        Operation::new("ET", vec![]),
    ]
}

fn draw_operations(op: &DrawOp) -> Vec<Operation> {
    match op {
        DrawOp::Text {
            x,
            y,
            size,
            font,
            color,
            text,
        } => {
            let mut ops = vec![set_fill(*color)];
            ops.extend(show_text(*font, *size, *x, *y, encode_win_ansi(text)));
            ops
        }
        DrawOp::Marker { x, y, size, color } => {
            let mut ops = vec![set_fill(*color)];
            ops.extend(show_text(Font::Regular, *size, *x, *y, vec![BULLET_CODE]));
            ops
        }
        DrawOp::Rule {
            x1,
            x2,
            y,
            thickness,
            color,
        } => vec![
            Operation::new("RG", vec![color.r.into(), color.g.into(), color.b.into()]),
            Operation::new("w", vec![(*thickness).into()]),
            Operation::new("m", vec![(*x1).into(), (*y).into()]),
            Operation::new("l", vec![(*x2).into(), (*y).into()]),
            Operation::new("S", vec![]),
        ],
    }
}

/// Maps text to the WinAnsi bytes the base-14 fonts render.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_code).collect()
}
