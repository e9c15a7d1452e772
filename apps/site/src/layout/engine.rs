//! Pagination engine.
//!
//! Turns a validated [`DocumentSpec`] into positioned draw operations, one list
//! per page, in PDF user space (origin bottom-left, y grows upward). The
//! cursor starts at the top margin and moves down. Before any line is placed
//! the engine checks that it ends above `margin + bottom_buffer`; if not, the
//! page is closed with its footer and a fresh page is started.
//!
//! Layout is a pure function of the document and config, so identical input
//! always produces identical pages.

use serde::Serialize;

use crate::layout::document::{DocumentSpec, SectionBody};
use crate::layout::font_metrics::Font;
use crate::layout::wrap::wrap_text;

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Page geometry and type scale, in points.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutConfig {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    /// Space kept clear above the bottom margin for the footer.
    pub bottom_buffer: f32,
    pub title_size: f32,
    pub subtitle_size: f32,
    pub heading_size: f32,
    pub body_size: f32,
    pub closing_size: f32,
    pub footer_size: f32,
    /// Baseline-to-baseline distance as a multiple of the font size.
    pub line_height: f32,
    pub paragraph_gap: f32,
    pub bullet_gap: f32,
    pub section_gap: f32,
    /// Offset of the bullet marker from the left margin.
    pub bullet_indent: f32,
    /// Offset of bullet text (all wrapped lines) from the left margin.
    pub text_indent: f32,
    /// Distance below the bottom margin of the footer rule and text baseline.
    pub footer_rule_offset: f32,
    pub footer_text_offset: f32,
}

/// US letter, 60pt margins, 10.5pt body.
impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_width: 612.0,
            page_height: 792.0,
            margin: 60.0,
            bottom_buffer: 30.0,
            title_size: 24.0,
            subtitle_size: 12.0,
            heading_size: 14.0,
            body_size: 10.5,
            closing_size: 9.5,
            footer_size: 8.0,
            line_height: 1.45,
            paragraph_gap: 6.0,
            bullet_gap: 3.0,
            section_gap: 14.0,
            bullet_indent: 10.0,
            text_indent: 22.0,
            footer_rule_offset: 22.0,
            footer_text_offset: 34.0,
        }
    }
}

impl LayoutConfig {
    pub fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    /// Baseline of the first line on a page starts below this.
    pub fn top(&self) -> f32 {
        self.page_height - self.margin
    }

    /// Nothing in the page body extends below this.
    pub fn floor(&self) -> f32 {
        self.margin + self.bottom_buffer
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const INK: Color = Color { r: 0.09, g: 0.10, b: 0.13 };
    pub const MUTED: Color = Color { r: 0.42, g: 0.45, b: 0.50 };
    pub const ACCENT: Color = Color { r: 0.16, g: 0.38, b: 0.95 };
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        size: f32,
        font: Font,
        color: Color,
        text: String,
    },
    Rule {
        x1: f32,
        x2: f32,
        y: f32,
        thickness: f32,
        color: Color,
    },
    /// Bullet glyph in front of the first line of a list item.
    Marker {
        x: f32,
        y: f32,
        size: f32,
        color: Color,
    },
}

#[cfg(test)]
impl DrawOp {
    /// Lowest y the op touches, for bounds checks.
    pub fn y(&self) -> f32 {
        match self {
            DrawOp::Text { y, .. } | DrawOp::Rule { y, .. } | DrawOp::Marker { y, .. } => *y,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            DrawOp::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    /// 1-based.
    pub number: u32,
    pub body: Vec<DrawOp>,
    pub footer: Vec<DrawOp>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub page_width: f32,
    pub page_height: f32,
    pub pages: Vec<Page>,
}

impl Layout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Paginator
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    AtTopOfPage,
    WritingBody,
    PageFull,
}

struct Paginator<'a> {
    config: &'a LayoutConfig,
    footer_text: &'a str,
    pages: Vec<Page>,
    ops: Vec<DrawOp>,
    cursor: f32,
    state: PageState,
}

impl<'a> Paginator<'a> {
    fn new(config: &'a LayoutConfig, footer_text: &'a str) -> Self {
        Self {
            config,
            footer_text,
            pages: Vec::new(),
            ops: Vec::new(),
            cursor: config.top(),
            state: PageState::AtTopOfPage,
        }
    }

    /// Starts a new page if `height` more points would cross the floor.
    /// A fresh page always accepts the next line.
    fn ensure_space(&mut self, height: f32) {
        if self.state == PageState::AtTopOfPage {
            return;
        }
        if self.cursor - height < self.config.floor() {
            self.state = PageState::PageFull;
            self.break_page();
        }
    }

    /// Vertical whitespace. Suppressed at the top of a page.
    fn gap(&mut self, amount: f32) {
        if self.state == PageState::WritingBody {
            self.cursor -= amount;
        }
    }

    fn line_height(&self, size: f32) -> f32 {
        size * self.config.line_height
    }

    fn text_line(&mut self, text: String, x: f32, size: f32, font: Font, color: Color) {
        let height = self.line_height(size);
        self.ensure_space(height);
        let y = self.cursor - size;
        self.ops.push(DrawOp::Text {
            x,
            y,
            size,
            font,
            color,
            text,
        });
        self.cursor -= height;
        self.state = PageState::WritingBody;
    }

    fn bullet_item(&mut self, text: &str) {
        let cfg = self.config;
        let size = cfg.body_size;
        let width = cfg.content_width() - cfg.text_indent;
        let lines = wrap_text(text, |s| Font::Regular.measure(s, size), width);

        for (i, line) in lines.into_iter().enumerate() {
            let height = self.line_height(size);
            self.ensure_space(height);
            if i == 0 {
                self.ops.push(DrawOp::Marker {
                    x: cfg.margin + cfg.bullet_indent,
                    y: self.cursor - size,
                    size,
                    color: Color::ACCENT,
                });
            }
            self.text_line(line, cfg.margin + cfg.text_indent, size, Font::Regular, Color::INK);
        }
    }

    fn wrapped(&mut self, text: &str, size: f32, font: Font, color: Color) {
        let cfg = self.config;
        for line in wrap_text(text, |s| font.measure(s, size), cfg.content_width()) {
            self.text_line(line, cfg.margin, size, font, color);
        }
    }

    fn rule(&mut self, thickness: f32, color: Color) {
        let space = 8.0;
        self.ensure_space(space);
        let y = self.cursor - space / 2.0;
        self.ops.push(DrawOp::Rule {
            x1: self.config.margin,
            x2: self.config.page_width - self.config.margin,
            y,
            thickness,
            color,
        });
        self.cursor -= space;
        self.state = PageState::WritingBody;
    }

    fn footer(&self, number: u32) -> Vec<DrawOp> {
        let cfg = self.config;
        let size = cfg.footer_size;
        let label = number.to_string();
        let label_width = Font::Regular.measure(&label, size);
        let text_y = cfg.margin - cfg.footer_text_offset;

        vec![
            DrawOp::Rule {
                x1: cfg.margin,
                x2: cfg.page_width - cfg.margin,
                y: cfg.margin - cfg.footer_rule_offset,
                thickness: 0.5,
                color: Color::ACCENT,
            },
            DrawOp::Text {
                x: cfg.margin,
                y: text_y,
                size,
                font: Font::Regular,
                color: Color::MUTED,
                text: self.footer_text.to_string(),
            },
            DrawOp::Text {
                x: cfg.page_width - cfg.margin - label_width,
                y: text_y,
                size,
                font: Font::Regular,
                color: Color::MUTED,
                text: label,
            },
        ]
    }

    fn finish_page(&mut self) {
        let number = self.pages.len() as u32 + 1;
        let footer = self.footer(number);
        let body = std::mem::take(&mut self.ops);
        self.pages.push(Page {
            number,
            body,
            footer,
        });
    }

    fn break_page(&mut self) {
        self.finish_page();
        self.cursor = self.config.top();
        self.state = PageState::AtTopOfPage;
    }

    fn finish(mut self) -> Vec<Page> {
        self.finish_page();
        self.pages
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Entry point
// ────────────────────────────────────────────────────────────────────────────

/// Lays out `doc` into pages. `doc` is expected to have passed
/// [`DocumentSpec::validate`].
pub fn layout_document(doc: &DocumentSpec, config: &LayoutConfig) -> Layout {
    let mut p = Paginator::new(config, &doc.front.footer);

    p.wrapped(&doc.front.title, config.title_size, Font::Bold, Color::INK);
    p.gap(2.0);
    p.wrapped(&doc.front.subtitle, config.subtitle_size, Font::Regular, Color::MUTED);
    p.gap(6.0);
    p.rule(1.5, Color::ACCENT);
    p.gap(config.section_gap);

    for (index, section) in doc.sections.iter().enumerate() {
        if index > 0 {
            p.gap(config.section_gap);
        }

        // Keep the heading on the same page as the first line below it.
        let heading_lines = wrap_text(
            &section.heading,
            |s| Font::Bold.measure(s, config.heading_size),
            config.content_width(),
        );
        let heading_height = heading_lines.len() as f32 * p.line_height(config.heading_size);
        p.ensure_space(heading_height + p.line_height(config.body_size));
        for line in heading_lines {
            p.text_line(line, config.margin, config.heading_size, Font::Bold, Color::INK);
        }
        p.gap(2.0);

        let (paragraphs, bullets): (&[String], &[String]) = match section.body() {
            SectionBody::Paragraphs(ps) => (ps, &[]),
            SectionBody::Bullets(bs) => (&[], bs),
            SectionBody::Both { paragraphs, bullets } => (paragraphs, bullets),
            SectionBody::Empty => (&[], &[]),
        };

        for paragraph in paragraphs {
            p.wrapped(paragraph, config.body_size, Font::Regular, Color::INK);
            p.gap(config.paragraph_gap);
        }
        for bullet in bullets {
            p.bullet_item(bullet);
            p.gap(config.bullet_gap);
        }
    }

    p.gap(config.section_gap);
    p.rule(0.5, Color::MUTED);
    p.wrapped(&doc.front.closing, config.closing_size, Font::Regular, Color::MUTED);

    Layout {
        page_width: config.page_width,
        page_height: config.page_height,
        pages: p.finish(),
    }
}
