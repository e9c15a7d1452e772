//! Static glyph-width tables for the two standard PDF fonts the documents use.
//!
//! Text is measured in the same WinAnsi code space it is rendered in: every
//! char goes through [`win_ansi_code`] first, then the width is looked up for
//! that code. Widths are the Adobe AFM advance widths in thousandths of an em.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Font enum
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Font {
    /// Helvetica. Body copy, subtitle, footer.
    Regular,
    /// Helvetica-Bold. Title and section headings.
    Bold,
}

impl Font {
    /// PDF base font name.
    pub fn base_font(&self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
        }
    }

    /// Resource name used in page content streams.
    pub fn resource_name(&self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }

    pub fn metrics(&self) -> &'static FontMetricTable {
        match self {
            Font::Regular => &HELVETICA,
            Font::Bold => &HELVETICA_BOLD,
        }
    }

    /// Rendered width of `text` at `size` points.
    pub fn measure(&self, text: &str, size: f32) -> f32 {
        self.metrics().measure(text, size)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Metric table
// ────────────────────────────────────────────────────────────────────────────

pub struct FontMetricTable {
    /// Codes 0x20..=0x7E.
    ascii: [u16; 95],
    /// Codes 0x80..=0xFF. Slots WinAnsi leaves undefined carry the bullet width.
    high: [u16; 128],
}

impl FontMetricTable {
    /// Width in thousandths of an em of one WinAnsi code.
    pub fn code_width(&self, code: u8) -> u16 {
        match code {
            0x20..=0x7E => self.ascii[(code - 0x20) as usize],
            0x80..=0xFF => self.high[(code - 0x80) as usize],
            _ => self.ascii[0],
        }
    }

    /// Width in points of `text` set at `size` points.
    pub fn measure(&self, text: &str, size: f32) -> f32 {
        let units: u32 = text
            .chars()
            .map(|c| self.code_width(win_ansi_code(c)) as u32)
            .sum();
        units as f32 * size / 1000.0
    }
}

/// WinAnsi code for the bullet glyph.
pub const BULLET_CODE: u8 = 0x95;

/// WinAnsi code a char renders as. Typographic punctuation gets its WinAnsi
/// slot, the rest of Latin-1 maps directly, control chars become a space and
/// everything else becomes `?`.
pub fn win_ansi_code(c: char) -> u8 {
    match c {
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => BULLET_CODE,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        c if (c as u32) < 0x20 => b' ',
        c if (c as u32) <= 0x7E => c as u8,
        c if (0xA0..=0xFF).contains(&(c as u32)) => c as u8,
        _ => b'?',
    }
}

static HELVETICA: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    ascii: [
        // sp   !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0    1    2    3    4    5    6    7    8    9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // :    ;    <    =    >    ?    @
        278, 278, 584, 584, 584, 556, 1015,
        // A    B    C    D    E    F    G    H    I    J    K    L    M
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
        // N    O    P    Q    R    S    T    U    V    W    X    Y    Z
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [    \    ]    ^    _    `
        278, 278, 278, 469, 556, 333,
        // a    b    c    d    e    f    g    h    i    j    k    l    m
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
        // n    o    p    q    r    s    t    u    v    w    x    y    z
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
        // {    |    }    ~
        334, 260, 334, 584,
    ],
    #[rustfmt::skip]
    high: [
        // 0x80: Euro, quotesinglbase, florin, quotedblbase, ellipsis, daggers, circumflex, perthousand, Scaron, guilsinglleft, OE, Zcaron
        556, 350, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 350, 611, 350,
        // 0x90: quotes, bullet, dashes, tilde, trademark, scaron, guilsinglright, oe, zcaron, Ydieresis
        350, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 350, 500, 667,
        // 0xA0: nbsp .. macron
        278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
        // 0xB0: degree .. questiondown
        400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
        // 0xC0: Agrave .. Idieresis
        667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
        // 0xD0: Eth .. germandbls
        722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
        // 0xE0: agrave .. idieresis
        556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
        // 0xF0: eth .. ydieresis
        556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
    ],
};

static HELVETICA_BOLD: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    ascii: [
        // sp   !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0    1    2    3    4    5    6    7    8    9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // :    ;    <    =    >    ?    @
        333, 333, 584, 584, 584, 611, 975,
        // A    B    C    D    E    F    G    H    I    J    K    L    M
        722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
        // N    O    P    Q    R    S    T    U    V    W    X    Y    Z
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [    \    ]    ^    _    `
        333, 278, 333, 584, 556, 333,
        // a    b    c    d    e    f    g    h    i    j    k    l    m
        556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
        // n    o    p    q    r    s    t    u    v    w    x    y    z
        611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
        // {    |    }    ~
        389, 280, 389, 584,
    ],
    #[rustfmt::skip]
    high: [
        // 0x80
        556, 350, 278, 556, 500, 1000, 556, 556, 333, 1000, 667, 333, 1000, 350, 611, 350,
        // 0x90
        350, 278, 278, 500, 500, 350, 556, 1000, 333, 1000, 556, 333, 944, 350, 500, 667,
        // 0xA0
        278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333,
        // 0xB0
        400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611,
        // 0xC0
        722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
        // 0xD0
        722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
        // 0xE0
        556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278,
        // 0xF0
        611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556,
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_empty_is_zero() {
        assert_eq!(Font::Regular.measure("", 12.0), 0.0);
    }

    #[test]
    fn test_measure_scales_with_size() {
        // "Hi" = H(722) + i(222) = 944 units
        let at_10 = Font::Regular.measure("Hi", 10.0);
        assert!((at_10 - 9.44).abs() < 1e-4, "got {at_10}");
        assert!((Font::Regular.measure("Hi", 20.0) - 2.0 * at_10).abs() < 1e-4);
    }

    #[test]
    fn test_bold_is_wider_than_regular() {
        let text = "Permit policy receipts";
        assert!(Font::Bold.measure(text, 12.0) > Font::Regular.measure(text, 12.0));
    }

    #[test]
    fn test_typographic_glyphs_use_their_rendered_widths() {
        assert!((Font::Regular.measure("\u{2014}", 1000.0) - 1000.0).abs() < 1e-3);
        assert!((Font::Regular.measure("\u{2022}", 1000.0) - 350.0).abs() < 1e-3);
        assert!((Font::Regular.measure("\u{2019}", 1000.0) - 222.0).abs() < 1e-3);
        assert!((Font::Bold.measure("\u{201C}", 1000.0) - 500.0).abs() < 1e-3);
        assert!((Font::Regular.measure("\u{e9}", 1000.0) - 556.0).abs() < 1e-3);
        assert!((Font::Regular.measure("\u{c6}", 1000.0) - 1000.0).abs() < 1e-3);
    }

    #[test]
    fn test_unmappable_chars_measure_as_question_mark() {
        let q = Font::Regular.measure("?", 12.0);
        assert!((Font::Regular.measure("\u{4e2d}", 12.0) - q).abs() < 1e-4);
    }

    #[test]
    fn test_win_ansi_codes() {
        assert_eq!(win_ansi_code('A'), b'A');
        assert_eq!(win_ansi_code('\u{2014}'), 0x97);
        assert_eq!(win_ansi_code('\u{2022}'), BULLET_CODE);
        assert_eq!(win_ansi_code('\t'), b' ');
        assert_eq!(win_ansi_code('\u{7f}'), b'?');
    }

    #[test]
    fn test_resource_names_are_distinct() {
        assert_ne!(Font::Regular.resource_name(), Font::Bold.resource_name());
        assert_eq!(Font::Bold.base_font(), "Helvetica-Bold");
    }
}
