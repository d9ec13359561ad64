use std::path::Path;
use std::sync::OnceLock;

use memmap2::Mmap;
use ttf_parser::Face;

/// Read-only font metric table, built once per process. Layout measures
/// against these widths; the PDF itself always references the base-14
/// Helvetica faces with WinAnsiEncoding, so nothing is embedded.
pub(crate) struct FontMetrics {
    regular_1000: Vec<f32>, // WinAnsi bytes 32..=255, advance at 1000 units/em
    bold_1000: Vec<f32>,
    pub(crate) line_h_ratio: f32,
    pub(crate) ascender_ratio: f32,
}

static METRICS: OnceLock<FontMetrics> = OnceLock::new();

pub(crate) fn metrics() -> &'static FontMetrics {
    METRICS.get_or_init(load_metrics)
}

fn load_metrics() -> FontMetrics {
    // DISPOSISI_FONT may point at a TTF/OTF whose advance widths replace the
    // built-in Helvetica approximation. Only measurement changes; the page
    // still renders with the base-14 fonts.
    if let Ok(path) = std::env::var("DISPOSISI_FONT") {
        match face_metrics(Path::new(&path)) {
            Some(m) => return m,
            None => {
                log::warn!("cannot read font metrics from {path} — using built-in table")
            }
        }
    }
    FontMetrics {
        regular_1000: helvetica_widths(false),
        bold_1000: helvetica_widths(true),
        line_h_ratio: 1.2,
        ascender_ratio: 0.75,
    }
}

fn face_metrics(path: &Path) -> Option<FontMetrics> {
    let file = std::fs::File::open(path).ok()?;
    let data = unsafe { Mmap::map(&file) }.ok()?;
    let face = Face::parse(&data, 0).ok()?;
    let units = face.units_per_em() as f32;

    let widths: Vec<f32> = (32u8..=255u8)
        .map(|byte| {
            face.glyph_index(winansi_to_char(byte))
                .and_then(|gid| face.glyph_hor_advance(gid))
                .map(|adv| adv as f32 / units * 1000.0)
                .unwrap_or(0.0)
        })
        .collect();

    let line_gap = face.line_gap() as f32;
    let line_h_ratio = (face.ascender() as f32 - face.descender() as f32 + line_gap) / units;
    let ascender_ratio = face.ascender() as f32 / units;

    // Bold runs are short labels only; a flat widening of the regular
    // advances is close enough for wrapping decisions.
    let bold: Vec<f32> = widths.iter().map(|w| w * 1.05).collect();

    Some(FontMetrics {
        regular_1000: widths,
        bold_1000: bold,
        line_h_ratio,
        ascender_ratio,
    })
}

impl FontMetrics {
    fn widths(&self, bold: bool) -> &[f32] {
        if bold { &self.bold_1000 } else { &self.regular_1000 }
    }

    pub(crate) fn char_width_1000(&self, ch: char, bold: bool) -> f32 {
        let byte = char_to_winansi(ch);
        if byte >= 32 {
            self.widths(bold)[(byte - 32) as usize]
        } else {
            0.0
        }
    }

    pub(crate) fn text_width(&self, text: &str, font_size: f32, bold: bool) -> f32 {
        text.chars()
            .map(|ch| self.char_width_1000(ch, bold) * font_size / 1000.0)
            .sum()
    }

    pub(crate) fn space_width(&self, font_size: f32, bold: bool) -> f32 {
        self.char_width_1000(' ', bold) * font_size / 1000.0
    }

    pub(crate) fn line_height(&self, font_size: f32) -> f32 {
        font_size * self.line_h_ratio
    }

    pub(crate) fn ascent(&self, font_size: f32) -> f32 {
        font_size * self.ascender_ratio
    }
}

/// Windows-1252 byte to Unicode char. Bytes 0x80-0x9F are remapped; the rest
/// map directly to their codepoint.
fn winansi_to_char(byte: u8) -> char {
    match byte {
        0x80 => '\u{20AC}',
        0x82 => '\u{201A}',
        0x83 => '\u{0192}',
        0x84 => '\u{201E}',
        0x85 => '\u{2026}',
        0x86 => '\u{2020}',
        0x87 => '\u{2021}',
        0x88 => '\u{02C6}',
        0x89 => '\u{2030}',
        0x8A => '\u{0160}',
        0x8B => '\u{2039}',
        0x8C => '\u{0152}',
        0x8E => '\u{017D}',
        0x91 => '\u{2018}',
        0x92 => '\u{2019}',
        0x93 => '\u{201C}',
        0x94 => '\u{201D}',
        0x95 => '\u{2022}',
        0x96 => '\u{2013}',
        0x97 => '\u{2014}',
        0x98 => '\u{02DC}',
        0x99 => '\u{2122}',
        0x9A => '\u{0161}',
        0x9B => '\u{203A}',
        0x9C => '\u{0153}',
        0x9E => '\u{017E}',
        0x9F => '\u{0178}',
        _ => byte as char,
    }
}

/// Unicode char to its WinAnsi byte, or 0 if unmappable.
fn char_to_winansi(c: char) -> u8 {
    match c as u32 {
        0x0020..=0x007F => c as u8,
        0x00A0..=0x00FF => c as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95,
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => 0,
    }
}

/// Convert UTF-8 text to WinAnsi bytes for PDF string operands. Unmappable
/// chars are dropped rather than substituted.
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .filter_map(|c| {
            let b = char_to_winansi(c);
            (b >= 32).then_some(b)
        })
        .collect()
}

/// Approximate Helvetica / Helvetica-Bold advances at 1000 units/em for
/// WinAnsi bytes 32..=255.
fn helvetica_widths(bold: bool) -> Vec<f32> {
    (32u8..=255u8)
        .map(|b| match b {
            32 => 278.0,                                            // space
            33..=47 => if bold { 389.0 } else { 333.0 },            // punctuation
            48..=57 => 556.0,                                       // digits
            58..=64 => if bold { 389.0 } else { 333.0 },
            73 | 74 => 278.0,                                       // I J
            77 => if bold { 889.0 } else { 833.0 },                 // M
            65..=90 => if bold { 722.0 } else { 667.0 },            // uppercase average
            91..=96 => 333.0,
            102 | 105 | 106 | 108 | 116 => if bold { 333.0 } else { 278.0 },
            109 | 119 => if bold { 889.0 } else { 833.0 },          // m w
            97..=122 => if bold { 611.0 } else { 556.0 },           // lowercase average
            _ => 556.0,
        })
        .collect()
}
