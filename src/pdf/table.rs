use pdf_writer::Content;

use crate::fonts;
use crate::record::InstructionRow;

use super::layout::{Line, show_text, wrap};

/// Fixed column proportions: position, instruction, date.
const COL_RATIOS: [f32; 3] = [0.20, 0.55, 0.25];
const CELL_PADDING: f32 = 4.0;
const BORDER_WIDTH: f32 = 0.75;

pub(crate) struct RowBand {
    pub(crate) top: f32,
    pub(crate) height: f32,
    cells: [Vec<Line>; 3],
}

pub(crate) struct TableLayout {
    /// Actual top edge. Equals the nominal top unless wrapped content pushed
    /// the table upward past it (single-page trade-off, no pagination).
    pub(crate) top: f32,
    pub(crate) bottom: f32,
    pub(crate) nominal_top: f32,
    pub(crate) col_widths: [f32; 3],
    pub(crate) bands: Vec<RowBand>,
    /// Every row fully empty: draw one un-subdivided rectangle over the
    /// nominal area instead of an empty grid.
    pub(crate) blank: bool,
}

/// Lay out the instruction table between `nominal_top` and `bottom`. Row
/// heights are uniform shares of the nominal span, except that a row whose
/// instruction text wraps beyond its share grows and pushes the rest — the
/// table then extends upward beyond `nominal_top` rather than shrinking rows.
pub(crate) fn layout_table(
    rows: &[InstructionRow],
    width: f32,
    nominal_top: f32,
    bottom: f32,
    font_size: f32,
) -> TableLayout {
    let col_widths = [
        width * COL_RATIOS[0],
        width * COL_RATIOS[1],
        width * COL_RATIOS[2],
    ];

    if rows.iter().all(InstructionRow::is_empty) {
        return TableLayout {
            top: nominal_top,
            bottom,
            nominal_top,
            col_widths,
            bands: Vec::new(),
            blank: true,
        };
    }

    let m = fonts::metrics();
    let line_h = m.line_height(font_size);
    let row_count = rows.len().max(1);
    let nominal_span = (nominal_top - bottom).max(0.0);
    let min_uniform = nominal_span / row_count as f32;

    let mut bands: Vec<RowBand> = rows
        .iter()
        .map(|row| {
            let cells = [
                wrap(&row.position, col_widths[0] - 2.0 * CELL_PADDING, font_size, false),
                wrap(&row.instruction, col_widths[1] - 2.0 * CELL_PADDING, font_size, false),
                wrap(&row.date, col_widths[2] - 2.0 * CELL_PADDING, font_size, false),
            ];
            let line_count = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);
            let natural = line_count as f32 * line_h + 2.0 * CELL_PADDING;
            RowBand {
                top: 0.0, // assigned below once the total height is known
                height: natural.max(min_uniform),
                cells,
            }
        })
        .collect();

    let total: f32 = bands.iter().map(|b| b.height).sum();
    let top = bottom + total;

    let mut y = top;
    for band in &mut bands {
        band.top = y;
        y -= band.height;
    }

    TableLayout {
        top,
        bottom,
        nominal_top,
        col_widths,
        bands,
        blank: false,
    }
}

/// Render the instruction table. Cell text is centered both ways; each row
/// band is outlined per cell so adjacent rows share a single border line.
pub(crate) fn render_table(
    content: &mut Content,
    rows: &[InstructionRow],
    x: f32,
    width: f32,
    nominal_top: f32,
    bottom: f32,
    font_size: f32,
) {
    let layout = layout_table(rows, width, nominal_top, bottom, font_size);

    content.save_state();
    content.set_line_width(BORDER_WIDTH);

    if layout.blank {
        content.rect(x, layout.bottom, width, layout.nominal_top - layout.bottom);
        content.stroke();
        content.restore_state();
        return;
    }

    let m = fonts::metrics();
    let line_h = m.line_height(font_size);
    let ascent = m.ascent(font_size);

    for band in &layout.bands {
        let mut cell_x = x;
        for (col, lines) in band.cells.iter().enumerate() {
            let col_w = layout.col_widths[col];
            content.rect(cell_x, band.top - band.height, col_w, band.height);
            content.stroke();

            let content_h = lines.len() as f32 * line_h;
            let offset = ((band.height - content_h) / 2.0).max(0.0);
            let mut baseline = band.top - offset - ascent;
            for line in lines {
                let text_x = cell_x + (col_w - line.width) / 2.0;
                show_text(content, text_x, baseline, &line.text, font_size, false);
                baseline -= line_h;
            }
            cell_x += col_w;
        }
    }

    content.restore_state();
}

#[cfg(test)]
mod tests {
    use super::*;

    const FS: f32 = 9.5;
    const WIDTH: f32 = 250.0;
    const TOP: f32 = 600.0;
    const BOTTOM: f32 = 36.0;

    fn row(position: &str, instruction: &str, date: &str) -> InstructionRow {
        InstructionRow {
            position: position.into(),
            instruction: instruction.into(),
            date: date.into(),
        }
    }

    #[test]
    fn empty_rows_collapse_to_blank_rectangle() {
        for rows in [vec![], vec![row("", "", ""), row("", "", "")]] {
            let layout = layout_table(&rows, WIDTH, TOP, BOTTOM, FS);
            assert!(layout.blank);
            assert!(layout.bands.is_empty());
            assert_eq!(layout.top, TOP);
        }
    }

    #[test]
    fn row_count_matches_input() {
        let rows = vec![
            row("Kabag Umum", "Siapkan ruangan", "01-02-2024"),
            row("Sekper", "Umumkan", ""),
            row("", "Arsipkan", ""),
        ];
        let layout = layout_table(&rows, WIDTH, TOP, BOTTOM, FS);
        assert!(!layout.blank);
        assert_eq!(layout.bands.len(), 3);
    }

    #[test]
    fn few_rows_fill_the_nominal_span() {
        let rows = vec![row("A", "satu", ""), row("B", "dua", "")];
        let layout = layout_table(&rows, WIDTH, TOP, BOTTOM, FS);
        let span = TOP - BOTTOM;
        for band in &layout.bands {
            assert!((band.height - span / 2.0).abs() < 0.001);
        }
        assert!((layout.top - TOP).abs() < 0.001);
    }

    #[test]
    fn bands_are_contiguous() {
        let long = "perintah yang cukup panjang sehingga membutuhkan beberapa baris \
                    teks untuk menuliskannya secara lengkap di kolom instruksi";
        let rows = vec![
            row("A", long, "01-01-2024"),
            row("B", "singkat", ""),
            row("C", long, ""),
        ];
        let layout = layout_table(&rows, WIDTH, TOP, BOTTOM, FS);
        for pair in layout.bands.windows(2) {
            let gap = (pair[0].top - pair[0].height) - pair[1].top;
            assert!(gap.abs() < 0.001, "row boundary gap {gap}");
        }
        let last = layout.bands.last().unwrap();
        assert!((last.top - last.height - BOTTOM).abs() < 0.001);
    }

    #[test]
    fn longer_instruction_grows_its_row() {
        let rows_short = vec![row("A", "singkat", ""); 6];
        let mut rows_long = rows_short.clone();
        rows_long[2].instruction = "instruksi yang jauh lebih panjang dan terperinci sehingga \
                                    pasti terbungkus menjadi beberapa baris di dalam kolom"
            .into();

        let short = layout_table(&rows_short, WIDTH, TOP, BOTTOM, FS);
        let long = layout_table(&rows_long, WIDTH, TOP, BOTTOM, FS);        assert!(long.bands[2].height > short.bands[2].height);
        // rows after the grown one keep their height and shift without overlap
        assert!((long.bands[3].height - short.bands[3].height).abs() < 0.001);
        assert!(
            (long.bands[3].top - (long.bands[2].top - long.bands[2].height)).abs() < 0.001
        );
    }

    #[test]
    fn overflow_extends_upward_not_down() {
        let long = "kalimat instruksi yang sangat panjang dan berulang ".repeat(12);
        let rows: Vec<InstructionRow> = (0..10).map(|_| row("A", &long, "x")).collect();
        let layout = layout_table(&rows, WIDTH, 200.0, BOTTOM, FS);
        assert!(layout.top > layout.nominal_top);
        assert!((layout.bands.last().unwrap().top - layout.bands.last().unwrap().height
            - BOTTOM)
            .abs()
            < 0.001);
    }

    #[test]
    fn column_proportions_are_fixed() {
        let layout = layout_table(&[row("a", "b", "c")], WIDTH, TOP, BOTTOM, FS);
        assert!((layout.col_widths[0] - WIDTH * 0.20).abs() < 0.001);
        assert!((layout.col_widths[1] - WIDTH * 0.55).abs() < 0.001);
        assert!((layout.col_widths[2] - WIDTH * 0.25).abs() < 0.001);
    }
}
