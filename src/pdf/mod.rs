mod layout;
mod table;

use std::path::Path;

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref};

use crate::error::Error;
use crate::fonts;
use crate::record::DispositionRecord;

use layout::{
    FONT_BOLD, FONT_REGULAR, draw_checkbox, draw_pair_checkbox, show_text, show_text_centered,
    wrap,
};
use table::render_table;

// A4 in points.
const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;
const MARGIN: f32 = 36.0;
const GUTTER: f32 = 16.0;

const BODY_SIZE: f32 = 9.5;
const TITLE_SIZE: f32 = 13.0;
const LABEL_WIDTH: f32 = 72.0;
const FIELD_GAP: f32 = 3.0;
const CHECK_ROW: f32 = 13.5;
const SECTION_GAP: f32 = 8.0;
const LETTERHEAD_MAX_HEIGHT: f32 = 56.0;

/// Running vertical cursor for one logical column. Every section's origin is
/// derived from the measured height of the section above it — there are no
/// static offsets between sections.
struct ColumnCursor {
    x: f32,
    width: f32,
    y: f32,
}

impl ColumnCursor {
    fn advance(&mut self, height: f32) {
        self.y -= height;
    }
}

enum ChecklistEntry {
    Single { label: &'static str, checked: bool },
    Pair {
        first: &'static str,
        second: &'static str,
        first_checked: bool,
        second_checked: bool,
    },
}

/// Seven routing entries; the two director and two GM flags collapse into
/// combined either/or checkboxes.
fn routing_entries(r: &DispositionRecord) -> [ChecklistEntry; 7] {
    [
        ChecklistEntry::Single { label: "Direktur Utama", checked: r.dirut },
        ChecklistEntry::Pair {
            first: "Direktur Keuangan",
            second: "Direktur Teknik",
            first_checked: r.dir_keu,
            second_checked: r.dir_teknik,
        },
        ChecklistEntry::Pair {
            first: "GM Keuangan & Administrasi",
            second: "GM Operasi & Pemeliharaan",
            first_checked: r.gm_keu_adm,
            second_checked: r.gm_ops_pml,
        },
        ChecklistEntry::Single { label: "Sekretaris Perusahaan", checked: r.sekper },
        ChecklistEntry::Single { label: "Kepala SPI", checked: r.ka_spi },
        ChecklistEntry::Single { label: "Kabag Umum & SDM", checked: r.kabag_umum },
        ChecklistEntry::Single { label: "Kabag Hukum", checked: r.kabag_hukum },
    ]
}

fn action_entries(r: &DispositionRecord) -> [ChecklistEntry; 7] {
    [
        ChecklistEntry::Single { label: "Tindak lanjuti", checked: r.tindak_lanjuti },
        ChecklistEntry::Single { label: "Proses sesuai ketentuan", checked: r.proses },
        ChecklistEntry::Single { label: "Pelajari / telaah", checked: r.pelajari },
        ChecklistEntry::Single { label: "Saran / tanggapan", checked: r.saran },
        ChecklistEntry::Single { label: "Hadiri / wakili", checked: r.hadiri },
        ChecklistEntry::Single { label: "Koordinasikan", checked: r.koordinasikan },
        ChecklistEntry::Single { label: "Arsipkan", checked: r.arsip },
    ]
}

/// Draw a `label : value` detail line. The value wraps to the space right of
/// the label column; the cursor advances by the wrapped line count.
fn draw_field(content: &mut Content, cursor: &mut ColumnCursor, label: &str, value: &str) {
    let m = fonts::metrics();
    let line_h = m.line_height(BODY_SIZE);
    let first_baseline = cursor.y - m.ascent(BODY_SIZE);

    show_text(content, cursor.x, first_baseline, label, BODY_SIZE, false);
    let value_x = cursor.x + LABEL_WIDTH;
    show_text(content, value_x - 7.0, first_baseline, ":", BODY_SIZE, false);

    let lines = wrap(value, cursor.width - LABEL_WIDTH, BODY_SIZE, false);
    let mut baseline = first_baseline;
    for line in &lines {
        show_text(content, value_x, baseline, &line.text, BODY_SIZE, false);
        baseline -= line_h;
    }

    cursor.advance(lines.len().max(1) as f32 * line_h + FIELD_GAP);
}

fn draw_checklist(
    content: &mut Content,
    cursor: &mut ColumnCursor,
    title: &str,
    entries: &[ChecklistEntry],
) {
    let m = fonts::metrics();
    show_text(
        content,
        cursor.x,
        cursor.y - m.ascent(BODY_SIZE),
        title,
        BODY_SIZE,
        true,
    );
    cursor.advance(m.line_height(BODY_SIZE) + 2.0);

    for entry in entries {
        match entry {
            ChecklistEntry::Single { label, checked } => {
                draw_checkbox(content, cursor.x, cursor.y, label, *checked, BODY_SIZE, false);
            }
            ChecklistEntry::Pair {
                first,
                second,
                first_checked,
                second_checked,
            } => {
                draw_pair_checkbox(
                    content,
                    cursor.x,
                    cursor.y,
                    first,
                    second,
                    *first_checked,
                    *second_checked,
                    BODY_SIZE,
                );
            }
        }
        cursor.advance(CHECK_ROW);
    }
    cursor.advance(SECTION_GAP);
}

/// Free-text line whose checkbox state is derived from the text itself: the
/// box is checked exactly when the field is non-empty.
fn draw_derived_line(content: &mut Content, cursor: &mut ColumnCursor, label: &str, value: &str) {
    let text = if value.is_empty() {
        label.to_string()
    } else {
        format!("{label} {value}")
    };
    draw_checkbox(content, cursor.x, cursor.y, &text, !value.is_empty(), BODY_SIZE, false);
    cursor.advance(CHECK_ROW);
}

fn draw_deadline_box(content: &mut Content, cursor: &mut ColumnCursor, deadline: &str) {
    let m = fonts::metrics();
    let line_h = m.line_height(BODY_SIZE);
    let height = 2.0 * line_h + 10.0;
    let top = cursor.y;

    content.save_state();
    content.set_line_width(0.75);
    content.rect(cursor.x, top - height, cursor.width, height);
    content.stroke();
    content.restore_state();

    let label_baseline = top - 4.0 - m.ascent(BODY_SIZE);
    show_text(content, cursor.x + 6.0, label_baseline, "Batas Waktu:", BODY_SIZE, true);
    if !deadline.is_empty() {
        show_text_centered(
            content,
            cursor.x + cursor.width / 2.0,
            label_baseline - line_h,
            deadline,
            BODY_SIZE,
            false,
        );
    }
    cursor.advance(height);
}

struct LetterheadImage {
    xobj_ref: Ref,
    width: f32,
    height: f32,
}

/// Embed the letterhead PNG as an image XObject (raw RGB + optional soft
/// mask, both Flate-compressed). Any read or decode problem is logged and the
/// letterhead is skipped — a missing image never fails a render.
fn embed_letterhead(
    pdf: &mut Pdf,
    alloc: &mut impl FnMut() -> Ref,
    path: &Path,
) -> Option<LetterheadImage> {
    let data = match std::fs::read(path) {
        Ok(d) => d,
        Err(e) => {
            log::warn!("letterhead {} not readable: {e} — skipping", path.display());
            return None;
        }
    };
    let cursor = std::io::Cursor::new(&data);
    let reader = image::ImageReader::with_format(
        std::io::BufReader::new(cursor),
        image::ImageFormat::Png,
    );
    let decoded = match reader.decode() {
        Ok(d) => d,
        Err(e) => {
            log::warn!("letterhead {} not decodable: {e} — skipping", path.display());
            return None;
        }
    };

    let rgba: image::RgbaImage = decoded.to_rgba8();
    let (w, h) = (rgba.width(), rgba.height());
    let has_alpha = rgba.pixels().any(|p| p.0[3] < 255);

    let rgb_data: Vec<u8> = rgba.pixels().flat_map(|p| [p.0[0], p.0[1], p.0[2]]).collect();
    let compressed_rgb = miniz_oxide::deflate::compress_to_vec_zlib(&rgb_data, 6);

    let smask_ref = if has_alpha {
        let alpha_data: Vec<u8> = rgba.pixels().map(|p| p.0[3]).collect();
        let compressed_alpha = miniz_oxide::deflate::compress_to_vec_zlib(&alpha_data, 6);
        let mask_ref = alloc();
        let mut mask = pdf.image_xobject(mask_ref, &compressed_alpha);
        mask.filter(Filter::FlateDecode);
        mask.width(w as i32);
        mask.height(h as i32);
        mask.color_space().device_gray();
        mask.bits_per_component(8);
        Some(mask_ref)
    } else {
        None
    };

    let xobj_ref = alloc();
    let mut xobj = pdf.image_xobject(xobj_ref, &compressed_rgb);
    xobj.filter(Filter::FlateDecode);
    xobj.width(w as i32);
    xobj.height(h as i32);
    xobj.color_space().device_rgb();
    xobj.bits_per_component(8);
    if let Some(mask_ref) = smask_ref {
        xobj.s_mask(mask_ref);
    }
    drop(xobj);

    Some(LetterheadImage {
        xobj_ref,
        width: w as f32,
        height: h as f32,
    })
}

/// Render the disposition slip to a single A4 page.
pub(crate) fn render(record: &DispositionRecord) -> Result<Vec<u8>, Error> {
    let m = fonts::metrics();
    let line_h = m.line_height(BODY_SIZE);

    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();
    let page_id = alloc();
    let content_id = alloc();
    let regular_id = alloc();
    let bold_id = alloc();

    pdf.type1_font(regular_id)
        .base_font(Name(b"Helvetica"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
    pdf.type1_font(bold_id)
        .base_font(Name(b"Helvetica-Bold"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));

    let letterhead = record
        .letterhead
        .as_deref()
        .and_then(|p| embed_letterhead(&mut pdf, &mut alloc, p));

    let mut content = Content::new();
    let mut y = PAGE_HEIGHT - MARGIN;

    if let Some(img) = &letterhead {
        let scale = (LETTERHEAD_MAX_HEIGHT / img.height)
            .min((PAGE_WIDTH - 2.0 * MARGIN) / img.width)
            .min(1.0);
        let w = img.width * scale;
        let h = img.height * scale;
        content.save_state();
        content.transform([w, 0.0, 0.0, h, (PAGE_WIDTH - w) / 2.0, y - h]);
        content.x_object(Name(b"Im1"));
        content.restore_state();
        y -= h + 6.0;
    }

    let title_baseline = y - m.ascent(TITLE_SIZE);
    show_text_centered(
        &mut content,
        PAGE_WIDTH / 2.0,
        title_baseline,
        "LEMBAR DISPOSISI",
        TITLE_SIZE,
        true,
    );
    y = title_baseline - 6.0;
    content.save_state();
    content.set_line_width(1.0);
    content.move_to(MARGIN, y);
    content.line_to(PAGE_WIDTH - MARGIN, y);
    content.stroke();
    content.restore_state();
    y -= SECTION_GAP + 2.0;

    let col_w = (PAGE_WIDTH - 2.0 * MARGIN - GUTTER) / 2.0;
    let mut left = ColumnCursor { x: MARGIN, width: col_w, y };
    let mut right = ColumnCursor {
        x: MARGIN + col_w + GUTTER,
        width: col_w,
        y,
    };

    // Left column: detail fields
    let details: [(&str, &str); 6] = [
        ("No. Agenda", &record.agenda_no),
        ("No. Surat", &record.letter_no),
        ("Tgl. Surat", &record.letter_date),
        ("Perihal", &record.subject),
        ("Dari", &record.sender),
        ("Kepada", &record.addressee),
    ];
    for (label, value) in details {
        draw_field(&mut content, &mut left, label, value);
    }
    left.advance(SECTION_GAP);

    // The instruction table in the right column starts level with this
    // section, so remember where it begins.
    let routing_anchor = left.y;

    draw_checklist(
        &mut content,
        &mut left,
        "DITERUSKAN KEPADA:",
        &routing_entries(record),
    );
    draw_checklist(&mut content, &mut left, "HARAP:", &action_entries(record));

    draw_derived_line(
        &mut content,
        &mut left,
        "Dibicarakan dengan:",
        &record.discuss_with,
    );
    draw_derived_line(
        &mut content,
        &mut left,
        "Diteruskan kepada:",
        &record.forward_to,
    );
    left.advance(SECTION_GAP);

    draw_deadline_box(&mut content, &mut left, &record.deadline);

    // Right column: classification + metadata block
    let classifications: [(&str, bool); 3] = [
        ("RAHASIA", record.rahasia),
        ("PENTING", record.penting),
        ("SEGERA", record.segera),
    ];
    for (label, checked) in classifications {
        draw_checkbox(&mut content, right.x, right.y, label, checked, BODY_SIZE, true);
        right.advance(CHECK_ROW);
    }
    right.advance(4.0);

    draw_field(&mut content, &mut right, "Tgl. Terima", &record.received_date);
    draw_field(&mut content, &mut right, "Kode", &record.code);
    draw_field(&mut content, &mut right, "Indeks", &record.index);
    right.advance(SECTION_GAP);

    // Instruction table: label at the routing-checklist line (or below the
    // metadata block if that ran longer), body anchored to the bottom margin.
    let label_top = right.y.min(routing_anchor);
    show_text(
        &mut content,
        right.x,
        label_top - m.ascent(BODY_SIZE),
        "ISI DISPOSISI:",
        BODY_SIZE,
        true,
    );
    let nominal_top = label_top - line_h - 4.0;
    render_table(
        &mut content,
        &record.instructions,
        right.x,
        right.width,
        nominal_top,
        MARGIN,
        BODY_SIZE,
    );

    let raw = content.finish();
    let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&raw, 6);
    pdf.stream(content_id, &compressed).filter(Filter::FlateDecode);

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id).kids([page_id]).count(1);

    {
        let mut page = pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT))
            .parent(pages_id)
            .contents(content_id);
        let mut resources = page.resources();
        {
            let mut font_dict = resources.fonts();
            font_dict.pair(FONT_REGULAR, regular_id);
            font_dict.pair(FONT_BOLD, bold_id);
        }
        if let Some(img) = &letterhead {
            resources.x_objects().pair(Name(b"Im1"), img.xobj_ref);
        }
    }

    Ok(pdf.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::InstructionRow;

    #[test]
    fn empty_record_renders() {
        let bytes = render(&DispositionRecord::default()).expect("render");
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn missing_letterhead_is_not_fatal() {
        let record = DispositionRecord {
            letterhead: Some("/nonexistent/letterhead.png".into()),
            ..Default::default()
        };
        assert!(render(&record).is_ok());
    }

    #[test]
    fn full_record_renders() {
        let record = DispositionRecord {
            agenda_no: "AG-2024-0131".into(),
            letter_no: "021/DIR/II/2024".into(),
            letter_date: "01-02-2024".into(),
            subject: "Permohonan perpanjangan kontrak pemeliharaan jaringan distribusi \
                      wilayah timur untuk periode tahun anggaran berikutnya"
                .into(),
            sender: "PT Mitra Teknik".into(),
            addressee: "Direksi".into(),
            dir_keu: true,
            segera: true,
            discuss_with: "Kabag Hukum".into(),
            deadline: "15-02-2024".into(),
            instructions: vec![
                InstructionRow {
                    position: "Kabag Umum".into(),
                    instruction: "Siapkan telaah dan bahan rapat".into(),
                    date: "05-02-2024".into(),
                },
                InstructionRow {
                    position: "Sekper".into(),
                    instruction: "Agendakan".into(),
                    date: String::new(),
                },
            ],
            ..Default::default()
        };
        let bytes = render(&record).expect("render");
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn checkbox_row_count_is_fixed() {
        let r = DispositionRecord::default();
        assert_eq!(routing_entries(&r).len(), 7);
        assert_eq!(action_entries(&r).len(), 7);
    }
}
