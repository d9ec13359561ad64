use pdf_writer::{Content, Name, Str};

use crate::fonts::{self, to_winansi_bytes};

pub(crate) const FONT_REGULAR: Name<'static> = Name(b"F1");
pub(crate) const FONT_BOLD: Name<'static> = Name(b"F2");

/// Checkbox square side and the gap between square and label, in points.
pub(crate) const CHECKBOX: f32 = 9.0;
pub(crate) const LABEL_GAP: f32 = 5.0;

pub(crate) struct Line {
    pub(crate) text: String,
    pub(crate) width: f32,
}

/// Greedy word wrap against the measured metric table. Words accumulate while
/// the line fits; a single word wider than `max_width` stands alone on its
/// own line (no character splitting). Empty input yields no lines.
pub(crate) fn wrap(text: &str, max_width: f32, font_size: f32, bold: bool) -> Vec<Line> {
    let m = fonts::metrics();
    let space_w = m.space_width(font_size, bold);

    let mut lines: Vec<Line> = Vec::new();
    let mut current = String::new();
    let mut current_w = 0.0f32;

    for word in text.split_whitespace() {
        let ww = m.text_width(word, font_size, bold);
        if current.is_empty() {
            current.push_str(word);
            current_w = ww;
        } else if current_w + space_w + ww <= max_width {
            current.push(' ');
            current.push_str(word);
            current_w += space_w + ww;
        } else {
            lines.push(Line {
                text: std::mem::take(&mut current),
                width: current_w,
            });
            current.push_str(word);
            current_w = ww;
        }
    }
    if !current.is_empty() {
        lines.push(Line {
            text: current,
            width: current_w,
        });
    }
    lines
}

pub(crate) fn show_text(
    content: &mut Content,
    x: f32,
    baseline: f32,
    text: &str,
    font_size: f32,
    bold: bool,
) {
    let font = if bold { FONT_BOLD } else { FONT_REGULAR };
    content
        .begin_text()
        .set_font(font, font_size)
        .next_line(x, baseline)
        .show(Str(&to_winansi_bytes(text)))
        .end_text();
}

pub(crate) fn show_text_centered(
    content: &mut Content,
    center_x: f32,
    baseline: f32,
    text: &str,
    font_size: f32,
    bold: bool,
) {
    let w = fonts::metrics().text_width(text, font_size, bold);
    show_text(content, center_x - w / 2.0, baseline, text, font_size, bold);
}

/// Draw a fixed-size checkbox with its label. The square's top edge sits at
/// `top`; the label baseline is aligned to the square's vertical center.
pub(crate) fn draw_checkbox(
    content: &mut Content,
    x: f32,
    top: f32,
    label: &str,
    checked: bool,
    font_size: f32,
    bold: bool,
) {
    let bottom = top - CHECKBOX;
    content.save_state();
    content.set_line_width(0.75);
    content.rect(x, bottom, CHECKBOX, CHECKBOX);
    content.stroke();
    if checked {
        content.set_line_width(1.0);
        content.move_to(x + 0.18 * CHECKBOX, bottom + 0.52 * CHECKBOX);
        content.line_to(x + 0.42 * CHECKBOX, bottom + 0.2 * CHECKBOX);
        content.line_to(x + 0.84 * CHECKBOX, bottom + 0.8 * CHECKBOX);
        content.stroke();
    }
    content.restore_state();

    show_text(
        content,
        x + CHECKBOX + LABEL_GAP,
        top - CHECKBOX / 2.0,
        label,
        font_size,
        bold,
    );
}

const PAIR_SEPARATOR: &str = " / ";

/// A combined either/or label and the horizontal spans its two halves occupy.
pub(crate) struct PairLabel {
    pub(crate) text: String,
    pub(crate) first_span: (f32, f32),
    pub(crate) second_span: (f32, f32),
}

pub(crate) fn pair_label(
    label_x: f32,
    first: &str,
    second: &str,
    font_size: f32,
    bold: bool,
) -> PairLabel {
    let m = fonts::metrics();
    let w_first = m.text_width(first, font_size, bold);
    let w_sep = m.text_width(PAIR_SEPARATOR, font_size, bold);
    let w_second = m.text_width(second, font_size, bold);
    let second_x = label_x + w_first + w_sep;
    PairLabel {
        text: format!("{first}{PAIR_SEPARATOR}{second}"),
        first_span: (label_x, label_x + w_first),
        second_span: (second_x, second_x + w_second),
    }
}

/// The mutually-exclusive pair rule: when exactly one flag is set, the other
/// (false) label gets struck through. Both or neither set means no strike —
/// the pair is a paper-form display convention, not a data constraint.
pub(crate) fn strike_span(
    first_checked: bool,
    second_checked: bool,
    label: &PairLabel,
) -> Option<(f32, f32)> {
    match (first_checked, second_checked) {
        (true, false) => Some(label.second_span),
        (false, true) => Some(label.first_span),
        _ => None,
    }
}

/// Draw the combined checkbox for a mutually-exclusive display pair. The box
/// is checked when either flag is set.
pub(crate) fn draw_pair_checkbox(
    content: &mut Content,
    x: f32,
    top: f32,
    first: &str,
    second: &str,
    first_checked: bool,
    second_checked: bool,
    font_size: f32,
) {
    let label = pair_label(x + CHECKBOX + LABEL_GAP, first, second, font_size, false);
    draw_checkbox(
        content,
        x,
        top,
        &label.text,
        first_checked || second_checked,
        font_size,
        false,
    );
    if let Some((x1, x2)) = strike_span(first_checked, second_checked, &label) {
        let baseline = top - CHECKBOX / 2.0;
        let y = baseline + font_size * 0.3;
        let thickness = (font_size * 0.05).max(0.5);
        content.rect(x1, y, x2 - x1, thickness).fill_nonzero();
    }
}
