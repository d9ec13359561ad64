use std::path::PathBuf;

use chrono::NaiveDate;
use serde_json::Value;

/// One row of the free-form instruction table: who, what, when.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InstructionRow {
    pub position: String,
    pub instruction: String,
    pub date: String,
}

impl InstructionRow {
    pub fn is_empty(&self) -> bool {
        self.position.trim().is_empty()
            && self.instruction.trim().is_empty()
            && self.date.trim().is_empty()
    }
}

/// The disposition slip record. Immutable for the duration of one render
/// call; missing input fields default to empty/false and never fail a render.
#[derive(Clone, Debug, Default)]
pub struct DispositionRecord {
    // Detail fields (left column)
    pub agenda_no: String,
    pub letter_no: String,
    pub letter_date: String,
    pub subject: String,
    pub sender: String,
    pub addressee: String,

    // Metadata block (right column)
    pub received_date: String,
    pub code: String,
    pub index: String,

    // Classification flags — independent, not mutually exclusive
    pub rahasia: bool,
    pub penting: bool,
    pub segera: bool,

    // Routing-target flags. dir_keu/dir_teknik and gm_keu_adm/gm_ops_pml are
    // rendered as combined either/or checkboxes (see pdf::layout).
    pub dirut: bool,
    pub dir_keu: bool,
    pub dir_teknik: bool,
    pub gm_keu_adm: bool,
    pub gm_ops_pml: bool,
    pub sekper: bool,
    pub ka_spi: bool,
    pub kabag_umum: bool,
    pub kabag_hukum: bool,

    // Action checklist flags
    pub tindak_lanjuti: bool,
    pub proses: bool,
    pub pelajari: bool,
    pub saran: bool,
    pub hadiri: bool,
    pub koordinasikan: bool,
    pub arsip: bool,

    // Free-text lines with a derived checkbox (checked iff non-empty)
    pub discuss_with: String,
    pub forward_to: String,

    pub deadline: String,

    /// Optional PNG placed in the page header. Unreadable files are skipped.
    pub letterhead: Option<PathBuf>,

    pub instructions: Vec<InstructionRow>,
}

impl DispositionRecord {
    /// Build a record from the caller's JSON shape:
    /// `{ "fields": { ... }, "instructions": [ { "posisi", "instruksi", "tanggal" }, ... ] }`.
    /// A bare object is treated as the field map itself.
    pub fn from_value(v: &Value) -> Self {
        let fields = v.get("fields").unwrap_or(v);
        let empty = Vec::new();
        let instructions = v
            .get("instructions")
            .and_then(Value::as_array)
            .unwrap_or(&empty);
        Self::from_fields(fields, instructions)
    }

    pub fn from_fields(fields: &Value, instructions: &[Value]) -> Self {
        let text = |key: &str| -> String {
            match fields.get(key) {
                Some(Value::String(s)) => s.trim().to_string(),
                Some(Value::Number(n)) => n.to_string(),
                _ => String::new(),
            }
        };
        let date = |key: &str| normalize_date(&text(key));
        let flag = |key: &str| fields.get(key).is_some_and(coerce_bool);

        let rows = instructions
            .iter()
            .map(|row| InstructionRow {
                position: row
                    .get("posisi")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .trim()
                    .to_string(),
                instruction: row
                    .get("instruksi")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .trim()
                    .to_string(),
                date: normalize_date(
                    row.get("tanggal").and_then(Value::as_str).unwrap_or_default(),
                ),
            })
            .collect();

        DispositionRecord {
            agenda_no: text("no_agenda"),
            letter_no: text("no_surat"),
            letter_date: date("tgl_surat"),
            subject: text("perihal"),
            sender: text("dari"),
            addressee: text("kepada"),
            received_date: date("tgl_terima"),
            code: text("kode"),
            index: text("indeks"),
            rahasia: flag("rahasia"),
            penting: flag("penting"),
            segera: flag("segera"),
            dirut: flag("dirut"),
            dir_keu: flag("dir_keu"),
            dir_teknik: flag("dir_teknik"),
            gm_keu_adm: flag("gm_keu_adm"),
            gm_ops_pml: flag("gm_ops_pml"),
            sekper: flag("sekper"),
            ka_spi: flag("ka_spi"),
            kabag_umum: flag("kabag_umum"),
            kabag_hukum: flag("kabag_hukum"),
            tindak_lanjuti: flag("tindak_lanjuti"),
            proses: flag("proses"),
            pelajari: flag("pelajari"),
            saran: flag("saran"),
            hadiri: flag("hadiri"),
            koordinasikan: flag("koordinasikan"),
            arsip: flag("arsip"),
            discuss_with: text("bicarakan_dengan"),
            forward_to: text("diteruskan_kepada"),
            deadline: date("batas_waktu"),
            letterhead: {
                let p = text("letterhead");
                if p.is_empty() { None } else { Some(PathBuf::from(p)) }
            },
            instructions: rows,
        }
    }
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y", "%d.%m.%Y", "%Y/%m/%d"];

/// Normalize a date string to `DD-MM-YYYY`. Accepts ISO dates (with an
/// optional time suffix) and common day-first variants. Unparsable input is
/// returned unchanged; empty input stays empty.
pub fn normalize_date(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    let date_part = raw
        .split([' ', 'T'])
        .next()
        .unwrap_or(raw);
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(date_part, fmt) {
            return d.format("%d-%m-%Y").to_string();
        }
    }
    raw.to_string()
}

/// The one boolean coercion rule for flag evaluation. Booleans pass through,
/// numbers are `!= 0`, strings match the truthy set case-insensitively,
/// anything else is false.
pub fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "y" | "on"
        ),
        _ => false,
    }
}
