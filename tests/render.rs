use std::path::PathBuf;

use lopdf::{Document, Object};

use disposisi_pdf::{DispositionRecord, InstructionRow, render_slip, render_slip_bytes};

fn temp_file(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("disposisi-render-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir.join(name)
}

fn as_f32(object: &Object) -> f32 {
    match object {
        Object::Integer(i) => *i as f32,
        Object::Real(r) => *r,
        other => panic!("not a number: {other:?}"),
    }
}

fn sample_record() -> DispositionRecord {
    DispositionRecord {
        agenda_no: "AG-2024-0077".into(),
        letter_no: "007/UM/III/2024".into(),
        letter_date: "04-03-2024".into(),
        subject: "Undangan rapat koordinasi pemeliharaan".into(),
        sender: "Dinas PU".into(),
        addressee: "Direksi".into(),
        received_date: "05-03-2024".into(),
        code: "UM".into(),
        index: "03".into(),
        segera: true,
        dir_teknik: true,
        tindak_lanjuti: true,
        discuss_with: "Kabag Umum".into(),
        deadline: "12-03-2024".into(),
        instructions: vec![
            InstructionRow {
                position: "Kabag Umum".into(),
                instruction: "Siapkan bahan rapat dan undangan internal".into(),
                date: "06-03-2024".into(),
            },
            InstructionRow {
                position: "Sekper".into(),
                instruction: "Agendakan".into(),
                date: String::new(),
            },
        ],
        ..Default::default()
    }
}

#[test]
fn empty_record_is_a_valid_single_page_pdf() {
    let bytes = render_slip_bytes(&DispositionRecord::default()).expect("render");
    let doc = Document::load_mem(&bytes).expect("parse rendered pdf");
    assert_eq!(doc.get_pages().len(), 1);
}

#[test]
fn page_is_a4() {
    let bytes = render_slip_bytes(&sample_record()).expect("render");
    let doc = Document::load_mem(&bytes).expect("parse rendered pdf");
    let (_, page_id) = doc.get_pages().into_iter().next().expect("one page");
    let page = doc
        .get_object(page_id)
        .and_then(Object::as_dict)
        .expect("page dict");
    let media_box = page
        .get(b"MediaBox")
        .and_then(Object::as_array)
        .expect("media box");
    assert!((as_f32(&media_box[2]) - 595.28).abs() < 0.01);
    assert!((as_f32(&media_box[3]) - 841.89).abs() < 0.01);
}

#[test]
fn overflowing_table_still_renders_one_page() {
    let mut record = sample_record();
    let long = "Lakukan telaah menyeluruh atas seluruh dokumen pendukung dan siapkan \
                laporan tertulis beserta lampiran untuk dibahas pada rapat berikutnya "
        .repeat(4);
    record.instructions = (0..12)
        .map(|i| InstructionRow {
            position: format!("Pejabat {i}"),
            instruction: long.clone(),
            date: "01-01-2024".into(),
        })
        .collect();
    let bytes = render_slip_bytes(&record).expect("render");
    let doc = Document::load_mem(&bytes).expect("parse rendered pdf");
    assert_eq!(doc.get_pages().len(), 1);
}

#[test]
fn render_slip_writes_the_output_file() {
    let out = temp_file("slip.pdf");
    render_slip(&sample_record(), &out).expect("render to file");
    let doc = Document::load(&out).expect("load written file");
    assert_eq!(doc.get_pages().len(), 1);
    std::fs::remove_file(&out).ok();
}

#[test]
fn renders_are_deterministic() {
    let record = sample_record();
    let a = render_slip_bytes(&record).expect("render");
    let b = render_slip_bytes(&record).expect("render");
    assert_eq!(a, b);
}
