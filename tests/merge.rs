use std::path::{Path, PathBuf};

use lopdf::Document;

use disposisi_pdf::{DispositionRecord, SlipDocument, merge_documents, render_slip};

fn temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("disposisi-merge-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn write_slip(dir: &Path, name: &str, subject: &str) -> PathBuf {
    let record = DispositionRecord {
        subject: subject.into(),
        ..Default::default()
    };
    let path = dir.join(name);
    render_slip(&record, &path).expect("render slip");
    path
}

#[test]
fn merged_page_count_is_the_sum_of_inputs() {
    let dir = temp_dir();
    let a = write_slip(&dir, "a.pdf", "Surat pertama");
    let b = write_slip(&dir, "b.pdf", "Surat kedua");
    let c = write_slip(&dir, "c.pdf", "Surat ketiga");
    let out = dir.join("merged.pdf");

    merge_documents(&[&a, &b, &c], &out).expect("merge");
    let doc = Document::load(&out).expect("load merged");
    assert_eq!(doc.get_pages().len(), 3);

    for p in [a, b, c, out] {
        std::fs::remove_file(p).ok();
    }
}

#[test]
fn single_input_merge_round_trips() {
    let dir = temp_dir();
    let a = write_slip(&dir, "single.pdf", "Satu saja");
    let out = dir.join("single-merged.pdf");

    merge_documents(&[&a], &out).expect("merge");
    let doc = Document::load(&out).expect("load merged");
    assert_eq!(doc.get_pages().len(), 1);

    std::fs::remove_file(a).ok();
    std::fs::remove_file(out).ok();
}

#[test]
fn failed_merge_leaves_no_output() {
    let dir = temp_dir();
    let a = write_slip(&dir, "ok.pdf", "Ada");
    let missing = dir.join("does-not-exist.pdf");
    let out = dir.join("never-written.pdf");

    assert!(merge_documents(&[&a, &missing], &out).is_err());
    assert!(!out.exists());

    std::fs::remove_file(a).ok();
}

#[test]
fn slip_document_appends_attachments_after_the_slip() {
    let dir = temp_dir();
    let attachment = write_slip(&dir, "letter.pdf", "Surat masuk");
    let out = dir.join("bundle.pdf");

    let record = DispositionRecord {
        subject: "Disposisi untuk surat masuk".into(),
        ..Default::default()
    };
    SlipDocument::new(record)
        .attach(&attachment)
        .write_to(&out)
        .expect("write bundle");

    let doc = Document::load(&out).expect("load bundle");
    assert_eq!(doc.get_pages().len(), 2);
    // the staging temp file must be gone
    assert!(!dir.join("bundle.pdf.slip.tmp").exists());

    std::fs::remove_file(attachment).ok();
    std::fs::remove_file(out).ok();
}

#[test]
fn slip_document_missing_attachment_is_an_error() {
    let dir = temp_dir();
    let out = dir.join("broken-bundle.pdf");

    let result = SlipDocument::new(DispositionRecord::default())
        .attach(dir.join("missing-letter.pdf"))
        .write_to(&out);

    assert!(result.is_err());
    assert!(!out.exists());
    assert!(!dir.join("broken-bundle.pdf.slip.tmp").exists());
}
