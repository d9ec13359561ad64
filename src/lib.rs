mod error;
mod fonts;
mod merge;
mod pdf;
mod record;

pub use error::Error;
pub use merge::merge_documents;
pub use record::{DispositionRecord, InstructionRow, coerce_bool, normalize_date};

use std::path::{Path, PathBuf};
use std::time::Instant;

/// Render a disposition slip to PDF bytes.
pub fn render_slip_bytes(record: &DispositionRecord) -> Result<Vec<u8>, Error> {
    pdf::render(record)
}

/// Render a disposition slip and write it to `output`. The file appears
/// atomically: bytes go to a sibling temp file first, then a rename.
pub fn render_slip(record: &DispositionRecord, output: &Path) -> Result<(), Error> {
    let t0 = Instant::now();

    let bytes = pdf::render(record)?;
    let t_render = t0.elapsed();

    write_atomic(output, &bytes)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: render={:.1}ms, write={:.1}ms, total={:.1}ms (output {} bytes)",
        t_render.as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(())
}

fn write_atomic(output: &Path, bytes: &[u8]) -> Result<(), Error> {
    let mut name = output.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    let tmp = output.with_file_name(name);
    std::fs::write(&tmp, bytes).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        Error::Io(e)
    })?;
    std::fs::rename(&tmp, output).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        Error::Io(e)
    })
}

/// A slip plus the letters that travel with it. Renders the slip as page one
/// and appends each attachment's pages in order.
pub struct SlipDocument {
    record: DispositionRecord,
    attachments: Vec<PathBuf>,
}

impl SlipDocument {
    pub fn new(record: DispositionRecord) -> Self {
        SlipDocument {
            record,
            attachments: Vec::new(),
        }
    }

    pub fn attach(mut self, path: impl Into<PathBuf>) -> Self {
        self.attachments.push(path.into());
        self
    }

    /// Write the combined document to `output`. With no attachments this is
    /// just a slip render; otherwise the slip is staged to a temp file and
    /// merged with the attachments. The temp file is removed on every path.
    pub fn write_to(&self, output: &Path) -> Result<(), Error> {
        if self.attachments.is_empty() {
            return render_slip(&self.record, output);
        }

        let mut name = output.file_name().unwrap_or_default().to_os_string();
        name.push(".slip.tmp");
        let slip_path = output.with_file_name(name);

        render_slip(&self.record, &slip_path)?;

        let mut inputs: Vec<&Path> = vec![&slip_path];
        inputs.extend(self.attachments.iter().map(PathBuf::as_path));
        let result = merge_documents(&inputs, output);

        let _ = std::fs::remove_file(&slip_path);
        result
    }
}
