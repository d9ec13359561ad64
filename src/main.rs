use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use disposisi_pdf::{DispositionRecord, SlipDocument};

/// Render a disposition slip from a JSON record, optionally merged with
/// attachment PDFs.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// JSON record file (`{"fields": {...}, "instructions": [...]}`)
    record: PathBuf,

    /// Output PDF path
    #[arg(short, long, default_value = "disposisi.pdf")]
    output: PathBuf,

    /// PDF files appended after the slip page, in order
    #[arg(short, long = "attach")]
    attachments: Vec<PathBuf>,

    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).init();

    match run(&args) {
        Ok(()) => {
            println!("Wrote {}", args.output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let data = std::fs::read_to_string(&args.record)
        .map_err(|e| format!("{}: {e}", args.record.display()))?;
    let value: serde_json::Value = serde_json::from_str(&data)
        .map_err(|e| format!("{}: {e}", args.record.display()))?;
    let record = DispositionRecord::from_value(&value);

    let mut doc = SlipDocument::new(record);
    for attachment in &args.attachments {
        doc = doc.attach(attachment);
    }
    doc.write_to(&args.output)?;
    Ok(())
}
