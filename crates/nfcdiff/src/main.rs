//! nfcdiff: Compare successive NFC badge dumps.
//!
//! Takes N dump files in capture order, aligns their blocks and reports
//! every byte that changed between uses, with counter and timestamp
//! heuristics applied to each change.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use nd_compare::analyze;
use nd_core::Capture;

#[derive(Parser)]
#[command(name = "nfcdiff", version, about = "Diff successive NFC badge dumps")]
struct Args {
    /// Dump files in capture order (oldest first).
    #[arg(required = true, num_args = 2..)]
    dumps: Vec<PathBuf>,

    /// Capture date/label, one per dump, in the same order.
    /// Defaults to the file names.
    #[arg(long = "date", value_name = "LABEL")]
    dates: Vec<String>,

    /// Emit the report as JSON instead of text.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("nfcdiff: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), String> {
    let captures = captures_from(args)?;
    let report = analyze(&captures).map_err(|e| e.to_string())?;

    if args.json {
        println!("{}", report.to_json());
    } else {
        report.print();
    }
    Ok(())
}

fn captures_from(args: &Args) -> Result<Vec<Capture>, String> {
    if !args.dates.is_empty() && args.dates.len() != args.dumps.len() {
        return Err(format!(
            "expected {} --date values (one per dump), got {}",
            args.dumps.len(),
            args.dates.len()
        ));
    }

    Ok(args
        .dumps
        .iter()
        .enumerate()
        .map(|(i, path)| {
            let label = args
                .dates
                .get(i)
                .cloned()
                .unwrap_or_else(|| path.display().to_string());
            Capture::new(path, label)
        })
        .collect())
}
