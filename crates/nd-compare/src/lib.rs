//! nd-compare: Comparison engine for successive NFC badge dumps.
//!
//! Aligns blocks of the same address across N captures, detects byte-level
//! divergence, classifies each change (counter progression, Unix timestamp,
//! or neither) and renders a report.

pub mod classify;
pub mod diff;
pub mod report;

use nd_core::{Capture, DumpError, ParsedDump, read_dump};

use crate::report::DiffReport;

/// Run the whole pipeline over an ordered capture list.
///
/// All sources are read eagerly before alignment begins; the first
/// unreadable source aborts the run, so a report is either complete or
/// absent. Parsing, alignment and classification never fail.
pub fn analyze(captures: &[Capture]) -> Result<DiffReport, DumpError> {
    let mut dumps = Vec::with_capacity(captures.len());
    for capture in captures {
        let text = read_dump(&capture.source)?;
        dumps.push(ParsedDump::parse(&text));
    }

    let differences = diff::align(&dumps);
    let labels: Vec<String> = captures.iter().map(|c| c.label.clone()).collect();
    Ok(DiffReport::build(labels, &differences))
}
