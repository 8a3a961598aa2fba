//! Dump text parsing and capture configuration.
//!
//! A dump is the line-oriented hex text produced by reading out a card's
//! memory: one line per block, `Block <address>: <hex> <hex> ...`. Byte
//! values are kept as their verbatim two-hex-digit tokens so that later
//! classification can choose a decimal, epoch or ASCII reading on its own.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Nominal block length of the target card family, in bytes.
pub const BLOCK_LEN: usize = 16;

/// Placeholder token for a block absent from one dump. Never a valid hex
/// byte, so alignment always flags it as a difference.
pub const MISSING_BYTE: &str = "??";

/// Errors raised while loading dump sources.
#[derive(Debug, Error)]
pub enum DumpError {
    #[error("could not read dump '{path}': {source}")]
    SourceUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// One dump source paired with its display label (capture date, file name).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capture {
    pub source: PathBuf,
    pub label: String,
}

impl Capture {
    pub fn new(source: impl Into<PathBuf>, label: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            label: label.into(),
        }
    }
}

/// Read a dump source into text. The only fallible step of the pipeline:
/// an unreadable source aborts the whole run before any output.
pub fn read_dump(path: impl AsRef<Path>) -> Result<String, DumpError> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|source| DumpError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })
}

/// One dump parsed into addressable blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDump {
    blocks: HashMap<u32, Vec<String>>,
}

impl ParsedDump {
    /// Parse dump text. Infallible: lines that do not match the block
    /// grammar (headers, blank lines, comments) are skipped. If the same
    /// address occurs twice, the later line wins.
    pub fn parse(text: &str) -> Self {
        let mut blocks = HashMap::new();
        for line in text.lines() {
            if let Some((address, bytes)) = parse_block_line(line) {
                blocks.insert(address, bytes);
            }
        }
        Self { blocks }
    }

    /// Byte tokens of the block at `address`, if present in this dump.
    pub fn block(&self, address: u32) -> Option<&[String]> {
        self.blocks.get(&address).map(Vec::as_slice)
    }

    /// All block addresses present in this dump, in no particular order.
    pub fn addresses(&self) -> impl Iterator<Item = u32> + '_ {
        self.blocks.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// The 16-token placeholder substituted for a block a dump lacks.
pub fn missing_block() -> Vec<String> {
    vec![MISSING_BYTE.to_string(); BLOCK_LEN]
}

/// Match one line against `Block <decimal>: <hex-run>`.
///
/// The byte field is the leading run of hex digits and spaces after the
/// colon-space; anything after that run is ignored, and the run is split
/// on whitespace into verbatim tokens. No token-count validation: short
/// and long lines are stored as-is.
fn parse_block_line(line: &str) -> Option<(u32, Vec<String>)> {
    let rest = line.strip_prefix("Block ")?;
    let colon = rest.find(':')?;
    let (address, tail) = rest.split_at(colon);
    if address.is_empty() || !address.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let address: u32 = address.parse().ok()?;

    let tail = tail.strip_prefix(": ")?;
    let run = tail
        .find(|c: char| !c.is_ascii_hexdigit() && c != ' ')
        .map_or(tail, |end| &tail[..end]);
    if run.is_empty() {
        return None;
    }

    let bytes = run.split_whitespace().map(str::to_string).collect();
    Some((address, bytes))
}
