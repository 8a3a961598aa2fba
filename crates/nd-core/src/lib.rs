//! nd-core: Data model for NFC badge dump analysis.
//!
//! This crate contains the dump text parser, the block/sector addressing
//! of the Mifare Classic 1K layout, and the capture configuration handed
//! to the comparison pipeline. It has no comparison logic of its own.

pub mod dump;
pub mod sector;

pub use dump::{Capture, DumpError, ParsedDump, missing_block, read_dump, BLOCK_LEN, MISSING_BYTE};
pub use sector::{offset_in_sector, sector_of};
