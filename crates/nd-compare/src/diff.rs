//! Block alignment and byte-level difference detection.
//!
//! Two explicit phases: [`align`] is the cheap existence check that flags a
//! block on its first differing byte, [`byte_changes`] is the full
//! enumeration run later for every flagged block. Keeping them separate
//! keeps both independently testable.

use std::collections::HashSet;

use nd_core::{missing_block, sector_of, ParsedDump};
use serde::{Deserialize, Serialize};

/// One block address whose contents disagree across dumps.
///
/// `byte_index` is only the first position found to differ; the complete
/// set of differing positions comes from [`byte_changes`] on `blocks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Difference {
    pub sector: u32,
    pub block: u32,
    pub byte_index: usize,
    /// Byte tokens of this block in every dump, in dump order. A dump
    /// lacking the block contributes the 16-token placeholder.
    pub blocks: Vec<Vec<String>>,
}

/// One byte position and its value across all dumps, in dump order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ByteChange {
    pub position: usize,
    pub values: Vec<String>,
}

/// Compare N parsed dumps over the union of their block addresses.
///
/// Returns at most one [`Difference`] per address. The union is built
/// from a hash set, so the result order is unspecified; consumers must
/// not rely on it.
pub fn align(dumps: &[ParsedDump]) -> Vec<Difference> {
    let addresses: HashSet<u32> = dumps.iter().flat_map(ParsedDump::addresses).collect();

    let mut differences = Vec::new();
    for address in addresses {
        let blocks: Vec<Vec<String>> = dumps
            .iter()
            .map(|d| d.block(address).map_or_else(missing_block, <[_]>::to_vec))
            .collect();

        if let Some(byte_index) = first_divergence(&blocks) {
            differences.push(Difference {
                sector: sector_of(address),
                block: address,
                byte_index,
                blocks,
            });
        }
    }
    differences
}

/// Enumerate every byte position where the given per-dump blocks disagree.
pub fn byte_changes(blocks: &[Vec<String>]) -> Vec<ByteChange> {
    let mut changes = Vec::new();
    for position in 0..shortest(blocks) {
        let values: Vec<String> = blocks.iter().map(|b| b[position].clone()).collect();
        if !all_equal(&values) {
            changes.push(ByteChange { position, values });
        }
    }
    changes
}

/// First byte position with more than one distinct value, if any.
fn first_divergence(blocks: &[Vec<String>]) -> Option<usize> {
    (0..shortest(blocks)).find(|&position| {
        let mut values = blocks.iter().map(|b| &b[position]);
        let first = values.next();
        values.any(|v| Some(v) != first)
    })
}

/// Positional comparison runs up to the shortest sequence, like a zip;
/// a truncated dump line limits the comparable range for its block.
fn shortest(blocks: &[Vec<String>]) -> usize {
    blocks.iter().map(Vec::len).min().unwrap_or(0)
}

fn all_equal(values: &[String]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use nd_core::{BLOCK_LEN, MISSING_BYTE};
    use proptest::prelude::*;

    fn dump(lines: &str) -> ParsedDump {
        ParsedDump::parse(lines)
    }

    #[test]
    fn test_identical_blocks_never_reported() {
        let text = "Block 4: 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00\n";
        let dumps: Vec<_> = (0..6).map(|_| dump(text)).collect();
        assert!(align(&dumps).is_empty());
    }

    #[test]
    fn test_first_divergence_short_circuits() {
        let a = dump("Block 5: 00 00 00 01 00 00 00 00 00 01 00\n");
        let b = dump("Block 5: 00 00 00 02 00 00 00 00 00 02 00\n");
        let diffs = align(&[a, b]);
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].block, 5);
        assert_eq!(diffs[0].sector, 1);
        assert_eq!(diffs[0].byte_index, 3);
    }

    #[test]
    fn test_byte_changes_enumerates_all_positions() {
        let a = dump("Block 5: 00 00 00 01 00 00 00 00 00 01 00\n");
        let b = dump("Block 5: 00 00 00 02 00 00 00 00 00 02 00\n");
        let diffs = align(&[a, b]);
        let changes = byte_changes(&diffs[0].blocks);
        let positions: Vec<usize> = changes.iter().map(|c| c.position).collect();
        assert_eq!(positions, [3, 9]);
        assert_eq!(changes[0].values, ["01", "02"].map(String::from));
    }

    #[test]
    fn test_missing_block_substitutes_sentinel() {
        let with = dump("Block 9: 00 11 22\n");
        let without = dump("Block 1: aa bb cc\n");
        let diffs = align(&[with.clone(), without, with]);

        let nine = diffs.iter().find(|d| d.block == 9).unwrap();
        assert_eq!(nine.blocks.len(), 3);
        assert_eq!(nine.blocks[1].len(), BLOCK_LEN);
        assert!(nine.blocks[1].iter().all(|b| b == MISSING_BYTE));
        // The sentinel never equals a real byte, so the block is flagged.
        assert_eq!(nine.byte_index, 0);
    }

    #[test]
    fn test_one_difference_per_address() {
        let a = dump("Block 1: 01 01\nBlock 2: aa aa\n");
        let b = dump("Block 1: 02 02\nBlock 2: aa aa\n");
        let diffs = align(&[a, b]);
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].block, 1);
    }

    #[test]
    fn test_blocks_kept_in_dump_order() {
        let a = dump("Block 0: 01\n");
        let b = dump("Block 0: 02\n");
        let c = dump("Block 0: 03\n");
        let diffs = align(&[a, b, c]);
        assert_eq!(
            diffs[0].blocks,
            [["01"], ["02"], ["03"]].map(|b| b.map(String::from).to_vec())
        );
    }

    #[test]
    fn test_short_line_limits_comparison() {
        // The second dump's block 3 line carries no comparable positions
        // beyond its own length, zip-style.
        let a = dump("Block 3: 00 11 22 33\n");
        let b = dump("Block 3: 00 11\n");
        assert!(align(&[a, b]).is_empty());
    }

    proptest! {
        #[test]
        fn prop_identical_dump_sets_have_no_differences(
            blocks in proptest::collection::vec((0u32..64, proptest::collection::vec("[0-9a-f]{2}", 1..16)), 0..8),
            copies in 2usize..5,
        ) {
            let text: String = blocks
                .iter()
                .map(|(addr, bytes)| format!("Block {}: {}\n", addr, bytes.join(" ")))
                .collect();
            let dumps: Vec<_> = (0..copies).map(|_| ParsedDump::parse(&text)).collect();
            prop_assert!(align(&dumps).is_empty());
        }
    }
}
