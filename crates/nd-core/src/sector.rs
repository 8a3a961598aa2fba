//! Mifare Classic 1K block-to-sector addressing.
//!
//! The first 32 sectors hold 4 blocks each, the remaining sectors hold 16.
//! Fixed policy of the target card family, not user-configurable.

/// Sector containing linear block address `block`.
pub fn sector_of(block: u32) -> u32 {
    if block < 128 {
        block / 4
    } else {
        32 + (block - 128) / 16
    }
}

/// Position of `block` within its sector.
pub fn offset_in_sector(block: u32) -> u32 {
    if block < 128 {
        block % 4
    } else {
        (block - 128) % 16
    }
}
