// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Zero checksum shared by every region of the image
//!
//! A region is valid when all of its bytes, including the stored checksum
//! byte, sum to zero modulo 256.

/// Sum of all bytes modulo 256
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, byte| acc.wrapping_add(*byte))
}

/// Returns `true` if the region sums to zero
pub fn is_valid(region: &[u8]) -> bool {
    checksum(region) == 0
}

/// The byte which, appended to `bytes`, makes the region sum to zero
pub fn complement(bytes: &[u8]) -> u8 {
    checksum(bytes).wrapping_neg()
}
