//! CRC32 checksums for version records
//!
//! Every record carries a CRC32 (IEEE) over its length prefix and body.
//! A mismatch on read is corruption.

use crc32fast::Hasher;

/// Computes the CRC32 of the concatenation of `parts`.
pub fn compute_checksum(parts: &[&[u8]]) -> u32 {
    let mut hasher = Hasher::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize()
}

pub fn verify_checksum(parts: &[&[u8]], expected: u32) -> bool {
    compute_checksum(parts) == expected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_input_matches_contiguous() {
        let whole = compute_checksum(&[b"length+body"]);
        let split = compute_checksum(&[b"length", b"+body"]);
        assert_eq!(whole, split);
    }

    #[test]
    fn test_flipped_bit_fails_verification() {
        let data = b"{\"version\":1}".to_vec();
        let checksum = compute_checksum(&[&data]);
        let mut corrupted = data.clone();
        corrupted[3] ^= 0x01;
        assert!(verify_checksum(&[&data], checksum));
        assert!(!verify_checksum(&[&corrupted], checksum));
    }
}
