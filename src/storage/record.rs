//! On-disk framing of version records
//!
//! ```text
//! +------------------+
//! | Record Length    | (u32 LE, includes itself and the checksum)
//! +------------------+
//! | Version Body     | (UTF-8 JSON of the Version)
//! +------------------+
//! | Checksum         | (u32 LE, CRC32 over length + body)
//! +------------------+
//! ```

use std::io;

use super::checksum::{compute_checksum, verify_checksum};
use super::errors::{StorageError, StorageResult};
use crate::versioning::Version;

/// Length prefix plus checksum.
pub const FRAME_OVERHEAD: usize = 4 + 4;

/// Smallest frame that can hold a JSON object body (`{}`).
pub const MIN_RECORD_SIZE: usize = FRAME_OVERHEAD + 2;

/// Encodes a version into a checksummed frame.
pub fn encode(version: &Version) -> StorageResult<Vec<u8>> {
    let body = serde_json::to_vec(version).map_err(|e| {
        StorageError::write_failed_no_source(format!(
            "Failed to encode version {} of {}: {}",
            version.number(),
            version.document_id(),
            e
        ))
    })?;

    let record_length = (FRAME_OVERHEAD + body.len()) as u32;
    let length_bytes = record_length.to_le_bytes();
    let checksum = compute_checksum(&[&length_bytes, &body]);

    let mut frame = Vec::with_capacity(record_length as usize);
    frame.extend_from_slice(&length_bytes);
    frame.extend_from_slice(&body);
    frame.extend_from_slice(&checksum.to_le_bytes());
    Ok(frame)
}

/// Decodes one frame from the front of `data`, verifying its checksum.
///
/// Returns the version and the number of bytes consumed.
pub fn decode(data: &[u8]) -> io::Result<(Version, usize)> {
    if data.len() < MIN_RECORD_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "Record too short",
        ));
    }

    let record_length = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if record_length < MIN_RECORD_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Invalid record length: {}", record_length),
        ));
    }
    if data.len() < record_length {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!(
                "Record truncated: expected {} bytes, got {}",
                record_length,
                data.len()
            ),
        ));
    }

    let checksum_offset = record_length - 4;
    let stored = u32::from_le_bytes([
        data[checksum_offset],
        data[checksum_offset + 1],
        data[checksum_offset + 2],
        data[checksum_offset + 3],
    ]);
    if !verify_checksum(&[&data[0..checksum_offset]], stored) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "Checksum mismatch: computed {:08x}, stored {:08x}",
                compute_checksum(&[&data[0..checksum_offset]]),
                stored
            ),
        ));
    }

    let version: Version = serde_json::from_slice(&data[4..checksum_offset])
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("Invalid body: {}", e)))?;

    Ok((version, record_length))
}
