//! Direct reads from the ICC tag table.
//!
//! lcms2 does not expose the `chad` (chromatic adaptation) tag as a
//! matrix, so it is decoded from the raw bytes here.

use byteorder::{BigEndian, ByteOrder};
use hdrv_math::Mat3;

const HEADER_LEN: usize = 128;
const TAG_ENTRY_LEN: usize = 12;

/// Finds a tag's payload by signature.
pub(crate) fn find_tag<'a>(data: &'a [u8], signature: &[u8; 4]) -> Option<&'a [u8]> {
    let count = BigEndian::read_u32(data.get(HEADER_LEN..HEADER_LEN + 4)?) as usize;
    (0..count).find_map(|i| {
        let start = HEADER_LEN + 4 + i * TAG_ENTRY_LEN;
        let entry = data.get(start..start + TAG_ENTRY_LEN)?;
        if &entry[0..4] != signature {
            return None;
        }
        let offset = BigEndian::read_u32(&entry[4..8]) as usize;
        let size = BigEndian::read_u32(&entry[8..12]) as usize;
        data.get(offset..offset.checked_add(size)?)
    })
}

/// Reads the 3x3 `chad` matrix (type `sf32`, s15Fixed16 entries).
pub(crate) fn chromatic_adaptation(data: &[u8]) -> Option<Mat3> {
    let body = find_tag(data, b"chad")?;
    if body.len() < 8 + 9 * 4 || &body[0..4] != b"sf32" {
        return None;
    }
    let mut rows = [[0.0f32; 3]; 3];
    for (i, v) in body[8..8 + 36].chunks_exact(4).enumerate() {
        rows[i / 3][i % 3] = BigEndian::read_i32(v) as f32 / 65536.0;
    }
    Some(Mat3::from_rows(rows))
}
