//! On-disk representation of a built code table.
//!
//! Ported from `vcSerialize`/`vcDeserialize`: an endian flag byte, the
//! escape code as a 4-byte signed int (`-1` for none), then one interleaved
//! `(length[i], bits[i])` entry per byte value — `bits[i]` is only present
//! when `length[i] > 0`, so the blob's actual size depends on how many
//! symbols the table actually uses, not a fixed maximum.

use crate::bitstream::HOST_IS_BIG_ENDIAN;
use crate::code_builder::CodeTable;
use crate::error::CodecError;
use crate::unchecked::UncheckedArray;

const HEADER_SIZE: usize = 1 + 4;

/// Worst case: every one of the 256 byte values has a nonzero length, so
/// every entry carries its 2-byte `bits` field too.
/// `1 (endian flag) + 4 (escape) + 256 * (1 + 2)`.
pub(crate) const MAX_SERIAL_SIZE: usize = HEADER_SIZE + 256 * 3;

pub(crate) fn serialize(
    table: &CodeTable,
    is_big_endian: bool,
    out: &mut [u8],
) -> Result<usize, CodecError> {
    if out.len() < MAX_SERIAL_SIZE {
        return Err(CodecError::AllocationFailure {
            needed: MAX_SERIAL_SIZE,
            available: out.len(),
        });
    }

    out[0] = is_big_endian as u8;
    let escape: i32 = table.escape.map(|e| e as i32).unwrap_or(-1);
    out[1..HEADER_SIZE].copy_from_slice(&escape.to_ne_bytes());

    let mut pos = HEADER_SIZE;
    for i in 0..256 {
        let len = table.length[i];
        out[pos] = len;
        pos += 1;
        if len > 0 {
            out[pos..pos + 2].copy_from_slice(&table.bits[i].to_ne_bytes());
            pos += 2;
        }
    }

    Ok(pos)
}

pub(crate) fn deserialize(data: &[u8]) -> Result<(CodeTable, bool), CodecError> {
    if data.len() < HEADER_SIZE {
        return Err(CodecError::MalformedStream);
    }

    let is_big_endian = data[0] != 0;
    let needs_swap = is_big_endian != HOST_IS_BIG_ENDIAN;

    let mut escape_raw = i32::from_ne_bytes(data[1..HEADER_SIZE].try_into().unwrap());
    if needs_swap {
        escape_raw = escape_raw.swap_bytes();
    }
    let escape = if escape_raw >= 0 {
        Some(escape_raw as u8)
    } else {
        None
    };

    let mut length = UncheckedArray::<u8, 256>::default();
    let mut bits = UncheckedArray::<u16, 256>::default();

    let mut pos = HEADER_SIZE;
    for i in 0..256 {
        if pos >= data.len() {
            return Err(CodecError::MalformedStream);
        }
        let len = data[pos];
        pos += 1;
        length[i] = len;

        if len > 0 {
            if pos + 2 > data.len() {
                return Err(CodecError::MalformedStream);
            }
            let mut v = u16::from_ne_bytes(data[pos..pos + 2].try_into().unwrap());
            if needs_swap {
                v = v.swap_bytes();
            }
            bits[i] = v;
            pos += 2;
        }
    }

    Ok((
        CodeTable {
            length,
            bits,
            escape,
        },
        is_big_endian,
    ))
}
