//! Decode a byte slice produced by [`crate::encode::encode`].
//!
//! Ported from `vcDecode`: a leading `0xFF` byte marks a verbatim literal
//! copy (the overflow-fallback path); otherwise the stream is a packed
//! sequence of codes, each resolved via the 16-bit fast lookup table and
//! followed by a raw literal byte when it resolves to the escape symbol.

use crate::bitstream::{normalize_payload, BitCursor};
use crate::code_builder::CodeTable;
use crate::error::CodecError;
use crate::unchecked::UncheckedArray;

pub(crate) fn decode(
    table: &CodeTable,
    lookup: &UncheckedArray<u8, 65536>,
    total_bits: usize,
    input: &[u8],
    output: &mut [u8],
) -> Result<usize, CodecError> {
    if input.is_empty() {
        return Err(CodecError::MalformedStream);
    }

    if input[0] == 0xFF {
        let literal = &input[1..];
        if output.len() < literal.len() {
            return Err(CodecError::AllocationFailure {
                needed: literal.len(),
                available: output.len(),
            });
        }
        output[..literal.len()].copy_from_slice(literal);
        return Ok(literal.len());
    }

    let total_bytes = (total_bits + 7) / 8;
    if input.len() < total_bytes {
        return Err(CodecError::MalformedStream);
    }

    let payload = normalize_payload(input, total_bits);
    let mut cursor = BitCursor::new(&payload, total_bits);

    let mut out_len = 0usize;
    while cursor.remaining() > 0 {
        let window = cursor.peek16();
        let sym = lookup[window as usize];
        let len = table.length[sym as usize];
        if len == 0 {
            return Err(CodecError::MalformedStream);
        }
        cursor.consume(len as usize);

        let byte = if table.escape == Some(sym) {
            cursor.read_u8()
        } else {
            sym
        };

        if out_len >= output.len() {
            return Err(CodecError::AllocationFailure {
                needed: out_len + 1,
                available: output.len(),
            });
        }
        output[out_len] = byte;
        out_len += 1;
    }
    Ok(out_len)
}
