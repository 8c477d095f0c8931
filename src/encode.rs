//! Encode a byte slice against a built [`CodeTable`].
//!
//! Ported from `vcEncode`: each input byte emits its assigned code, or an
//! escape code followed by the raw byte if it has none. The running bit
//! count is checked *before* a code is emitted, not after: `output` is only
//! sized for `input.len() + 1` bytes, so a word flushed past that bound
//! would panic. If the next code would push the stream past the input's raw
//! bit count, encoding aborts there and the caller falls back to a verbatim
//! `0xFF`-tagged copy instead.

use crate::bitstream::{fixup_first_word, BitAccumulator};
use crate::code_builder::CodeTable;
use crate::error::CodecError;

pub(crate) fn encode(
    table: &CodeTable,
    input: &[u8],
    output: &mut [u8],
) -> Result<usize, CodecError> {
    let needed = input.len() + 1;
    if output.len() < needed {
        return Err(CodecError::AllocationFailure {
            needed,
            available: output.len(),
        });
    }

    let ibits = 8 * input.len();
    let mut tbits: i64 = 2;
    let mut overflowed = false;

    {
        let mut acc = BitAccumulator::new(output);
        for &b in input {
            let len = table.length[b as usize];

            // (length, code) pairs to emit for this byte, computed before
            // any of them are pushed so the overflow check below can veto
            // the whole byte atomically.
            let codes: [(i64, u64); 2];
            let n_codes;
            let add_bits;
            if len > 0 {
                codes = [(len as i64, table.bits[b as usize] as u64), (0, 0)];
                n_codes = 1;
                add_bits = len as i64;
            } else if let Some(esc) = table.escape {
                let esc_len = table.length[esc as usize] as i64;
                codes = [
                    (esc_len, table.bits[esc as usize] as u64),
                    (8, b as u64),
                ];
                n_codes = 2;
                add_bits = esc_len + 8;
            } else {
                overflowed = true;
                break;
            }

            if tbits + add_bits > ibits as i64 {
                overflowed = true;
                break;
            }
            for &(l, c) in &codes[..n_codes] {
                acc.push(l, c);
            }
            tbits += add_bits;
        }
        if !overflowed {
            acc.finish();
        }
    }

    if overflowed {
        output[0] = 0xFF;
        output[1..1 + input.len()].copy_from_slice(input);
        return Ok(8 + 8 * input.len());
    }

    fixup_first_word(output, tbits as usize);
    Ok(tbits as usize)
}
