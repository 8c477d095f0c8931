//! Length-limited canonical Huffman construction.
//!
//! Builds code lengths with the Larmore-Hirschberg coin-collector algorithm
//! (one coin-merge pass per bit level up to [`HUFF_CUTOFF`]), then assigns
//! canonical bit patterns by walking the sorted length list and shifting,
//! decrementing, and filling so every prefix stays uniquely decodable.
//! Ported from `vcCreateCodec` in the original C.

use crate::error::CodecError;
use crate::histogram::Histogram;
use crate::unchecked::UncheckedArray;
use static_assertions::const_assert;

/// Longest canonical code this codec will ever assign. The fast decode
/// table is indexed by a 16-bit window, so codes must fit well inside that.
pub(crate) const HUFF_CUTOFF: usize = 12;
const_assert!(HUFF_CUTOFF <= 16);

/// A built codec: per-byte code length and bit pattern, plus which byte (if
/// any) stands in for every symbol absent from the training histogram.
pub(crate) struct CodeTable {
    pub(crate) length: UncheckedArray<u8, 256>,
    pub(crate) bits: UncheckedArray<u16, 256>,
    pub(crate) escape: Option<u8>,
}

impl CodeTable {
    /// `partial` requests an escape symbol for bytes absent from `hist`; the
    /// lowest-indexed zero-count byte is chosen, so the same histogram
    /// always yields the same escape choice.
    pub(crate) fn build(hist: &Histogram, partial: bool) -> Result<Self, CodecError> {
        if hist.is_empty() {
            return Err(CodecError::EmptyHistogram);
        }

        let mut symbols: Vec<u8> = Vec::with_capacity(256);
        let mut escape = None;
        for b in 0..=255u8 {
            if hist.count(b) > 0 {
                symbols.push(b);
            } else if partial && escape.is_none() {
                escape = Some(b);
                symbols.push(b);
            }
        }

        // Stable: ties keep symbol order, so the resulting code is
        // deterministic for a given histogram.
        symbols.sort_by(|&a, &b| hist.count(a).cmp(&hist.count(b)).then(a.cmp(&b)));

        let weights: Vec<u64> = symbols.iter().map(|&s| hist.count(s)).collect();
        let leng = coin_collector(&weights);
        let codes = canonical_bits(&leng);

        let mut length = UncheckedArray::<u8, 256>::default();
        let mut bits = UncheckedArray::<u16, 256>::default();
        for (n, &sym) in symbols.iter().enumerate() {
            length[sym as usize] = leng[n] as u8;
            bits[sym as usize] = codes[n];
        }

        Ok(Self {
            length,
            bits,
            escape,
        })
    }
}

/// Coin-collector length assignment. `weights` must already be sorted
/// ascending; returns one code length per entry. A single-symbol table
/// gets length 0 (it never needs to be written to the stream).
fn coin_collector(weights: &[u64]) -> Vec<u32> {
    let ncode = weights.len();
    if ncode <= 1 {
        return vec![0; ncode];
    }

    let dcode = 2 * ncode;
    let mut matrix = vec![vec![false; dcode]; HUFF_CUTOFF];

    let mut lcnt = weights.to_vec();
    let mut llen = ncode - 1;

    for level in (1..HUFF_CUTOFF).rev() {
        let mut ccnt = vec![0u64; dcode];
        let mut j = 0usize;
        let mut k = 0usize;
        let mut n = 0usize;
        while j < ncode || k < llen {
            let take_leaf = k >= llen || (j < ncode && weights[j] <= lcnt[k] + lcnt[k + 1]);
            if take_leaf {
                ccnt[n] = weights[j];
                matrix[level][n] = true;
                j += 1;
            } else {
                ccnt[n] = lcnt[k] + lcnt[k + 1];
                k += 2;
            }
            n += 1;
        }
        llen = n - 1;
        lcnt = ccnt;
    }

    // Back-trace: each level's merge list tells us how many leaves were
    // collected (directly, not as part of a coin pair) at that level.
    let mut leng = vec![0u32; ncode];
    let mut span = 2 * (ncode - 1);
    for level in 1..HUFF_CUTOFF {
        let mut j = 0usize;
        for n in 0..span {
            if matrix[level][n] {
                leng[j] += 1;
                j += 1;
            }
        }
        span = 2 * (span - j);
    }
    for leng_n in leng.iter_mut().take(span) {
        *leng_n += 1;
    }
    leng
}

/// Canonical bit assignment: the next code in a length class is the
/// previous code incremented, truncated or extended to the new length by
/// shifting in the low bit that keeps every code a non-prefix of the next.
fn canonical_bits(leng: &[u32]) -> Vec<u16> {
    let ncode = leng.len();
    let mut bits = vec![0u16; ncode];
    if ncode == 0 {
        return bits;
    }

    let mut llen = leng[0] as i64;
    let mut lbits: u16 = ((1u32 << llen) - 1) as u16;
    bits[0] = lbits;

    for n in 1..ncode {
        while llen > 0 && lbits & 1 == 0 {
            lbits >>= 1;
            llen -= 1;
        }
        lbits -= 1;
        while llen < leng[n] as i64 {
            lbits = (lbits << 1) | 1;
            llen += 1;
        }
        bits[n] = lbits;
    }
    bits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hist_from(weights: &[(u8, u64)]) -> Histogram {
        let mut hist = Histogram::new();
        for &(b, n) in weights {
            for _ in 0..n {
                hist.add(&[b]);
            }
        }
        hist
    }

    #[test]
    fn lengths_respect_kraft_inequality() {
        let hist = hist_from(&[(b'a', 1), (b'b', 1), (b'c', 2), (b'd', 4), (b'e', 8)]);
        let table = CodeTable::build(&hist, false).unwrap();
        let mut kraft = 0.0f64;
        for b in [b'a', b'b', b'c', b'd', b'e'] {
            let len = table.length[b as usize];
            assert!(len > 0);
            kraft += 1.0 / (1u64 << len) as f64;
        }
        assert!(kraft <= 1.0 + 1e-9);
    }

    #[test]
    fn codes_are_prefix_free() {
        let hist = hist_from(&[(b'a', 5), (b'b', 3), (b'c', 3), (b'd', 1), (b'e', 1), (b'f', 1)]);
        let table = CodeTable::build(&hist, false).unwrap();
        let present = [b'a', b'b', b'c', b'd', b'e', b'f'];
        for &x in &present {
            for &y in &present {
                if x == y {
                    continue;
                }
                let (lx, ly) = (table.length[x as usize], table.length[y as usize]);
                if lx == 0 || ly == 0 || lx > ly {
                    continue;
                }
                let shift = ly - lx;
                assert_ne!(
                    table.bits[x as usize],
                    table.bits[y as usize] >> shift,
                    "code for {x} is a prefix of code for {y}"
                );
            }
        }
    }

    #[test]
    fn partial_reserves_lowest_absent_byte_as_escape() {
        let hist = hist_from(&[(b'a', 4), (b'b', 2), (b'c', 1)]);
        let table = CodeTable::build(&hist, true).unwrap();
        assert_eq!(table.escape, Some(0));
    }

    #[test]
    fn non_partial_has_no_escape() {
        let hist = hist_from(&[(b'a', 4), (b'b', 2)]);
        let table = CodeTable::build(&hist, false).unwrap();
        assert_eq!(table.escape, None);
    }

    #[test]
    fn empty_histogram_is_rejected() {
        let hist = Histogram::new();
        assert!(matches!(
            CodeTable::build(&hist, false),
            Err(CodecError::EmptyHistogram)
        ));
    }
}
