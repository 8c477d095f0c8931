//! Fast decode table: a 16-bit window resolves directly to a symbol.
//!
//! Ported from the decode-table-fill loop at the end of `vcCreateCodec` /
//! `vcDeserialize`: every entry whose top `length[i]` bits equal `bits[i]`
//! maps to symbol `i`, for every value of the remaining low bits.

use crate::unchecked::UncheckedArray;

pub(crate) fn build(
    length: &UncheckedArray<u8, 256>,
    bits: &UncheckedArray<u16, 256>,
) -> Box<UncheckedArray<u8, 65536>> {
    let mut lookup = Box::new(UncheckedArray::<u8, 65536>::default());
    for i in 0..256usize {
        let len = length[i];
        if len == 0 {
            continue;
        }
        let shift = 16 - len as u32;
        let base = (bits[i] as u32) << shift;
        let span = 1u32 << shift;
        for j in 0..span {
            lookup[(base + j) as usize] = i as u8;
        }
    }
    lookup
}
