//! Length-limited canonical Huffman codec with a 2-bit DNA fast path.
//!
//! Builds a canonical Huffman code from an accumulated byte histogram using
//! the Larmore-Hirschberg coin-collector algorithm, encodes and decodes
//! through a packed MSB-first bit-stream with an escape mechanism and an
//! overflow fallback, and serialises the resulting code table to a
//! fixed-layout byte blob. A parallel 2-bit-per-base fast path handles pure
//! DNA sequences without building a Huffman table at all.

mod bitstream;
mod code_builder;
mod decode;
mod decode_table;
mod dna;
mod encode;
mod error;
mod histogram;
mod serialize;
mod unchecked;

pub use dna::{DnaCompressor, DNA};
pub use error::CodecError;
pub use histogram::Histogram;

use code_builder::CodeTable;
use unchecked::UncheckedArray;

enum CompressorState {
    Empty,
    Filled(Histogram),
    CodedWithHistogram {
        table: CodeTable,
        lookup: Box<UncheckedArray<u8, 65536>>,
        histogram: Histogram,
    },
    CodedFromDeserialised {
        table: CodeTable,
        lookup: Box<UncheckedArray<u8, 65536>>,
    },
}

impl CompressorState {
    fn name(&self) -> &'static str {
        match self {
            CompressorState::Empty => "empty",
            CompressorState::Filled(_) => "filled",
            CompressorState::CodedWithHistogram { .. } => "coded",
            CompressorState::CodedFromDeserialised { .. } => "coded (deserialised)",
        }
    }
}

/// A Huffman codec under construction or ready for use.
///
/// Progresses `Empty -> Filled -> CodedWithHistogram`, or goes straight to
/// `CodedFromDeserialised` via [`Compressor::deserialize`]. Each operation
/// is only available in the states that make sense for it; calling one out
/// of order returns [`CodecError::StateViolation`] instead of the original
/// implementation's hard abort.
pub struct Compressor {
    state: CompressorState,
    is_big_endian: bool,
}

impl Compressor {
    /// A fresh compressor with no histogram data yet.
    pub fn create() -> Self {
        Self {
            state: CompressorState::Empty,
            is_big_endian: bitstream::HOST_IS_BIG_ENDIAN,
        }
    }

    /// Size of the buffer [`Compressor::serialize`] needs to write into.
    pub const fn max_serial_size() -> usize {
        serialize::MAX_SERIAL_SIZE
    }

    /// Accumulate byte frequencies from `bytes`. Valid from the `Empty` or
    /// `Filled` state; may be called any number of times before
    /// [`Compressor::create_codec`].
    pub fn add_to_table(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        match &mut self.state {
            CompressorState::Empty => {
                let mut hist = Histogram::new();
                hist.add(bytes);
                self.state = CompressorState::Filled(hist);
                Ok(())
            }
            CompressorState::Filled(hist) => {
                hist.add(bytes);
                Ok(())
            }
            other => Err(CodecError::StateViolation {
                attempted: "add to histogram",
                state: other.name(),
            }),
        }
    }

    /// Build a canonical Huffman code from the accumulated histogram.
    /// `partial` reserves an escape symbol for bytes that never appeared.
    pub fn create_codec(&mut self, partial: bool) -> Result<(), CodecError> {
        let histogram = match &self.state {
            CompressorState::Filled(hist) => hist.clone(),
            other => {
                return Err(CodecError::StateViolation {
                    attempted: "build a codec",
                    state: other.name(),
                })
            }
        };
        let table = CodeTable::build(&histogram, partial)?;
        let lookup = decode_table::build(&table.length, &table.bits);
        self.state = CompressorState::CodedWithHistogram {
            table,
            lookup,
            histogram,
        };
        Ok(())
    }

    /// Encode `input` into `output`, which must be at least `input.len() +
    /// 1` bytes. Returns the number of bits written (pass this to
    /// [`Compressor::decode`]).
    pub fn encode(&self, input: &[u8], output: &mut [u8]) -> Result<usize, CodecError> {
        let table = self.table().ok_or(CodecError::StateViolation {
            attempted: "encode",
            state: self.state.name(),
        })?;
        encode::encode(table, input, output)
    }

    /// Decode `bits` bits of `input`, as produced by [`Compressor::encode`]
    /// with a codec built from the same table.
    pub fn decode(
        &self,
        bits: usize,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<usize, CodecError> {
        let (table, lookup) = self
            .table_and_lookup()
            .ok_or(CodecError::StateViolation {
                attempted: "decode",
                state: self.state.name(),
            })?;
        decode::decode(table, lookup, bits, input, output)
    }

    /// Serialise the built code table into `out`, which must be at least
    /// [`Compressor::max_serial_size`] bytes.
    pub fn serialize(&self, out: &mut [u8]) -> Result<usize, CodecError> {
        let table = self.table().ok_or(CodecError::StateViolation {
            attempted: "serialize",
            state: self.state.name(),
        })?;
        serialize::serialize(table, self.is_big_endian, out)
    }

    /// Rebuild a compressor from a blob written by [`Compressor::serialize`],
    /// possibly on a different-endian host. The result has no histogram, so
    /// [`Compressor::print`] cannot show byte-frequency percentages for it.
    pub fn deserialize(data: &[u8]) -> Result<Self, CodecError> {
        let (table, _stored_is_big_endian) = serialize::deserialize(data)?;
        let lookup = decode_table::build(&table.length, &table.bits);
        Ok(Self {
            state: CompressorState::CodedFromDeserialised { table, lookup },
            is_big_endian: bitstream::HOST_IS_BIG_ENDIAN,
        })
    }

    /// Write a human-readable diagnostic report: per-symbol code length and
    /// bit pattern (escape flagged), plus a compression-ratio estimate
    /// against the accumulated histogram when one is available.
    pub fn print(&self, out: &mut impl std::fmt::Write) -> std::fmt::Result {
        match &self.state {
            CompressorState::CodedWithHistogram {
                table, histogram, ..
            } => print_report(out, table, Some(histogram)),
            CompressorState::CodedFromDeserialised { table, .. } => print_report(out, table, None),
            other => writeln!(out, "compressor has no codec yet (state: {})", other.name()),
        }
    }

    fn table(&self) -> Option<&CodeTable> {
        match &self.state {
            CompressorState::CodedWithHistogram { table, .. } => Some(table),
            CompressorState::CodedFromDeserialised { table, .. } => Some(table),
            _ => None,
        }
    }

    fn table_and_lookup(&self) -> Option<(&CodeTable, &UncheckedArray<u8, 65536>)> {
        match &self.state {
            CompressorState::CodedWithHistogram { table, lookup, .. } => Some((table, lookup)),
            CompressorState::CodedFromDeserialised { table, lookup } => Some((table, lookup)),
            _ => None,
        }
    }
}

impl Default for Compressor {
    fn default() -> Self {
        Self::create()
    }
}

fn print_report(
    out: &mut impl std::fmt::Write,
    table: &CodeTable,
    histogram: Option<&Histogram>,
) -> std::fmt::Result {
    let total: u64 = histogram.map_or(0, |h| (0..=255u8).map(|b| h.count(b)).sum());
    let mut compressed_bits: u64 = 0;

    for b in 0..=255u8 {
        let len = table.length[b as usize];
        if len == 0 {
            continue;
        }
        let tag = if table.escape == Some(b) {
            "  *** escape ***"
        } else {
            ""
        };
        let width = len as usize;
        match histogram {
            Some(hist) => {
                let count = hist.count(b);
                if count == 0 && table.escape != Some(b) {
                    continue;
                }
                compressed_bits += count * len as u64;
                let pct = 100.0 * count as f64 / total.max(1) as f64;
                writeln!(
                    out,
                    "{:3} ({:>5.2}%): {:2} bits = {:0width$b}{tag}",
                    b,
                    pct,
                    len,
                    table.bits[b as usize],
                )?;
            }
            None => {
                writeln!(
                    out,
                    "{:3}: {:2} bits = {:0width$b}{tag}",
                    b, len, table.bits[b as usize],
                )?;
            }
        }
    }

    if histogram.is_some() {
        let raw_bits = total * 8;
        let ratio = if raw_bits > 0 {
            100.0 * compressed_bits as f64 / raw_bits as f64
        } else {
            0.0
        };
        writeln!(
            out,
            "total: {} bytes raw, ~{} bytes compressed ({ratio:.1}% of original)",
            total,
            (compressed_bits + 7) / 8,
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometric_histogram() -> Compressor {
        let mut c = Compressor::create();
        c.add_to_table(b"abcdefghijkl").unwrap();
        c.add_to_table(b"cdefghijkl").unwrap();
        for _ in 0..2 {
            c.add_to_table(b"defghijkl").unwrap();
        }
        for _ in 0..4 {
            c.add_to_table(b"efghijkl").unwrap();
        }
        for _ in 0..8 {
            c.add_to_table(b"fghijkl").unwrap();
        }
        for _ in 0..16 {
            c.add_to_table(b"ghijkl").unwrap();
        }
        for _ in 0..32 {
            c.add_to_table(b"hijkl").unwrap();
        }
        for _ in 0..64 {
            c.add_to_table(b"ijkl").unwrap();
        }
        for _ in 0..128 {
            c.add_to_table(b"jkl").unwrap();
        }
        for _ in 0..256 {
            c.add_to_table(b"kl").unwrap();
        }
        for _ in 0..512 {
            c.add_to_table(b"l").unwrap();
        }
        c
    }

    fn round_trip(c: &Compressor, text: &[u8]) -> Vec<u8> {
        let mut encoded = vec![0u8; text.len() + 1];
        let bits = c.encode(text, &mut encoded).unwrap();
        let mut decoded = vec![0u8; text.len()];
        let n = c.decode(bits, &encoded, &mut decoded).unwrap();
        decoded.truncate(n);
        decoded
    }

    #[test]
    fn round_trips_geometric_histogram_samples() {
        let mut c = geometric_histogram();
        c.create_codec(false).unwrap();
        for text in [
            &b"llkllkjllkllkjithlhlkl"[..],
            &b"llkllkjllkllkjithlhlkk"[..],
            &b"llkllkjllkllkjithlhlkkl"[..],
        ] {
            assert_eq!(round_trip(&c, text), text);
        }
    }

    #[test]
    fn escape_path_round_trips_unseen_bytes() {
        let mut c = geometric_histogram();
        c.create_codec(true).unwrap();
        let text = b"mnopq";
        assert_eq!(round_trip(&c, text), text);
    }

    #[test]
    fn unseen_byte_without_escape_falls_back_to_literal() {
        let mut c = geometric_histogram();
        c.create_codec(false).unwrap();
        let text = b"mnopq";
        let mut encoded = vec![0u8; text.len() + 1];
        let bits = c.encode(text, &mut encoded).unwrap();
        assert_eq!(encoded[0], 0xFF);
        assert_eq!(bits, 8 + 8 * text.len());

        let mut decoded = vec![0u8; text.len()];
        let n = c.decode(bits, &encoded, &mut decoded).unwrap();
        assert_eq!(&decoded[..n], text);
    }

    #[test]
    fn incompressible_input_overflows_to_literal_copy() {
        let mut c = Compressor::create();
        c.add_to_table(b"aaaabbbbccccdddd").unwrap();
        c.create_codec(false).unwrap();
        let random = b"xXqQzZwWvVuUyYtT";
        let mut encoded = vec![0u8; random.len() + 1];
        let bits = c.encode(random, &mut encoded).unwrap();
        assert_eq!(encoded[0], 0xFF);

        let mut decoded = vec![0u8; random.len()];
        let n = c.decode(bits, &encoded, &mut decoded).unwrap();
        assert_eq!(&decoded[..n], random);
    }

    #[test]
    fn operations_reject_wrong_state() {
        let mut c = Compressor::create();
        assert!(matches!(
            c.create_codec(false),
            Err(CodecError::StateViolation { .. })
        ));
        c.add_to_table(b"abc").unwrap();
        c.create_codec(false).unwrap();
        assert!(matches!(
            c.add_to_table(b"abc"),
            Err(CodecError::StateViolation { .. })
        ));
    }

    #[test]
    fn serialize_round_trip_preserves_encode_decode_behavior() {
        let mut c = geometric_histogram();
        c.create_codec(false).unwrap();
        let mut buf = vec![0u8; Compressor::max_serial_size()];
        let n = c.serialize(&mut buf).unwrap();
        let restored = Compressor::deserialize(&buf[..n]).unwrap();

        let text = b"llkllkjllkllkjithlhlkl";
        assert_eq!(round_trip(&restored, text), text);
    }

    #[test]
    fn empty_input_round_trips() {
        let mut c = geometric_histogram();
        c.create_codec(false).unwrap();
        assert_eq!(round_trip(&c, b""), b"");
    }

    #[test]
    fn print_reports_escape_and_percentages() {
        let mut c = geometric_histogram();
        c.create_codec(true).unwrap();
        let mut report = String::new();
        c.print(&mut report).unwrap();
        assert!(report.contains("escape"));
        assert!(report.contains("total:"));
    }

    #[test]
    fn print_on_empty_compressor_names_its_state() {
        let c = Compressor::create();
        let mut report = String::new();
        c.print(&mut report).unwrap();
        assert!(report.contains("empty"));
    }
}
