use std::fmt::{Display, Formatter};

/// Error conditions surfaced by the codec core.
///
/// Mirrors the error kinds of the original C implementation's `fprintf` +
/// `exit(1)` failures, but as an ordinary `Result` error instead of a
/// process abort: `StateViolation` covers every precondition failure that
/// used to `exit(1)` (wrong state for the attempted operation),
/// `EmptyHistogram` is the specific case of building a codec with no data,
/// `AllocationFailure` covers a caller-supplied buffer that is too small to
/// hold the result, and `MalformedStream` covers a decode input that is not
/// a well-formed encoding under the compressor's own tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// An operation was attempted while the compressor was in a state that
    /// does not permit it (e.g. encoding before a codec has been built, or
    /// adding histogram data after one has).
    StateViolation {
        attempted: &'static str,
        state: &'static str,
    },

    /// `create_codec` was called on a compressor with an all-zero histogram.
    EmptyHistogram,

    /// A caller-supplied output buffer is too small for the operation to
    /// write its result into.
    AllocationFailure { needed: usize, available: usize },

    /// The decoder encountered a 16-bit prefix with no assigned code, or a
    /// truncated overflow-marker stream.
    MalformedStream,
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::StateViolation { attempted, state } => {
                write!(f, "cannot {attempted}: compressor is in state {state}")
            }
            CodecError::EmptyHistogram => {
                f.write_str("create_codec: compressor has no byte distribution data")
            }
            CodecError::AllocationFailure { needed, available } => write!(
                f,
                "output buffer too small: need {needed} bytes, have {available}"
            ),
            CodecError::MalformedStream => f.write_str("malformed or truncated bitstream"),
        }
    }
}

impl std::error::Error for CodecError {}
