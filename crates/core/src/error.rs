//! Error types for the huffpack engine.
//!
//! All operations return structured errors rather than panicking. I/O errors
//! are never converted implicitly: every read site reports a `ReadFault` and
//! every write site a `WriteFault`, so callers can tell the two apart.

use std::io;
use thiserror::Error;

/// Top-level error type for all operations in the engine.
///
/// Each variant corresponds to a specific failure domain:
/// - Read/write faults from the underlying byte source or sink
/// - A compressed file whose header or payload is not valid
/// - Degenerate input with no symbols at all
/// - Code tree construction limits
#[derive(Debug, Error)]
pub enum Error {
    /// The byte source failed with something other than end-of-stream
    #[error("read fault: {0}")]
    ReadFault(#[source] io::Error),

    /// The byte sink failed
    #[error("write fault: {0}")]
    WriteFault(#[source] io::Error),

    /// The header of a compressed file is invalid
    #[error("corrupt header: {0}")]
    CorruptHeader(#[from] HeaderError),

    /// The payload of a compressed file is invalid
    #[error("corrupt stream: {0}")]
    CorruptStream(#[from] StreamError),

    /// No symbols were observed, so there is no code tree to build
    #[error("empty input: no symbols to build a code tree from")]
    EmptyInput,

    /// Code tree construction failed
    #[error("code tree error: {0}")]
    Tree(#[from] TreeError),

    /// The encoder met a byte that has no leaf in the code tree
    #[error("symbol {symbol:#04x} is not present in the frequency table")]
    UnknownSymbol { symbol: u8 },
}

impl Error {
    /// True if the error means "this is not a valid compressed file" rather
    /// than an I/O problem or a caller mistake.
    pub fn is_corrupt_input(&self) -> bool {
        matches!(self, Error::CorruptHeader(_) | Error::CorruptStream(_))
    }

    /// True for read and write faults of the underlying streams.
    pub fn is_io_fault(&self) -> bool {
        matches!(self, Error::ReadFault(_) | Error::WriteFault(_))
    }
}

/// Header validation errors.
#[derive(Debug, Error, PartialEq)]
pub enum HeaderError {
    /// Declared entry count exceeds the byte alphabet
    #[error("entry count {count} exceeds 256")]
    TooManyEntries { count: usize },

    /// Byte values must be strictly increasing
    #[error("symbol {symbol:#04x} does not follow {previous:#04x}")]
    NonIncreasingSymbol { previous: u8, symbol: u8 },

    /// Probability is NaN, infinite, zero or negative
    #[error("invalid probability {probability} for symbol {symbol:#04x}")]
    InvalidProbability { symbol: u8, probability: f64 },

    /// Probabilities do not sum to 1.0 within tolerance
    #[error("probabilities sum to {sum}, expected 1.0")]
    ProbabilitySum { sum: f64 },

    /// The stream ended inside the header
    #[error("header truncated")]
    Truncated,
}

/// Payload decoding errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StreamError {
    /// A bit led to a child that does not exist in the code tree
    #[error("missing child in code tree at payload bit {bit}")]
    MissingChild { bit: u64 },

    /// The stream has no trailing padding-count byte
    #[error("missing padding trailer")]
    MissingTrailer,

    /// The padding count is out of range for the payload
    #[error("invalid padding count {padding}")]
    InvalidPadding { padding: u8 },

    /// The payload ended in the middle of a code
    #[error("payload ends inside a code")]
    TruncatedCode,

    /// Payload bits follow a header that declares no symbols
    #[error("payload present for an empty frequency table")]
    UnexpectedPayload,
}

/// Code tree construction errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    /// More nodes were requested than the arena was sized for
    #[error("node arena exhausted: capacity {capacity}")]
    ArenaExhausted { capacity: usize },
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_input_classification() {
        let header: Error = HeaderError::Truncated.into();
        let stream: Error = StreamError::MissingTrailer.into();
        let read = Error::ReadFault(io::Error::new(io::ErrorKind::Other, "disk"));

        assert!(header.is_corrupt_input());
        assert!(stream.is_corrupt_input());
        assert!(!read.is_corrupt_input());
        assert!(read.is_io_fault());
        assert!(!Error::EmptyInput.is_io_fault());
    }

    #[test]
    fn test_display_messages() {
        let err: Error = HeaderError::NonIncreasingSymbol {
            previous: 0x42,
            symbol: 0x41,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "corrupt header: symbol 0x41 does not follow 0x42"
        );

        let err = Error::UnknownSymbol { symbol: 0x0a };
        assert_eq!(
            err.to_string(),
            "symbol 0x0a is not present in the frequency table"
        );
    }
}
