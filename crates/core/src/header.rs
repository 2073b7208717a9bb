//! Frequency table header serialization and parsing.
//!
//! The header is the only thing persisted about the code tree. Tree shape is
//! never stored: the decoder rebuilds the tree from these frequencies.
//!
//! # Header Format
//!
//! ```text
//! +---------------------+
//! | entry_count (2)     |  u16 little-endian, 0..=256
//! +---------------------+
//! | symbol (1)          |  \
//! | probability (8)     |   } entry_count times, symbols strictly increasing
//! +---------------------+  /  probability is an f64 little-endian
//! ```

use std::io::{self, Read, Write};

use tracing::debug;

use crate::error::{Error, HeaderError, Result};
use crate::frequency::{FrequencyTable, ALPHABET_SIZE};

pub use crate::frequency::PROBABILITY_TOLERANCE;

/// Size of one serialized entry: symbol byte plus f64 probability.
const ENTRY_SIZE: usize = 9;

/// Write `table` as a header.
///
/// # Errors
/// Returns `Error::WriteFault` if the sink fails.
pub fn write_header<W: Write>(mut writer: W, table: &FrequencyTable) -> Result<()> {
    let mut bytes = Vec::with_capacity(table.header_len());
    bytes.extend_from_slice(&(table.len() as u16).to_le_bytes());
    for &(symbol, probability) in table.entries() {
        bytes.push(symbol);
        bytes.extend_from_slice(&probability.to_le_bytes());
    }

    writer.write_all(&bytes).map_err(Error::WriteFault)?;
    debug!(entries = table.len(), bytes = bytes.len(), "wrote header");
    Ok(())
}

/// Read and validate a header.
///
/// # Errors
/// - `HeaderError::TooManyEntries` if the count exceeds 256
/// - `HeaderError::NonIncreasingSymbol` on a repeated or decreasing symbol
/// - `HeaderError::InvalidProbability` / `ProbabilitySum` on bad probabilities
/// - `HeaderError::Truncated` if the stream ends inside the header
/// - `Error::ReadFault` if the source fails
pub fn read_header<R: Read>(mut reader: R) -> Result<FrequencyTable> {
    let mut count_bytes = [0u8; 2];
    read_exact(&mut reader, &mut count_bytes)?;
    let count = u16::from_le_bytes(count_bytes) as usize;
    if count > ALPHABET_SIZE {
        return Err(HeaderError::TooManyEntries { count }.into());
    }

    let mut entries = Vec::with_capacity(count);
    let mut entry = [0u8; ENTRY_SIZE];
    for _ in 0..count {
        read_exact(&mut reader, &mut entry)?;
        let symbol = entry[0];
        let mut probability = [0u8; 8];
        probability.copy_from_slice(&entry[1..]);
        entries.push((symbol, f64::from_le_bytes(probability)));
    }

    let table = FrequencyTable::from_entries(entries)?;
    debug!(entries = table.len(), "read header");
    Ok(table)
}

fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => HeaderError::Truncated.into(),
        _ => Error::ReadFault(e),
    })
}
