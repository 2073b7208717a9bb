//! Whole-file compression and decompression.
//!
//! A compressed file is laid out as:
//!
//! ```text
//! +------------------+
//! | header           |  entry_count + (symbol, probability) pairs
//! +------------------+
//! | payload          |  code bits, MSB-first, zero-padded to a byte
//! | (variable)       |
//! +------------------+
//! | padding (1)      |  number of padding bits in the last payload byte
//! +------------------+
//! ```
//!
//! Compression makes two passes over the input: one to count frequencies and
//! one to encode, so the source must be seekable. Empty input produces a
//! zero-entry header followed directly by a zero trailer.

use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

use tracing::debug;

use crate::bitio::{BitWriter, DEFAULT_BUFFER_BYTES};
use crate::decode::{decode_stream_with, expect_empty_payload};
use crate::encode::encode_stream_with;
use crate::error::{Error, Result};
use crate::frequency::{count_frequencies, FrequencyTable};
use crate::header::{read_header, write_header};
use crate::metrics::{Direction, Metrics};
use crate::tree::{build_tree, CodeTree};

/// Tunables for a codec run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Size of bit accumulators and staging buffers, in bytes
    pub buffer_bytes: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            buffer_bytes: DEFAULT_BUFFER_BYTES,
        }
    }
}

/// Header of a compressed file, with the tree it describes.
#[derive(Debug, Clone)]
pub struct Inspection {
    pub table: FrequencyTable,
    /// `None` for an empty table
    pub tree: Option<CodeTree>,
}

/// Compress `input` into `output`.
///
/// The input is read twice; it is rewound to the start between passes.
///
/// # Errors
/// - `Error::ReadFault` if reading or rewinding the input fails
/// - `Error::WriteFault` if the output fails; the output is left partial
pub fn compress<R, W>(mut input: R, mut output: W, config: &CodecConfig) -> Result<Metrics>
where
    R: Read + Seek,
    W: Write,
{
    let mut metrics = Metrics::new(Direction::Compress);

    let (table, total) = count_frequencies(&mut input)?;
    input.seek(SeekFrom::Start(0)).map_err(Error::ReadFault)?;

    write_header(&mut output, &table)?;
    let payload_bytes = if table.is_empty() {
        BitWriter::new(&mut output).finish()?
    } else {
        let tree = build_tree(&table)?;
        // Only what was counted; bytes appended since would have no code
        let source = input.by_ref().take(total);
        encode_stream_with(&tree, source, &mut output, config.buffer_bytes)?
    };

    metrics.input_bytes = total;
    metrics.header_bytes = table.header_len() as u64;
    metrics.payload_bytes = payload_bytes;
    metrics.output_bytes = metrics.header_bytes + payload_bytes;
    metrics.distinct_symbols = table.len();
    metrics.complete();

    debug!(
        input = metrics.input_bytes,
        output = metrics.output_bytes,
        symbols = metrics.distinct_symbols,
        "compressed"
    );
    Ok(metrics)
}

/// Decompress `input` into `output`.
///
/// # Errors
/// - `Error::CorruptHeader` / `Error::CorruptStream` if `input` is not a
///   valid compressed file
/// - `Error::ReadFault` / `Error::WriteFault` on I/O failure
pub fn decompress<R, W>(input: R, mut output: W, config: &CodecConfig) -> Result<Metrics>
where
    R: Read,
    W: Write,
{
    let mut metrics = Metrics::new(Direction::Decompress);
    let mut source = CountingReader::new(input);

    let table = read_header(&mut source)?;
    let written = if table.is_empty() {
        expect_empty_payload(&mut source)?;
        output.flush().map_err(Error::WriteFault)?;
        0
    } else {
        let tree = build_tree(&table)?;
        decode_stream_with(&tree, &mut source, &mut output, config.buffer_bytes)?
    };

    metrics.input_bytes = source.count();
    metrics.header_bytes = table.header_len() as u64;
    metrics.payload_bytes = metrics.input_bytes - metrics.header_bytes;
    metrics.output_bytes = written;
    metrics.distinct_symbols = table.len();
    metrics.complete();

    debug!(
        input = metrics.input_bytes,
        output = metrics.output_bytes,
        "decompressed"
    );
    Ok(metrics)
}

/// Read only the header of a compressed file and rebuild its tree.
pub fn inspect<R: Read>(input: R) -> Result<Inspection> {
    let table = read_header(input)?;
    let tree = if table.is_empty() {
        None
    } else {
        Some(build_tree(&table)?)
    };
    Ok(Inspection { table, tree })
}

/// Compress an in-memory buffer.
pub fn compress_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    compress(Cursor::new(data), &mut out, &CodecConfig::default())?;
    Ok(out)
}

/// Decompress an in-memory buffer.
pub fn decompress_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    decompress(data, &mut out, &CodecConfig::default())?;
    Ok(out)
}

/// Counts the bytes pulled through it.
struct CountingReader<R> {
    inner: R,
    count: u64,
}

impl<R> CountingReader<R> {
    fn new(inner: R) -> Self {
        Self { inner, count: 0 }
    }

    fn count(&self) -> u64 {
        self.count
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count += n as u64;
        Ok(n)
    }
}
