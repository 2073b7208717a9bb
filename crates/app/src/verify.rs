//! Round-trip verification for `compress --verify`.
//!
//! The compressed file is decoded into a CRC32 sink and the checksum is
//! compared with a CRC32 of the original input. Nothing decoded touches
//! the disk.

use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;

use huffpack_core::{decompress, CodecConfig, Error};
use tracing::{debug, info};

use crate::error::AppError;

/// CRC32 and length of a byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checksum {
    pub crc: u32,
    pub bytes: u64,
}

/// A writer that only hashes what it is given.
#[derive(Default)]
pub struct CrcWriter {
    hasher: crc32fast::Hasher,
    bytes: u64,
}

impl CrcWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> Checksum {
        Checksum {
            crc: self.hasher.finalize(),
            bytes: self.bytes,
        }
    }
}

impl Write for CrcWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.hasher.update(buf);
        self.bytes += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Checksum everything `reader` yields.
pub fn checksum<R: Read>(mut reader: R) -> io::Result<Checksum> {
    let mut sink = CrcWriter::new();
    io::copy(&mut reader, &mut sink)?;
    Ok(sink.finish())
}

/// Decode `compressed` and check it reproduces `original`.
///
/// # Errors
/// - `AppError::VerifyMismatch` if the checksums or lengths differ
/// - `AppError::Codec` if `compressed` fails to decode
pub fn verify_round_trip(
    original: &Path,
    compressed: &Path,
    config: &CodecConfig,
) -> Result<Checksum, AppError> {
    let expected = checksum(BufReader::new(open(original)?)).map_err(Error::ReadFault)?;

    let mut sink = CrcWriter::new();
    decompress(BufReader::new(open(compressed)?), &mut sink, config)?;
    let actual = sink.finish();

    debug!(
        expected = expected.crc,
        actual = actual.crc,
        bytes = actual.bytes,
        "verify"
    );
    if expected != actual {
        return Err(AppError::VerifyMismatch {
            expected: expected.crc,
            actual: actual.crc,
        });
    }
    info!(crc = actual.crc, bytes = actual.bytes, "round trip verified");
    Ok(actual)
}

fn open(path: &Path) -> Result<File, AppError> {
    File::open(path).map_err(|source| AppError::Open {
        path: path.to_path_buf(),
        source,
    })
}
