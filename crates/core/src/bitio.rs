//! Streaming bit-level I/O over byte sources and sinks.
//!
//! This module provides the [`BitAccumulator`] (a fixed-capacity bit buffer)
//! and the [`BitWriter`]/[`BitReader`] pair that pack code bits into bytes
//! and unpack them again without holding the whole stream in memory. Both
//! operate in MSB-first order: the first bit of the stream is the most
//! significant bit of the first payload byte.
//!
//! # Padding Rules
//! - BitWriter: zero-fills the final partial byte, then appends one trailer
//!   byte holding the number of padding bits (0-7)
//! - BitReader: holds back the last two bytes it has read until
//!   end-of-stream proves they are the final payload byte and the trailer,
//!   then stops at the declared valid-bit boundary
//!
//! # Example
//! ```
//! use huffpack_core::bitio::{BitReader, BitWriter};
//!
//! let mut out = Vec::new();
//! let mut writer = BitWriter::new(&mut out);
//! writer.write_bits([true, false, true]).unwrap();
//! writer.finish().unwrap();
//! // 101 -> padded to 10100000, then 5 padding bits
//! assert_eq!(out, vec![0b1010_0000, 5]);
//!
//! let mut reader = BitReader::new(out.as_slice());
//! assert_eq!(reader.read_bit().unwrap(), Some(true));
//! assert_eq!(reader.read_bit().unwrap(), Some(false));
//! assert_eq!(reader.read_bit().unwrap(), Some(true));
//! assert_eq!(reader.read_bit().unwrap(), None);
//! ```

use std::io::{self, Read, Write};

use tracing::trace;

use crate::error::{Error, Result, StreamError};

/// Default size of accumulators and staging buffers, in bytes.
pub const DEFAULT_BUFFER_BYTES: usize = 8 * 1024;

/// Smallest buffer a [`BitReader`] can work with: one payload byte plus the
/// two held-back bytes that may turn out to be the padded final byte and
/// the trailer.
pub const MIN_READER_BUFFER_BYTES: usize = 3;

/// Bytes a [`BitReader`] keeps unread until end-of-stream.
const HELD_BACK_BYTES: usize = 2;

/// A fixed-capacity bit buffer.
///
/// Bits are stored MSB-first. `count` is the number of valid bits and `pos`
/// the read cursor used while decoding.
///
/// # Invariants
/// - `pos <= count <= capacity()`
/// - bits at or beyond `count` are undefined
#[derive(Debug, Clone)]
pub struct BitAccumulator {
    bytes: Box<[u8]>,
    count: usize,
    pos: usize,
}

impl BitAccumulator {
    /// Create an empty accumulator holding up to `bytes * 8` bits.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: vec![0u8; bytes.max(1)].into_boxed_slice(),
            count: 0,
            pos: 0,
        }
    }

    /// Capacity in bits.
    pub fn capacity(&self) -> usize {
        self.bytes.len() * 8
    }

    /// Number of valid bits.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Read cursor position in bits.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Valid bits not yet consumed by [`pop`](Self::pop).
    pub fn remaining(&self) -> usize {
        self.count - self.pos
    }

    pub fn is_full(&self) -> bool {
        self.count == self.capacity()
    }

    /// Append one bit. The caller must flush before the buffer overflows.
    pub fn push(&mut self, bit: bool) {
        debug_assert!(!self.is_full(), "push into a full accumulator");
        let index = self.count / 8;
        let offset = self.count % 8;

        // Start every byte from zero so padding bits are always clear
        if offset == 0 {
            self.bytes[index] = 0;
        }
        if bit {
            self.bytes[index] |= 0x80 >> offset;
        }
        self.count += 1;
    }

    /// Consume the next valid bit, if any.
    pub fn pop(&mut self) -> Option<bool> {
        if self.pos == self.count {
            return None;
        }
        let byte = self.bytes[self.pos / 8];
        let bit = byte & (0x80 >> (self.pos % 8)) != 0;
        self.pos += 1;
        Some(bit)
    }

    /// The whole bytes at the front of the buffer.
    pub fn complete_bytes(&self) -> &[u8] {
        &self.bytes[..self.count / 8]
    }

    /// Drop the complete bytes, shifting any trailing partial byte to the
    /// start of the buffer.
    pub fn retain_partial(&mut self) {
        let whole = self.count / 8;
        let rem = self.count % 8;
        if rem > 0 {
            self.bytes[0] = self.bytes[whole];
        }
        self.count = rem;
        self.pos = 0;
    }

    /// The trailing partial byte (zero-filled) and the number of padding
    /// bits it needs, or `None` when the buffer is byte-aligned.
    pub fn padded_tail(&self) -> Option<(u8, u8)> {
        let rem = self.count % 8;
        if rem == 0 {
            return None;
        }
        let mask = 0xFFu8 << (8 - rem);
        Some((self.bytes[self.count / 8] & mask, (8 - rem) as u8))
    }

    /// Raw storage, used by readers to load bytes directly.
    pub fn storage(&self) -> &[u8] {
        &self.bytes
    }

    pub fn storage_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Declare the first `bits` bits of storage valid and rewind the cursor.
    ///
    /// `bits` is clamped to the capacity.
    pub fn load(&mut self, bits: usize) {
        debug_assert!(bits <= self.capacity(), "load beyond accumulator capacity");
        self.count = bits.min(self.capacity());
        self.pos = 0;
    }

    pub fn clear(&mut self) {
        self.count = 0;
        self.pos = 0;
    }
}

/// Read into `buf`, retrying on `Interrupted`.
///
/// Returns 0 only at end-of-stream; any other failure is a `ReadFault`.
pub(crate) fn read_some<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    loop {
        match reader.read(buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::ReadFault(e)),
        }
    }
}

/// Packs bits MSB-first into a byte sink.
///
/// Bits accumulate until the buffer is full, then every complete byte is
/// written out. [`finish`](Self::finish) writes the zero-filled final byte
/// and the padding trailer.
#[derive(Debug)]
pub struct BitWriter<W> {
    inner: W,
    acc: BitAccumulator,
    bytes_written: u64,
}

impl<W: Write> BitWriter<W> {
    /// Create a writer with the default buffer size.
    pub fn new(inner: W) -> Self {
        Self::with_capacity(inner, DEFAULT_BUFFER_BYTES)
    }

    /// Create a writer that flushes every `bytes` bytes.
    pub fn with_capacity(inner: W, bytes: usize) -> Self {
        Self {
            inner,
            acc: BitAccumulator::with_capacity(bytes),
            bytes_written: 0,
        }
    }

    /// Append a single bit.
    ///
    /// # Errors
    /// Returns `Error::WriteFault` if a flush triggered by this bit fails.
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.acc.push(bit);
        if self.acc.is_full() {
            self.flush_complete()?;
        }
        Ok(())
    }

    /// Append a sequence of bits in order.
    pub fn write_bits<I: IntoIterator<Item = bool>>(&mut self, bits: I) -> Result<()> {
        for bit in bits {
            self.write_bit(bit)?;
        }
        Ok(())
    }

    /// Bytes handed to the sink so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Bits accepted so far, flushed or pending.
    pub fn bit_len(&self) -> u64 {
        self.bytes_written * 8 + self.acc.count() as u64
    }

    fn flush_complete(&mut self) -> Result<()> {
        let bytes = self.acc.complete_bytes();
        if !bytes.is_empty() {
            self.inner.write_all(bytes).map_err(Error::WriteFault)?;
            self.bytes_written += bytes.len() as u64;
            trace!(flushed = bytes.len(), total = self.bytes_written, "bit writer flush");
        }
        self.acc.retain_partial();
        Ok(())
    }

    /// Write the remaining bits, the padded final byte and the padding
    /// trailer, then flush the sink.
    ///
    /// Returns the total number of bytes written, trailer included.
    pub fn finish(mut self) -> Result<u64> {
        self.flush_complete()?;

        let padding = match self.acc.padded_tail() {
            Some((byte, padding)) => {
                self.inner.write_all(&[byte]).map_err(Error::WriteFault)?;
                self.bytes_written += 1;
                padding
            }
            None => 0,
        };
        self.inner.write_all(&[padding]).map_err(Error::WriteFault)?;
        self.bytes_written += 1;
        self.inner.flush().map_err(Error::WriteFault)?;
        self.acc.clear();

        Ok(self.bytes_written)
    }
}

/// Unpacks bits MSB-first from a byte source that ends with a padding
/// trailer.
///
/// The reader refills its accumulator whenever it runs dry, always keeping
/// the two most recently read bytes back: only end-of-stream reveals whether
/// they are the padded final payload byte and the trailer.
#[derive(Debug)]
pub struct BitReader<R> {
    inner: R,
    acc: BitAccumulator,
    /// Bytes loaded into storage: the valid bits plus the held-back bytes
    len: usize,
    eof: bool,
    consumed: u64,
}

impl<R: Read> BitReader<R> {
    /// Create a reader with the default buffer size.
    pub fn new(inner: R) -> Self {
        Self::with_capacity(inner, DEFAULT_BUFFER_BYTES)
    }

    /// Create a reader that refills `bytes` bytes at a time (at least
    /// [`MIN_READER_BUFFER_BYTES`]).
    pub fn with_capacity(inner: R, bytes: usize) -> Self {
        Self {
            inner,
            acc: BitAccumulator::with_capacity(bytes.max(MIN_READER_BUFFER_BYTES)),
            len: 0,
            eof: false,
            consumed: 0,
        }
    }

    /// Read the next payload bit, or `None` once the valid bits are
    /// exhausted.
    ///
    /// # Errors
    /// - `Error::ReadFault` if the source fails
    /// - `StreamError::MissingTrailer` / `InvalidPadding` if the stream ends
    ///   without a usable trailer
    pub fn read_bit(&mut self) -> Result<Option<bool>> {
        loop {
            if let Some(bit) = self.acc.pop() {
                self.consumed += 1;
                return Ok(Some(bit));
            }
            if self.eof {
                return Ok(None);
            }
            self.refill()?;
        }
    }

    /// Payload bits consumed so far.
    pub fn bits_consumed(&self) -> u64 {
        self.consumed
    }

    fn refill(&mut self) -> Result<()> {
        // Everything before the held-back bytes has been consumed
        let consumed = self.acc.count() / 8;
        self.acc.storage_mut().copy_within(consumed..self.len, 0);
        self.len -= consumed;

        let capacity = self.acc.storage().len();
        while self.len < capacity {
            let n = read_some(&mut self.inner, &mut self.acc.storage_mut()[self.len..])?;
            if n == 0 {
                self.eof = true;
                break;
            }
            self.len += n;
            if self.len >= MIN_READER_BUFFER_BYTES {
                break;
            }
        }

        if self.eof {
            return self.load_final();
        }
        let ready = self.len - HELD_BACK_BYTES;
        self.acc.load(ready * 8);
        trace!(bytes = ready, "bit reader refill");
        Ok(())
    }

    fn load_final(&mut self) -> Result<()> {
        let (padding, payload_len) = match self.acc.storage()[..self.len].split_last() {
            Some((&padding, payload)) => (padding, payload.len()),
            None => return Err(StreamError::MissingTrailer.into()),
        };
        if padding > 7 || (payload_len == 0 && padding != 0) {
            return Err(StreamError::InvalidPadding { padding }.into());
        }
        self.acc.load(payload_len * 8 - padding as usize);
        trace!(bytes = payload_len, padding, "bit reader reached trailer");
        Ok(())
    }
}
