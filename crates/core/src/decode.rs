//! Bit stream decoder: packed code bits back to bytes.
//!
//! The decoder walks the tree from the root one bit at a time (left on `1`,
//! right on `0`), emits a byte whenever it lands on a leaf and starts over at
//! the root. It stops at the valid-bit boundary declared by the trailer, so
//! padding bits are never decoded.

use std::io::{Read, Write};

use tracing::debug;

use crate::bitio::{BitReader, DEFAULT_BUFFER_BYTES};
use crate::error::{Error, Result, StreamError};
use crate::tree::CodeTree;

/// Decode the payload in `input` with `tree`, writing the bytes to `output`.
///
/// Returns the number of decoded bytes written.
///
/// # Errors
/// - `StreamError::MissingChild` if a bit leads nowhere in the tree
/// - `StreamError::TruncatedCode` if the payload ends inside a code
/// - `StreamError::MissingTrailer` / `InvalidPadding` for a bad trailer
/// - `Error::ReadFault` / `Error::WriteFault` on I/O failure
pub fn decode_stream<R: Read, W: Write>(tree: &CodeTree, input: R, output: W) -> Result<u64> {
    decode_stream_with(tree, input, output, DEFAULT_BUFFER_BYTES)
}

/// [`decode_stream`] with an explicit refill and output buffer size.
pub fn decode_stream_with<R: Read, W: Write>(
    tree: &CodeTree,
    input: R,
    mut output: W,
    buffer_bytes: usize,
) -> Result<u64> {
    let root = tree.root();
    let mut reader = BitReader::with_capacity(input, buffer_bytes);
    let limit = buffer_bytes.max(1);
    let mut pending = Vec::with_capacity(limit);
    let mut written = 0u64;
    let mut position = root;

    while let Some(bit) = reader.read_bit()? {
        let next = tree.child(position, bit);
        let Some(node) = tree.node(next) else {
            return Err(StreamError::MissingChild {
                bit: reader.bits_consumed() - 1,
            }
            .into());
        };
        if !node.is_leaf() {
            position = next;
            continue;
        }

        pending.push(node.symbol);
        position = root;
        if pending.len() >= limit {
            output.write_all(&pending).map_err(Error::WriteFault)?;
            written += pending.len() as u64;
            pending.clear();
        }
    }

    if position != root {
        return Err(StreamError::TruncatedCode.into());
    }

    output.write_all(&pending).map_err(Error::WriteFault)?;
    written += pending.len() as u64;
    output.flush().map_err(Error::WriteFault)?;

    debug!(bits = reader.bits_consumed(), written, "decoded stream");
    Ok(written)
}

/// Check that the payload following an empty header carries no bits.
///
/// # Errors
/// - `StreamError::UnexpectedPayload` if any valid bit is present
/// - the trailer and read errors of [`decode_stream`]
pub fn expect_empty_payload<R: Read>(input: R) -> Result<()> {
    let mut reader = BitReader::new(input);
    match reader.read_bit()? {
        Some(_) => Err(StreamError::UnexpectedPayload.into()),
        None => Ok(()),
    }
}
