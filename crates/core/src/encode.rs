//! Bit stream encoder: input bytes to packed code bits.

use std::io::{Read, Write};

use tracing::debug;

use crate::bitio::{read_some, BitWriter, DEFAULT_BUFFER_BYTES};
use crate::error::{Error, Result};
use crate::tree::CodeTree;

/// Encode every byte of `input` with `tree` and write the packed payload plus
/// its padding trailer to `output`.
///
/// Returns the number of bytes written to `output`, trailer included.
///
/// # Errors
/// - `Error::ReadFault` / `Error::WriteFault` on I/O failure; bytes already
///   flushed stay written
/// - `Error::UnknownSymbol` if `input` holds a byte the tree has no leaf for
pub fn encode_stream<R: Read, W: Write>(tree: &CodeTree, input: R, output: W) -> Result<u64> {
    encode_stream_with(tree, input, output, DEFAULT_BUFFER_BYTES)
}

/// [`encode_stream`] with an explicit read and flush buffer size.
pub fn encode_stream_with<R: Read, W: Write>(
    tree: &CodeTree,
    mut input: R,
    output: W,
    buffer_bytes: usize,
) -> Result<u64> {
    // One leaf-to-root walk per distinct symbol, not per input byte
    let codes = tree.codes();
    let mut writer = BitWriter::with_capacity(output, buffer_bytes);
    let mut buffer = vec![0u8; buffer_bytes.max(1)];
    let mut bytes_read = 0u64;

    loop {
        let n = read_some(&mut input, &mut buffer)?;
        if n == 0 {
            break;
        }
        for &byte in &buffer[..n] {
            let code = codes[byte as usize].ok_or(Error::UnknownSymbol { symbol: byte })?;
            writer.write_bits(code.bits())?;
        }
        bytes_read += n as u64;
    }

    let bits = writer.bit_len();
    let written = writer.finish()?;
    debug!(bytes_read, bits, written, "encoded stream");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::FrequencyTable;
    use crate::tree::build_tree;

    fn tree_of(entries: &[(u8, f64)]) -> CodeTree {
        build_tree(&FrequencyTable::from_entries(entries.to_vec()).unwrap()).unwrap()
    }

    #[test]
    fn test_aaab() {
        let tree = tree_of(&[(b'A', 0.75), (b'B', 0.25)]);
        let mut out = Vec::new();
        let written = encode_stream(&tree, &b"AAAB"[..], &mut out).unwrap();

        // 1110 + 4 padding bits
        assert_eq!(out, vec![0b1110_0000, 4]);
        assert_eq!(written, 2);
    }

    #[test]
    fn test_three_bit_code_padding() {
        let tree = tree_of(&[(b'A', 0.5), (b'B', 0.25), (b'C', 0.125), (b'D', 0.125)]);
        let mut out = Vec::new();
        encode_stream(&tree, &b"C"[..], &mut out).unwrap();

        assert_eq!(out, vec![0b0010_0000, 5]);
    }

    #[test]
    fn test_byte_aligned_payload() {
        let tree = tree_of(&[(b'A', 0.5), (b'B', 0.25), (b'C', 0.125), (b'D', 0.125)]);
        let mut out = Vec::new();
        // 1 01 001 000 01 11111 is exactly two bytes
        encode_stream(&tree, &b"ABCDBAAAAA"[..], &mut out).unwrap();

        assert_eq!(out, vec![0b1010_0100, 0b0011_1111, 0]);
    }

    #[test]
    fn test_single_symbol() {
        let tree = tree_of(&[(b'x', 1.0)]);
        let mut out = Vec::new();
        encode_stream(&tree, &b"xxxxxxxxxx"[..], &mut out).unwrap();
        assert_eq!(out, vec![0xFF, 0b1100_0000, 6]);
    }

    #[test]
    fn test_empty_input() {
        let tree = tree_of(&[(b'x', 1.0)]);
        let mut out = Vec::new();
        assert_eq!(encode_stream(&tree, &b""[..], &mut out).unwrap(), 1);
        assert_eq!(out, vec![0]);
    }

    #[test]
    fn test_unknown_symbol() {
        let tree = tree_of(&[(b'A', 0.5), (b'B', 0.5)]);
        let result = encode_stream(&tree, &b"ABC"[..], Vec::new());
        assert!(matches!(result, Err(Error::UnknownSymbol { symbol: b'C' })));
    }

    #[test]
    fn test_tiny_buffers_match_default() {
        let entries: Vec<(u8, f64)> = (0..=255u8).map(|b| (b, 1.0 / 256.0)).collect();
        let tree = tree_of(&entries);
        let input: Vec<u8> = (0..1000u32).map(|i| (i * 31 % 256) as u8).collect();

        let mut expected = Vec::new();
        encode_stream(&tree, input.as_slice(), &mut expected).unwrap();

        for buffer_bytes in [1, 2, 3, 7] {
            let mut out = Vec::new();
            encode_stream_with(&tree, input.as_slice(), &mut out, buffer_bytes).unwrap();
            assert_eq!(out, expected, "buffer {buffer_bytes}");
        }
    }
}
