//! huffpack-core: static byte-oriented Huffman compression engine
//!
//! This library compresses arbitrary binary data with a Huffman code built
//! from a single pass over the input:
//! - Counts byte frequencies and normalizes them into a probability table
//! - Builds a deterministic code tree from that table in a fixed-size arena
//! - Persists only the table; the decoder rebuilds the identical tree
//! - Streams code bits through fixed-size buffers in both directions
//!
//! # Architecture
//!
//! The system is designed around clear module boundaries:
//! - `bitio`: Bit accumulator and streaming bit reader/writer
//! - `frequency`: Byte counting and the frequency table
//! - `tree`: Code tree builder over a node arena
//! - `header`: Frequency table header codec
//! - `encode`: Bytes to packed code bits
//! - `decode`: Packed code bits to bytes
//! - `codec`: Whole-file pipeline tying the above together
//! - `metrics`: Observable run statistics
//!
//! # Example
//! ```
//! use huffpack_core::codec::{compress_bytes, decompress_bytes};
//!
//! let compressed = compress_bytes(b"AAAB").unwrap();
//! assert_eq!(decompress_bytes(&compressed).unwrap(), b"AAAB");
//! ```
//!
//! # Design Principles
//!
//! - **No panics**: All errors are structured and recoverable
//! - **Bounded memory**: Buffers have fixed sizes regardless of input length
//! - **Deterministic**: The same table always yields the same tree

pub mod bitio;
pub mod codec;
pub mod decode;
pub mod encode;
pub mod error;
pub mod frequency;
pub mod header;
pub mod metrics;
pub mod tree;

// Re-export commonly used types
pub use codec::{compress, decompress, CodecConfig};
pub use decode::decode_stream;
pub use encode::encode_stream;
pub use error::{Error, Result};
pub use frequency::{count_frequencies, FrequencyTable};
pub use header::{read_header, write_header};
pub use tree::{build_tree, CodeTree};
