//! Sample input generation.
//!
//! `huffpack generate` writes deterministic files whose byte distributions
//! exercise different parts of the codec:
//! - `text`: words over a lowercase alphabet, letter frequencies roughly
//!   like English prose
//! - `runs`: long runs of a few byte values
//! - `random`: uniform bytes, close to incompressible
//! - `skewed`: byte `k` drawn with probability about `2^-(k+1)`, which
//!   produces long codes
//! - `mixed`: 8 KiB chunks, each from one of the profiles above

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const CHUNK_BYTES: usize = 8192;

/// Letters ordered by frequency in English text.
const LETTERS: &[u8] = b"etaoinshrdlcumwfgypbvkjxqz";

/// Byte distribution of a generated file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Text,
    Runs,
    Random,
    Skewed,
    Mixed,
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Profile::Text),
            "runs" => Ok(Profile::Runs),
            "random" => Ok(Profile::Random),
            "skewed" => Ok(Profile::Skewed),
            "mixed" => Ok(Profile::Mixed),
            other => Err(format!("unknown profile: {}", other)),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Profile::Text => "text",
            Profile::Runs => "runs",
            Profile::Random => "random",
            Profile::Skewed => "skewed",
            Profile::Mixed => "mixed",
        };
        f.write_str(name)
    }
}

/// Generate exactly `size_bytes` bytes of sample data.
///
/// The same `(seed, size_bytes, profile)` always yields the same bytes.
pub fn generate_sample_data(seed: u64, size_bytes: usize, profile: Profile) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(size_bytes);

    while data.len() < size_bytes {
        let chunk = (size_bytes - data.len()).min(CHUNK_BYTES);
        let kind = match profile {
            Profile::Text => Chunk::Text,
            Profile::Runs => Chunk::Runs,
            Profile::Random => Chunk::Random,
            Profile::Skewed => Chunk::Skewed,
            Profile::Mixed => match rng.gen_range(0..10) {
                0..=2 => Chunk::Text,
                3..=5 => Chunk::Runs,
                6..=7 => Chunk::Skewed,
                _ => Chunk::Random,
            },
        };
        fill_chunk(&mut rng, &mut data, chunk, kind);
    }

    data.truncate(size_bytes);
    data
}

#[derive(Clone, Copy)]
enum Chunk {
    Text,
    Runs,
    Random,
    Skewed,
}

fn fill_chunk(rng: &mut ChaCha8Rng, data: &mut Vec<u8>, len: usize, kind: Chunk) {
    let end = data.len() + len;
    match kind {
        Chunk::Text => {
            while data.len() < end {
                let word_len = rng.gen_range(1..=9);
                for _ in 0..word_len {
                    // squaring biases toward the front of LETTERS
                    let x: f64 = rng.gen();
                    let idx = ((x * x) * LETTERS.len() as f64) as usize;
                    data.push(LETTERS[idx.min(LETTERS.len() - 1)]);
                }
                data.push(if rng.gen_ratio(1, 12) { b'\n' } else { b' ' });
            }
        }
        Chunk::Runs => {
            let palette: [u8; 4] = rng.gen();
            while data.len() < end {
                let byte = palette[rng.gen_range(0..palette.len())];
                let run = rng.gen_range(16..=512);
                data.extend(std::iter::repeat(byte).take(run));
            }
        }
        Chunk::Random => {
            data.extend((0..len).map(|_| rng.gen::<u8>()));
        }
        Chunk::Skewed => {
            data.extend((0..len).map(|_| {
                let mut k = 0u8;
                while k < u8::MAX && rng.gen_bool(0.5) {
                    k += 1;
                }
                k
            }));
        }
    }
    data.truncate(end);
}

/// Write generated data to a file.
pub fn write_sample_file(path: &Path, seed: u64, size_bytes: usize, profile: Profile) -> io::Result<()> {
    let data = generate_sample_data(seed, size_bytes, profile);
    let mut file = BufWriter::new(File::create(path)?);
    file.write_all(&data)?;
    file.flush()
}
