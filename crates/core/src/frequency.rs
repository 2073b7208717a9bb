//! Byte frequency model.
//!
//! A single pass over the input produces a count per byte value; the counts
//! are then normalized into a [`FrequencyTable`] of probabilities, which is
//! the only thing persisted about the code tree.

use std::io::Read;

use tracing::debug;

use crate::bitio::{read_some, DEFAULT_BUFFER_BYTES};
use crate::error::{HeaderError, Result};

/// Size of the byte alphabet.
pub const ALPHABET_SIZE: usize = 256;

/// Allowed deviation of the probability sum from 1.0.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Raw occurrence counts for every byte value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteCounts {
    counts: [u64; ALPHABET_SIZE],
    total: u64,
}

impl ByteCounts {
    pub fn new() -> Self {
        Self {
            counts: [0; ALPHABET_SIZE],
            total: 0,
        }
    }

    /// Add every byte of `bytes` to the counts.
    pub fn update(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.counts[byte as usize] += 1;
        }
        self.total += bytes.len() as u64;
    }

    /// Fold another set of counts into this one.
    pub fn merge(&mut self, other: &ByteCounts) {
        for (mine, theirs) in self.counts.iter_mut().zip(other.counts.iter()) {
            *mine += theirs;
        }
        self.total += other.total;
    }

    pub fn count(&self, byte: u8) -> u64 {
        self.counts[byte as usize]
    }

    /// Total number of bytes counted.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of byte values seen at least once.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Normalize the counts into a probability table.
    pub fn to_table(&self) -> FrequencyTable {
        FrequencyTable::from_counts(&self.counts, self.total)
    }
}

impl Default for ByteCounts {
    fn default() -> Self {
        Self::new()
    }
}

/// Ordered `(byte value, probability)` pairs.
///
/// # Invariants
/// - byte values are strictly increasing
/// - every probability is finite and positive
/// - a non-empty table sums to 1.0 within [`PROBABILITY_TOLERANCE`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrequencyTable {
    entries: Vec<(u8, f64)>,
}

impl FrequencyTable {
    /// Build a table from raw counts. Bytes with a zero count are omitted.
    pub fn from_counts(counts: &[u64; ALPHABET_SIZE], total: u64) -> Self {
        if total == 0 {
            return Self::default();
        }
        let entries = counts
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(byte, &count)| (byte as u8, count as f64 / total as f64))
            .collect();
        Self { entries }
    }

    /// Build a table from explicit entries, checking every invariant.
    ///
    /// # Errors
    /// - `HeaderError::TooManyEntries` for more than 256 entries
    /// - `HeaderError::NonIncreasingSymbol` if byte values repeat or decrease
    /// - `HeaderError::InvalidProbability` for a non-finite or non-positive value
    /// - `HeaderError::ProbabilitySum` if a non-empty table does not sum to 1.0
    pub fn from_entries(entries: Vec<(u8, f64)>) -> std::result::Result<Self, HeaderError> {
        if entries.len() > ALPHABET_SIZE {
            return Err(HeaderError::TooManyEntries {
                count: entries.len(),
            });
        }

        let mut previous: Option<u8> = None;
        let mut sum = 0.0;
        for &(symbol, probability) in &entries {
            if let Some(previous) = previous {
                if symbol <= previous {
                    return Err(HeaderError::NonIncreasingSymbol { previous, symbol });
                }
            }
            if !probability.is_finite() || probability <= 0.0 {
                return Err(HeaderError::InvalidProbability {
                    symbol,
                    probability,
                });
            }
            previous = Some(symbol);
            sum += probability;
        }

        if !entries.is_empty() && (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(HeaderError::ProbabilitySum { sum });
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[(u8, f64)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Probability of `symbol`, or `None` if it never occurs.
    pub fn probability(&self, symbol: u8) -> Option<f64> {
        self.entries
            .binary_search_by_key(&symbol, |&(s, _)| s)
            .ok()
            .map(|i| self.entries[i].1)
    }

    /// Size of this table once serialized as a header.
    pub fn header_len(&self) -> usize {
        2 + self.entries.len() * 9
    }
}

/// Scan `reader` to completion and build its frequency table.
///
/// Returns the table and the total number of bytes read. The caller must
/// rewind or reopen the source before encoding it.
///
/// # Errors
/// Returns `Error::ReadFault` if the source fails before end-of-stream.
pub fn count_frequencies<R: Read>(mut reader: R) -> Result<(FrequencyTable, u64)> {
    let mut counts = ByteCounts::new();
    let mut buffer = vec![0u8; DEFAULT_BUFFER_BYTES];

    loop {
        let n = read_some(&mut reader, &mut buffer)?;
        if n == 0 {
            break;
        }
        counts.update(&buffer[..n]);
    }

    let table = counts.to_table();
    debug!(
        total = counts.total(),
        distinct = table.len(),
        "counted byte frequencies"
    );
    Ok((table, counts.total()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::io;

    #[test]
    fn test_count_aaab() {
        let (table, total) = count_frequencies(&b"AAAB"[..]).unwrap();
        assert_eq!(total, 4);
        assert_eq!(table.entries(), &[(b'A', 0.75), (b'B', 0.25)]);
        assert_eq!(table.probability(b'B'), Some(0.25));
        assert_eq!(table.probability(b'C'), None);
    }

    #[test]
    fn test_count_empty() {
        let (table, total) = count_frequencies(io::empty()).unwrap();
        assert_eq!(total, 0);
        assert!(table.is_empty());
        assert_eq!(table.header_len(), 2);
    }

    #[test]
    fn test_count_longer_than_buffer() {
        let data: Vec<u8> = (0..DEFAULT_BUFFER_BYTES * 3 + 17)
            .map(|i| (i % 7) as u8)
            .collect();
        let (table, total) = count_frequencies(data.as_slice()).unwrap();
        assert_eq!(total, data.len() as u64);
        assert_eq!(table.len(), 7);

        let sum: f64 = table.entries().iter().map(|&(_, p)| p).sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_count_read_fault() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "unplugged"))
            }
        }
        assert!(matches!(count_frequencies(Broken), Err(Error::ReadFault(_))));
    }

    #[test]
    fn test_byte_counts_merge() {
        let mut a = ByteCounts::new();
        a.update(b"hello");
        let mut b = ByteCounts::new();
        b.update(b"world");
        a.merge(&b);

        assert_eq!(a.total(), 10);
        assert_eq!(a.count(b'l'), 3);
        assert_eq!(a.count(b'o'), 2);
        assert_eq!(a.distinct(), 7);
    }

    #[test]
    fn test_from_entries_valid() {
        let table = FrequencyTable::from_entries(vec![(1, 0.5), (7, 0.25), (200, 0.25)]).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.header_len(), 29);
    }

    #[test]
    fn test_from_entries_rejects_bad_sum() {
        let result = FrequencyTable::from_entries(vec![(0x41, 0.5)]);
        assert_eq!(result, Err(HeaderError::ProbabilitySum { sum: 0.5 }));
    }

    #[test]
    fn test_from_entries_rejects_order() {
        let result = FrequencyTable::from_entries(vec![(5, 0.5), (5, 0.5)]);
        assert_eq!(
            result,
            Err(HeaderError::NonIncreasingSymbol {
                previous: 5,
                symbol: 5
            })
        );

        let result = FrequencyTable::from_entries(vec![(9, 0.5), (3, 0.5)]);
        assert!(matches!(
            result,
            Err(HeaderError::NonIncreasingSymbol { .. })
        ));
    }

    #[test]
    fn test_from_entries_rejects_bad_probability() {
        for bad in [0.0, -0.5, f64::NAN, f64::INFINITY] {
            let result = FrequencyTable::from_entries(vec![(1, bad), (2, 1.0)]);
            assert!(matches!(
                result,
                Err(HeaderError::InvalidProbability { symbol: 1, .. })
            ));
        }
    }

    #[test]
    fn test_from_entries_empty_is_valid() {
        let table = FrequencyTable::from_entries(Vec::new()).unwrap();
        assert!(table.is_empty());
    }
}
