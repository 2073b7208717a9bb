//! Metrics collection and reporting for a single codec run.
//!
//! This module provides observable insights into a compression or
//! decompression run:
//! - Byte counts on both sides, with the header/payload split
//! - Compression ratio
//! - Alphabet size
//! - Timing and throughput
//!
//! A run is single-threaded and owns its `Metrics`; nothing here is
//! shared.

use std::time::{Duration, Instant};

/// Which way the data flowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Compress,
    Decompress,
}

/// Metrics for one codec run.
#[derive(Debug, Clone)]
pub struct Metrics {
    // === Timing ===
    /// When the run started
    pub start_time: Instant,

    /// When the run ended (set on completion)
    pub end_time: Option<Instant>,

    pub direction: Direction,

    // === Input/Output ===
    /// Bytes read from the source
    pub input_bytes: u64,

    /// Bytes written to the sink
    pub output_bytes: u64,

    // === Compressed layout ===
    /// Header size on the compressed side
    pub header_bytes: u64,

    /// Payload plus trailer size on the compressed side
    pub payload_bytes: u64,

    /// Distinct byte values in the frequency table
    pub distinct_symbols: usize,
}

impl Metrics {
    /// Create new metrics with start time set to now.
    pub fn new(direction: Direction) -> Self {
        Self {
            start_time: Instant::now(),
            end_time: None,
            direction,
            input_bytes: 0,
            output_bytes: 0,
            header_bytes: 0,
            payload_bytes: 0,
            distinct_symbols: 0,
        }
    }

    /// Mark the run as complete.
    pub fn complete(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Elapsed time, up to completion if the run has finished.
    pub fn duration(&self) -> Duration {
        match self.end_time {
            Some(end) => end.duration_since(self.start_time),
            None => self.start_time.elapsed(),
        }
    }

    /// Size of the uncompressed side.
    pub fn raw_bytes(&self) -> u64 {
        match self.direction {
            Direction::Compress => self.input_bytes,
            Direction::Decompress => self.output_bytes,
        }
    }

    /// Size of the compressed side.
    pub fn compressed_bytes(&self) -> u64 {
        match self.direction {
            Direction::Compress => self.output_bytes,
            Direction::Decompress => self.input_bytes,
        }
    }

    /// Compute compression ratio (compressed / raw).
    ///
    /// Returns 0.0 if there was no raw data.
    pub fn compression_ratio(&self) -> f64 {
        let raw = self.raw_bytes();
        if raw == 0 {
            0.0
        } else {
            self.compressed_bytes() as f64 / raw as f64
        }
    }

    /// Average payload bits per raw byte, trailer excluded.
    pub fn bits_per_byte(&self) -> f64 {
        let raw = self.raw_bytes();
        if raw == 0 {
            0.0
        } else {
            self.payload_bytes.saturating_sub(1) as f64 * 8.0 / raw as f64
        }
    }

    /// Compute throughput in raw bytes/second.
    pub fn throughput_bps(&self) -> f64 {
        let duration_secs = self.duration().as_secs_f64();
        if duration_secs == 0.0 {
            0.0
        } else {
            self.raw_bytes() as f64 / duration_secs
        }
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        let title = match self.direction {
            Direction::Compress => "Compression",
            Direction::Decompress => "Decompression",
        };

        println!("\n=== {} Summary ===", title);
        println!("Duration: {} ms", self.duration().as_millis());
        println!();
        println!("Input:  {} bytes ({:.2} MiB)", self.input_bytes, mib(self.input_bytes));
        println!("Output: {} bytes ({:.2} MiB)", self.output_bytes, mib(self.output_bytes));
        println!();
        println!("Symbols: {}", self.distinct_symbols);
        println!("Header:  {} bytes", self.header_bytes);
        println!("Payload: {} bytes (incl. trailer)", self.payload_bytes);
        println!("Ratio: {:.1}%", self.compression_ratio() * 100.0);
        println!("Bits per byte: {:.3}", self.bits_per_byte());
        println!();
        println!("Throughput: {:.2} MB/s", self.throughput_bps() / 1_000_000.0);
        println!();
    }

    /// Export as `key=value` lines.
    pub fn export_text(&self) -> String {
        format!(
            "duration_ms={}\n\
             input_bytes={}\n\
             output_bytes={}\n\
             header_bytes={}\n\
             payload_bytes={}\n\
             distinct_symbols={}\n\
             compression_ratio={:.4}\n",
            self.duration().as_millis(),
            self.input_bytes,
            self.output_bytes,
            self.header_bytes,
            self.payload_bytes,
            self.distinct_symbols,
            self.compression_ratio(),
        )
    }
}

fn mib(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}
