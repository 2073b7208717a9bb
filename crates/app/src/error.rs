//! Error type for the huffpack command-line tool.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Exit code for a successful run.
pub const EXIT_OK: u8 = 0;
/// Exit code for bad arguments.
pub const EXIT_USAGE: u8 = 1;
/// Exit code for an I/O failure.
pub const EXIT_IO: u8 = 2;
/// Exit code for input that is not a valid compressed file.
pub const EXIT_CORRUPT: u8 = 3;
/// Exit code for a failed round-trip verification.
pub const EXIT_VERIFY: u8 = 4;

#[derive(Debug, Error)]
pub enum AppError {
    /// Engine failure
    #[error(transparent)]
    Codec(#[from] huffpack_core::Error),

    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Decoding the output did not reproduce the input
    #[error("verification failed: input crc32 {expected:#010x}, decoded crc32 {actual:#010x}")]
    VerifyMismatch { expected: u32, actual: u32 },
}

impl AppError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Codec(e) if e.is_corrupt_input() => EXIT_CORRUPT,
            AppError::Codec(_) | AppError::Open { .. } | AppError::Create { .. } => EXIT_IO,
            AppError::VerifyMismatch { .. } => EXIT_VERIFY,
        }
    }
}
