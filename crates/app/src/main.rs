//! huffpack: static Huffman file compressor.
//!
//! ```text
//! huffpack compress <IN> <OUT> [--verify]
//! huffpack decompress <IN> <OUT>
//! huffpack inspect <FILE>
//! huffpack generate <OUT> [--size N] [--seed N] [--profile P]
//! ```
//!
//! Logs go to stderr, filtered by `RUST_LOG` or `--log-level`.

mod config;
mod error;
mod input_gen;
mod report;
mod verify;

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::process::ExitCode;

use huffpack_core::codec::{self, CodecConfig};
use huffpack_core::metrics::Metrics;
use huffpack_core::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use config::{Command, Config};
use error::{AppError, EXIT_OK, EXIT_USAGE};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match Config::from_args(&args) {
        Ok(config) => config,
        Err(msg) => {
            eprintln!("error: {}", msg);
            eprintln!("run `huffpack --help` for usage");
            return ExitCode::from(EXIT_USAGE);
        }
    };

    init_logging(&config.log_level);

    match run(&config) {
        Ok(()) => ExitCode::from(EXIT_OK),
        Err(e) => {
            error!(error = %e, "run failed");
            eprintln!("error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(config: &Config) -> Result<(), AppError> {
    let codec = CodecConfig {
        buffer_bytes: config.buffer_bytes,
    };

    match &config.command {
        Command::Help => {
            config::print_help();
        }
        Command::Compress { input, output } => {
            info!(input = %input.display(), output = %output.display(), "compressing");
            let metrics = compress_file(input, output, &codec)?;
            if config.verify {
                verify::verify_round_trip(input, output, &codec)?;
            }
            report_metrics(config, &metrics);
            if config.verify {
                println!("Verified: decoded output matches input");
            }
        }
        Command::Decompress { input, output } => {
            info!(input = %input.display(), output = %output.display(), "decompressing");
            let metrics = decompress_file(input, output, &codec)?;
            report_metrics(config, &metrics);
        }
        Command::Inspect { input } => {
            let inspection = codec::inspect(BufReader::new(open(input)?))?;
            print!("{}", report::format_inspection(&inspection));
        }
        Command::Generate {
            output,
            size,
            seed,
            profile,
        } => {
            info!(output = %output.display(), size, seed, %profile, "generating sample");
            input_gen::write_sample_file(output, *seed, *size, *profile).map_err(|source| {
                AppError::Create {
                    path: output.clone(),
                    source,
                }
            })?;
            println!(
                "Wrote {} bytes to {} (profile {}, seed {})",
                size,
                output.display(),
                profile,
                seed
            );
        }
    }
    Ok(())
}

fn compress_file(input: &Path, output: &Path, codec: &CodecConfig) -> Result<Metrics, AppError> {
    let reader = BufReader::new(open(input)?);
    let mut writer = BufWriter::new(create(output)?);
    let metrics = codec::compress(reader, &mut writer, codec)?;
    writer.flush().map_err(Error::WriteFault)?;
    Ok(metrics)
}

fn decompress_file(input: &Path, output: &Path, codec: &CodecConfig) -> Result<Metrics, AppError> {
    let reader = BufReader::new(open(input)?);
    let mut writer = BufWriter::new(create(output)?);
    let metrics = codec::decompress(reader, &mut writer, codec)?;
    writer.flush().map_err(Error::WriteFault)?;
    Ok(metrics)
}

fn report_metrics(config: &Config, metrics: &Metrics) {
    if config.print_metrics {
        metrics.print_summary();
    }
}

fn open(path: &Path) -> Result<File, AppError> {
    File::open(path).map_err(|source| AppError::Open {
        path: path.to_path_buf(),
        source,
    })
}

fn create(path: &Path) -> Result<File, AppError> {
    File::create(path).map_err(|source| AppError::Create {
        path: path.to_path_buf(),
        source,
    })
}
