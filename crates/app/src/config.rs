//! Configuration for the huffpack command-line tool.
//!
//! Handles parsing command-line arguments into a [`Config`]. Every option
//! has a default, so only the command and its paths are required.

use std::path::PathBuf;

use huffpack_core::bitio::{DEFAULT_BUFFER_BYTES, MIN_READER_BUFFER_BYTES};

use crate::input_gen::Profile;

/// Default size of generated sample files.
const DEFAULT_SAMPLE_BYTES: usize = 1024 * 1024;

/// What the tool has been asked to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Compress { input: PathBuf, output: PathBuf },
    Decompress { input: PathBuf, output: PathBuf },
    /// Print the symbol table stored in a compressed file
    Inspect { input: PathBuf },
    /// Write deterministic sample input
    Generate {
        output: PathBuf,
        size: usize,
        seed: u64,
        profile: Profile,
    },
    Help,
}

/// Complete configuration for a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub command: Command,

    // === Codec ===
    /// Accumulator and staging buffer size in bytes
    pub buffer_bytes: usize,

    /// Decode the output after compressing and compare checksums
    pub verify: bool,

    // === Behavior ===
    /// Whether to print the metrics summary
    pub print_metrics: bool,

    /// Default log filter when RUST_LOG is unset
    pub log_level: String,
}

impl Config {
    /// Parse configuration from command-line arguments (program name
    /// excluded).
    pub fn from_args(args: &[String]) -> Result<Self, String> {
        let mut positional: Vec<&str> = Vec::new();
        let mut buffer_bytes: Option<usize> = None;
        let mut size: Option<usize> = None;
        let mut seed: Option<u64> = None;
        let mut profile: Option<Profile> = None;
        let mut verify = false;
        let mut print_metrics = true;
        let mut log_level = String::from("warn");

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--buffer-bytes" => {
                    let value = value_of(args, &mut i, "--buffer-bytes", "a number")?;
                    let n: usize = value.parse().map_err(|_| "invalid buffer-bytes")?;
                    if n < MIN_READER_BUFFER_BYTES {
                        return Err(format!(
                            "--buffer-bytes must be at least {}",
                            MIN_READER_BUFFER_BYTES
                        ));
                    }
                    buffer_bytes = Some(n);
                }
                "--size" => {
                    let value = value_of(args, &mut i, "--size", "a number")?;
                    size = Some(value.parse().map_err(|_| "invalid size")?);
                }
                "--seed" => {
                    let value = value_of(args, &mut i, "--seed", "a number")?;
                    seed = Some(value.parse().map_err(|_| "invalid seed")?);
                }
                "--profile" => {
                    let value = value_of(args, &mut i, "--profile", "a profile name")?;
                    profile = Some(value.parse()?);
                }
                "--log-level" => {
                    log_level = value_of(args, &mut i, "--log-level", "a level")?.to_string();
                }
                "--verify" => {
                    verify = true;
                }
                "--quiet" | "--no-metrics" => {
                    print_metrics = false;
                }
                "--help" | "-h" => {
                    return Ok(Config {
                        command: Command::Help,
                        buffer_bytes: DEFAULT_BUFFER_BYTES,
                        verify,
                        print_metrics,
                        log_level,
                    });
                }
                arg if arg.starts_with("--") => {
                    return Err(format!("unknown argument: {}", arg));
                }
                arg => positional.push(arg),
            }
            i += 1;
        }

        let command = match positional.as_slice() {
            ["compress", input, output] => Command::Compress {
                input: PathBuf::from(input),
                output: PathBuf::from(output),
            },
            ["decompress", input, output] => Command::Decompress {
                input: PathBuf::from(input),
                output: PathBuf::from(output),
            },
            ["inspect", input] => Command::Inspect {
                input: PathBuf::from(input),
            },
            ["generate", output] => Command::Generate {
                output: PathBuf::from(output),
                size: size.unwrap_or(DEFAULT_SAMPLE_BYTES),
                seed: seed.unwrap_or_else(time_seed),
                profile: profile.unwrap_or(Profile::Mixed),
            },
            [] => return Err("missing command".to_string()),
            [name, ..] if is_command(name) => {
                return Err(format!("wrong number of arguments for {}", name));
            }
            [name, ..] => return Err(format!("unknown command: {}", name)),
        };

        if verify && !matches!(command, Command::Compress { .. }) {
            return Err("--verify only applies to compress".to_string());
        }

        Ok(Config {
            command,
            buffer_bytes: buffer_bytes.unwrap_or(DEFAULT_BUFFER_BYTES),
            verify,
            print_metrics,
            log_level,
        })
    }
}

/// Advance past a flag and return its value.
fn value_of<'a>(args: &'a [String], i: &mut usize, flag: &str, what: &str) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("{} requires {}", flag, what))
}

fn is_command(name: &str) -> bool {
    matches!(name, "compress" | "decompress" | "inspect" | "generate")
}

fn time_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

pub fn print_help() {
    println!("huffpack: static Huffman file compressor");
    println!();
    println!("USAGE:");
    println!("    huffpack compress <IN> <OUT> [OPTIONS]");
    println!("    huffpack decompress <IN> <OUT> [OPTIONS]");
    println!("    huffpack inspect <FILE>");
    println!("    huffpack generate <OUT> [--size N] [--seed N] [--profile P]");
    println!();
    println!("OPTIONS:");
    println!("    --buffer-bytes <N>      Bit buffer size (default: {})", DEFAULT_BUFFER_BYTES);
    println!("    --verify                Decode the output and compare CRC32 (compress only)");
    println!("    --quiet, --no-metrics   Don't print the metrics summary");
    println!("    --log-level <LEVEL>     Log filter when RUST_LOG is unset (default: warn)");
    println!();
    println!("    --size <N>              Sample size in bytes (default: {})", DEFAULT_SAMPLE_BYTES);
    println!("    --seed <N>              Sample seed (default: time-based)");
    println!("    --profile <P>           text, runs, random, skewed or mixed (default: mixed)");
    println!("    --help, -h              Print this help");
    println!();
    println!("EXIT CODES:");
    println!("    0 success, 1 usage, 2 I/O failure, 3 corrupt input, 4 verification failed");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config, String> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        Config::from_args(&args)
    }

    #[test]
    fn test_compress_defaults() {
        let config = parse(&["compress", "a.bin", "a.huff"]).unwrap();
        assert_eq!(
            config.command,
            Command::Compress {
                input: PathBuf::from("a.bin"),
                output: PathBuf::from("a.huff"),
            }
        );
        assert_eq!(config.buffer_bytes, DEFAULT_BUFFER_BYTES);
        assert!(!config.verify);
        assert!(config.print_metrics);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_flags_anywhere() {
        let config = parse(&[
            "--quiet",
            "compress",
            "in",
            "--buffer-bytes",
            "64",
            "out",
            "--verify",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(config.buffer_bytes, 64);
        assert!(config.verify);
        assert!(!config.print_metrics);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_generate() {
        let config = parse(&["generate", "s.bin", "--size", "100", "--seed", "7", "--profile", "runs"])
            .unwrap();
        assert_eq!(
            config.command,
            Command::Generate {
                output: PathBuf::from("s.bin"),
                size: 100,
                seed: 7,
                profile: Profile::Runs,
            }
        );
    }

    #[test]
    fn test_help() {
        assert_eq!(parse(&["--help"]).unwrap().command, Command::Help);
        assert_eq!(parse(&["compress", "-h"]).unwrap().command, Command::Help);
    }

    #[test]
    fn test_errors() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["compress", "only-one"]).unwrap_err().contains("wrong number"));
        assert!(parse(&["explode", "x"]).unwrap_err().contains("unknown command"));
        assert!(parse(&["inspect", "f", "--bogus"]).unwrap_err().contains("unknown argument"));
        assert!(parse(&["compress", "a", "b", "--buffer-bytes"]).is_err());
        assert!(parse(&["compress", "a", "b", "--buffer-bytes", "1"]).is_err());
        assert!(parse(&["compress", "a", "b", "--buffer-bytes", "2"]).is_err());
        assert_eq!(parse(&["compress", "a", "b", "--buffer-bytes", "3"]).unwrap().buffer_bytes, 3);
        assert!(parse(&["decompress", "a", "b", "--verify"]).is_err());
        assert!(parse(&["generate", "o", "--profile", "noise"]).is_err());
    }
}
