use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod simulate;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode a payload into a wire frame.
    Encode(EncodeArgs),
    /// Run hex bytes through the frame parser.
    Decode(DecodeArgs),
    /// Send one payload across a simulated lossy link.
    Simulate(SimulateArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Simulate(args) => simulate::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Payload sources shared by `encode` and `simulate`; at most one may be given.
#[derive(Args, Debug, Default)]
pub struct PayloadArgs {
    /// Payload as a UTF-8 string.
    #[arg(long, conflicts_with_all = ["hex", "file"])]
    pub data: Option<String>,
    /// Payload as hex bytes (e.g. "10 20" or "1020").
    #[arg(long, conflicts_with_all = ["data", "file"])]
    pub hex: Option<String>,
    /// Read payload from file.
    #[arg(long, conflicts_with_all = ["data", "hex"])]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    #[command(flatten)]
    pub payload: PayloadArgs,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Wire bytes as hex (e.g. "02 02 10 20 30 03").
    pub hex: String,
    /// Largest accepted payload length.
    #[arg(long, default_value_t = ackwire_frame::MAX_PAYLOAD)]
    pub max_payload: usize,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub payload: PayloadArgs,
    /// Link configuration file (JSON); flags below override its fields.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Acknowledgment timeout per attempt, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,
    /// Retry bound.
    #[arg(long)]
    pub retries: Option<u8>,
    /// Drop every frame.
    #[arg(long)]
    pub total_loss: bool,
    /// Drop the first N frames.
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub drop: usize,
    /// Corrupt the checksum of the first N delivered frames.
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub corrupt: usize,
    /// Logical time advanced between ticks, in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 10)]
    pub step_ms: u64,
    /// Give up after this many ticks.
    #[arg(long, value_name = "N", default_value_t = 100_000)]
    pub max_ticks: usize,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

impl PayloadArgs {
    /// Resolve the payload bytes. No source at all yields an empty payload,
    /// which the encoder rejects with a data error.
    pub fn resolve(&self) -> CliResult<Vec<u8>> {
        if let Some(data) = &self.data {
            return Ok(data.as_bytes().to_vec());
        }
        if let Some(hex) = &self.hex {
            return crate::hex::from_hex(hex)
                .map_err(|err| crate::exit::CliError::usage(format!("--hex: {err}")));
        }
        if let Some(path) = &self.file {
            return std::fs::read(path).map_err(|err| {
                crate::exit::io_error(&format!("failed reading {}", path.display()), err)
            });
        }
        Ok(Vec::new())
    }
}
