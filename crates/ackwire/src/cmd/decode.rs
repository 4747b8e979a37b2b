use ackwire_frame::{FrameConfig, FrameParser, Outcome};
use tracing::debug;

use crate::cmd::DecodeArgs;
use crate::exit::{CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::hex::{from_hex, to_hex};
use crate::output::{payload_text, print_decode, DecodeEvent, DecodeReport, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = from_hex(&args.hex).map_err(|err| CliError::usage(format!("decode: {err}")))?;
    let report = decode_stream(&bytes, &FrameConfig::with_max_payload(args.max_payload));
    print_decode(&report, format);

    if report.frames_accepted == 0 && report.frames_rejected > 0 {
        return Err(CliError::new(DATA_INVALID, "no valid frame in input"));
    }
    Ok(SUCCESS)
}

fn decode_stream(bytes: &[u8], config: &FrameConfig) -> DecodeReport {
    let mut parser = FrameParser::with_config(config);
    let mut events = Vec::new();

    for (offset, &byte) in bytes.iter().enumerate() {
        let outcome = parser.feed(byte);
        let event = match outcome {
            Outcome::Waiting => continue,
            Outcome::FrameReady => {
                let payload = parser.take_frame().map(|frame| frame.payload).unwrap_or_default();
                DecodeEvent {
                    offset,
                    outcome: "frame_ready",
                    payload_hex: Some(to_hex(&payload)),
                    payload_text: payload_text(&payload),
                }
            }
            Outcome::ChecksumInvalid => DecodeEvent {
                offset,
                outcome: "checksum_invalid",
                payload_hex: None,
                payload_text: None,
            },
            Outcome::LengthInvalid => DecodeEvent {
                offset,
                outcome: "length_invalid",
                payload_hex: None,
                payload_text: None,
            },
        };
        debug!(offset, outcome = event.outcome, "parser outcome");
        events.push(event);
    }

    let stats = parser.stats();
    DecodeReport {
        bytes_fed: bytes.len(),
        frames_accepted: stats.frames_accepted,
        frames_rejected: stats.checksum_failures + stats.length_failures,
        trailing_state: format!("{:?}", parser.state()),
        events,
    }
}
