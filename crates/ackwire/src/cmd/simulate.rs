use ackwire_session::{Link, LinkConfig, ReceiveResult, TransmitResult};
use ackwire_transport::{Clock, ManualClock, MemoryChannel};
use tracing::info;

use crate::cmd::SimulateArgs;
use crate::exit::{session_error, CliError, CliResult, DATA_INVALID, FAILURE, SUCCESS, TIMEOUT};
use crate::hex::to_hex;
use crate::output::{print_simulation, OutputFormat, SimulationReport};

pub fn run(args: SimulateArgs, format: OutputFormat) -> CliResult<i32> {
    let config = resolve_config(&args)?;
    let payload = args.payload.resolve()?;

    let mut link = Link::with_config(MemoryChannel::new(), ManualClock::new(), config)
        .map_err(|err| session_error("invalid link configuration", err))?;

    let channel = link.channel_mut();
    channel.set_total_loss(args.total_loss);
    channel.drop_next_frames(args.drop);
    channel.corrupt_next_frames(args.corrupt);

    link.send(payload)
        .map_err(|err| session_error("send failed", err))?;
    info!(
        total_loss = args.total_loss,
        drop = args.drop,
        corrupt = args.corrupt,
        step_ms = args.step_ms,
        "simulation started"
    );

    let result = link
        .run_until_complete(args.max_ticks, args.step_ms)
        .map_err(|err| session_error("simulation failed", err))?;

    let report = build_report(&link, result);
    print_simulation(&report, link.received_payload(), format);

    match result {
        Some(TransmitResult::Success) => Ok(SUCCESS),
        Some(TransmitResult::Timeout) => Ok(TIMEOUT),
        Some(TransmitResult::Encode(err)) => {
            Err(CliError::new(DATA_INVALID, format!("encode failed: {err}")))
        }
        None => Err(CliError::new(
            FAILURE,
            format!("transmission still pending after {} ticks", args.max_ticks),
        )),
    }
}

fn resolve_config(args: &SimulateArgs) -> CliResult<LinkConfig> {
    let mut config = match &args.config {
        Some(path) => LinkConfig::read_json_file(path).map_err(|err| {
            session_error(&format!("failed loading {}", path.display()), err)
        })?,
        None => LinkConfig::default(),
    };
    if let Some(timeout_ms) = args.timeout_ms {
        config.ack_timeout_ms = timeout_ms;
    }
    if let Some(retries) = args.retries {
        config.max_retries = retries;
    }
    // Validation happens in `Link::with_config`, after the overrides.
    Ok(config)
}

fn build_report(
    link: &Link<MemoryChannel, ManualClock>,
    result: Option<TransmitResult>,
) -> SimulationReport {
    let stats = link.channel().stats();
    SimulationReport {
        result: match result {
            Some(TransmitResult::Success) => "success",
            Some(TransmitResult::Timeout) => "timeout",
            Some(TransmitResult::Encode(_)) => "encode_error",
            None => "pending",
        },
        retries: link.retry_count(),
        transmissions: link.transmitter().transmissions(),
        ticks: link.ticks(),
        elapsed_ms: link.clock().now(),
        frames_sent: stats.frames_sent,
        frames_dropped: stats.frames_dropped,
        frames_corrupted: stats.frames_corrupted,
        acks_sent: stats.acks_sent,
        message_received: link.message_received(),
        receive_result: link.rx_result().map(|result| match result {
            ReceiveResult::Success => "success",
            ReceiveResult::ChecksumInvalid => "checksum_invalid",
            ReceiveResult::LengthInvalid => "length_invalid",
        }),
        received_hex: to_hex(link.received_payload()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::PayloadArgs;

    fn args() -> SimulateArgs {
        SimulateArgs {
            payload: PayloadArgs {
                data: Some("hi".to_string()),
                ..PayloadArgs::default()
            },
            config: None,
            timeout_ms: None,
            retries: None,
            total_loss: false,
            drop: 0,
            corrupt: 0,
            step_ms: 10,
            max_ticks: 1_000,
        }
    }

    #[test]
    fn flags_override_defaults() {
        let mut args = args();
        args.timeout_ms = Some(200);
        args.retries = Some(5);
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.ack_timeout_ms, 200);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.max_payload_size, 255);
    }

    #[test]
    fn flags_repair_an_invalid_config_file() {
        let path = std::env::temp_dir().join(format!(
            "ackwire-simulate-{}-override.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{"max_retries": 0, "ack_timeout_ms": 40}"#).unwrap();

        let mut args = args();
        args.config = Some(path.clone());
        args.retries = Some(3);
        let config = resolve_config(&args);
        let _ = std::fs::remove_file(&path);

        let config = config.unwrap();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.ack_timeout_ms, 40);
        assert!(Link::with_config(MemoryChannel::new(), ManualClock::new(), config).is_ok());
    }

    #[test]
    fn unrepaired_config_is_rejected_by_the_link() {
        let path = std::env::temp_dir().join(format!(
            "ackwire-simulate-{}-invalid.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{"max_retries": 0}"#).unwrap();

        let mut args = args();
        args.config = Some(path.clone());
        let result = run(args, OutputFormat::Json);
        let _ = std::fs::remove_file(&path);

        assert_eq!(result.unwrap_err().code, crate::exit::USAGE);
    }

    #[test]
    fn report_reflects_lossy_run() {
        let mut link = Link::new(MemoryChannel::new(), ManualClock::new());
        link.channel_mut().drop_next_frames(1);
        link.send(&b"hi"[..]).unwrap();
        let result = link.run_until_complete(1_000, 100).unwrap();

        let report = build_report(&link, result);
        assert_eq!(report.result, "success");
        assert_eq!(report.retries, 1);
        assert_eq!(report.transmissions, 2);
        assert_eq!(report.frames_dropped, 1);
        assert_eq!(report.received_hex, "68 69");
        assert_eq!(report.receive_result, Some("success"));
    }
}
