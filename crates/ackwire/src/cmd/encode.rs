use ackwire_frame::{
    compute_checksum, encode_capacity, encode_frame, validate_payload, MAX_PAYLOAD,
};

use crate::cmd::EncodeArgs;
use crate::exit::{encode_error, CliResult, SUCCESS};
use crate::hex::to_hex;
use crate::output::{print_encoded, EncodedFrame, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let payload = args.payload.resolve()?;
    validate_payload(&payload, MAX_PAYLOAD).map_err(|err| encode_error("encode failed", err))?;

    let mut frame = vec![0u8; encode_capacity(payload.len())];
    let written =
        encode_frame(&payload, &mut frame).map_err(|err| encode_error("encode failed", err))?;
    frame.truncate(written);

    let report = EncodedFrame {
        payload_len: payload.len(),
        checksum: compute_checksum(&payload),
        frame_len: written,
        frame_hex: to_hex(&frame),
    };
    print_encoded(&report, &frame, format);
    Ok(SUCCESS)
}
