//! Byte-driven frame decoder.
//!
//! [`FrameParser`] consumes exactly one byte per [`feed`](FrameParser::feed)
//! call and keeps its position across calls:
//!
//! ```text
//!  AwaitingStart ──0x02──▶ AwaitingLength ──1..=max──▶ AwaitingPayload
//!       ▲   ▲                    │ 0 / >max                 │ LEN bytes
//!       │   └── LengthInvalid ───┘                          ▼
//!       │                                          AwaitingChecksum
//!       │                                                   │ any
//!       └──── FrameReady / ChecksumInvalid ◀── AwaitingEnd ◀┘
//! ```
//!
//! Bytes seen while hunting for a start marker are skipped, and every
//! terminal outcome returns to `AwaitingStart`, so the parser resynchronizes
//! on its own after noise or a damaged frame.

use bytes::Bytes;
use tracing::debug;

use crate::codec::{Frame, FrameConfig, END, MAX_PAYLOAD, START};

/// Capacity of the payload accumulator.
pub const PAYLOAD_CAPACITY: usize = MAX_PAYLOAD + 1;

/// Position of the parser within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParserState {
    #[default]
    AwaitingStart,
    AwaitingLength,
    AwaitingPayload,
    AwaitingChecksum,
    AwaitingEnd,
}

/// Result of feeding one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// More bytes are needed.
    Waiting,
    /// A complete frame passed checksum and end-marker validation.
    FrameReady,
    /// Bad end marker or checksum mismatch.
    ChecksumInvalid,
    /// The length byte was zero or above the configured maximum.
    LengthInvalid,
}

impl Outcome {
    /// `true` for every outcome that ends an acquisition.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Outcome::Waiting)
    }
}

/// Counters of terminal outcomes seen by one parser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserStats {
    pub frames_accepted: u64,
    pub checksum_failures: u64,
    pub length_failures: u64,
}

/// Parser context for one receiving endpoint.
#[derive(Debug, Clone)]
pub struct FrameParser {
    state: ParserState,
    max_payload: usize,
    expected_len: usize,
    payload: [u8; PAYLOAD_CAPACITY],
    count: usize,
    running_checksum: u8,
    received_checksum: u8,
    frame_ready: bool,
    stats: ParserStats,
}

impl FrameParser {
    /// Create a parser accepting payloads up to 255 bytes.
    pub fn new() -> Self {
        Self::with_config(&FrameConfig::default())
    }

    /// Create a parser with an explicit payload limit.
    pub fn with_config(config: &FrameConfig) -> Self {
        Self {
            state: ParserState::AwaitingStart,
            max_payload: config.max_payload_size.clamp(1, MAX_PAYLOAD),
            expected_len: 0,
            payload: [0u8; PAYLOAD_CAPACITY],
            count: 0,
            running_checksum: 0,
            received_checksum: 0,
            frame_ready: false,
            stats: ParserStats::default(),
        }
    }

    /// Feed a single byte and report what it completed, if anything.
    pub fn feed(&mut self, byte: u8) -> Outcome {
        match self.state {
            ParserState::AwaitingStart => {
                if byte == START {
                    self.count = 0;
                    self.running_checksum = 0;
                    self.frame_ready = false;
                    self.state = ParserState::AwaitingLength;
                }
                Outcome::Waiting
            }
            ParserState::AwaitingLength => {
                let len = usize::from(byte);
                if len == 0 || len > self.max_payload {
                    debug!(len, max = self.max_payload, "rejecting frame length");
                    self.stats.length_failures += 1;
                    self.reset();
                    return Outcome::LengthInvalid;
                }
                self.expected_len = len;
                self.state = ParserState::AwaitingPayload;
                Outcome::Waiting
            }
            ParserState::AwaitingPayload => {
                self.payload[self.count] = byte;
                self.count += 1;
                self.running_checksum = self.running_checksum.wrapping_add(byte);
                if self.count >= self.expected_len {
                    self.state = ParserState::AwaitingChecksum;
                }
                Outcome::Waiting
            }
            ParserState::AwaitingChecksum => {
                self.received_checksum = byte;
                self.state = ParserState::AwaitingEnd;
                Outcome::Waiting
            }
            ParserState::AwaitingEnd => {
                if byte == END && self.running_checksum == self.received_checksum {
                    self.frame_ready = true;
                    self.state = ParserState::AwaitingStart;
                    self.stats.frames_accepted += 1;
                    Outcome::FrameReady
                } else {
                    debug!(
                        end = byte,
                        computed = self.running_checksum,
                        received = self.received_checksum,
                        "rejecting frame tail"
                    );
                    self.stats.checksum_failures += 1;
                    self.reset();
                    Outcome::ChecksumInvalid
                }
            }
        }
    }

    /// Return to hunting for a start marker, discarding any partial frame.
    pub fn reset(&mut self) {
        self.state = ParserState::AwaitingStart;
        self.expected_len = 0;
        self.count = 0;
        self.running_checksum = 0;
        self.received_checksum = 0;
        self.frame_ready = false;
    }

    /// Current parser state.
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// `true` from a `FrameReady` outcome until the next reset or start marker.
    pub fn is_frame_ready(&self) -> bool {
        self.frame_ready
    }

    /// Payload of the ready frame, or `None` when no frame is ready.
    pub fn payload(&self) -> Option<&[u8]> {
        self.frame_ready.then(|| &self.payload[..self.count])
    }

    /// Copy out the ready frame and clear the ready flag.
    pub fn take_frame(&mut self) -> Option<Frame> {
        let frame = self
            .payload()
            .map(|payload| Frame::new(Bytes::copy_from_slice(payload)))?;
        self.frame_ready = false;
        Some(frame)
    }

    /// Payload length announced by the frame in progress.
    pub fn expected_len(&self) -> usize {
        self.expected_len
    }

    /// Payload bytes accumulated so far.
    pub fn accumulated(&self) -> usize {
        self.count
    }

    /// Configured payload limit.
    pub fn max_payload(&self) -> usize {
        self.max_payload
    }

    /// Terminal outcome counters.
    pub fn stats(&self) -> ParserStats {
        self.stats
    }
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{encode_capacity, encode_frame};

    fn feed_all(parser: &mut FrameParser, bytes: &[u8]) -> Vec<Outcome> {
        bytes
            .iter()
            .map(|&b| parser.feed(b))
            .filter(|o| o.is_terminal())
            .collect()
    }

    fn encoded(payload: &[u8]) -> Vec<u8> {
        let mut buf = vec![0u8; encode_capacity(payload.len())];
        let n = encode_frame(payload, &mut buf).unwrap();
        buf.truncate(n);
        buf
    }

    #[test]
    fn decodes_reference_frame() {
        let mut parser = FrameParser::new();
        let wire = [0x02, 0x02, 0x10, 0x20, 0x30, 0x03];

        for &b in &wire[..5] {
            assert_eq!(parser.feed(b), Outcome::Waiting);
        }
        assert_eq!(parser.feed(wire[5]), Outcome::FrameReady);
        assert!(parser.is_frame_ready());
        assert_eq!(parser.payload(), Some(&[0x10, 0x20][..]));
        assert_eq!(parser.state(), ParserState::AwaitingStart);
    }

    #[test]
    fn walks_every_state() {
        let mut parser = FrameParser::new();
        let mut seen = vec![parser.state()];
        for &b in &[0x02, 0x01, 0x41, 0x41, 0x03] {
            parser.feed(b);
            seen.push(parser.state());
        }
        assert_eq!(
            seen,
            vec![
                ParserState::AwaitingStart,
                ParserState::AwaitingLength,
                ParserState::AwaitingPayload,
                ParserState::AwaitingChecksum,
                ParserState::AwaitingEnd,
                ParserState::AwaitingStart,
            ]
        );
    }

    #[test]
    fn roundtrips_every_length() {
        let mut parser = FrameParser::new();
        for len in 1..=255usize {
            let payload: Vec<u8> = (0..len).map(|i| (i as u8).wrapping_mul(7)).collect();
            let outcomes = feed_all(&mut parser, &encoded(&payload));
            assert_eq!(outcomes, vec![Outcome::FrameReady], "len {len}");
            assert_eq!(parser.payload(), Some(payload.as_slice()), "len {len}");
        }
        assert_eq!(parser.stats().frames_accepted, 255);
    }

    #[test]
    fn noise_before_start_is_ignored() {
        let mut parser = FrameParser::new();
        for b in (0u8..=255).filter(|&b| b != START) {
            assert_eq!(parser.feed(b), Outcome::Waiting);
            assert_eq!(parser.state(), ParserState::AwaitingStart);
        }

        let outcomes = feed_all(&mut parser, &encoded(b"ok"));
        assert_eq!(outcomes, vec![Outcome::FrameReady]);
        assert_eq!(parser.payload(), Some(&b"ok"[..]));
    }

    #[test]
    fn wrong_checksum_then_recovers() {
        let mut parser = FrameParser::new();
        let bad = [0x02, 0x02, 0x10, 0x20, 0xFF, 0x03];

        assert_eq!(feed_all(&mut parser, &bad), vec![Outcome::ChecksumInvalid]);
        assert_eq!(parser.state(), ParserState::AwaitingStart);
        assert!(!parser.is_frame_ready());
        assert_eq!(parser.payload(), None);

        let outcomes = feed_all(&mut parser, &encoded(&[0x10, 0x20]));
        assert_eq!(outcomes, vec![Outcome::FrameReady]);
        assert_eq!(parser.stats().checksum_failures, 1);
    }

    #[test]
    fn wrong_end_marker_is_checksum_invalid() {
        let mut parser = FrameParser::new();
        let bad = [0x02, 0x01, 0x41, 0x41, 0x04];
        assert_eq!(feed_all(&mut parser, &bad), vec![Outcome::ChecksumInvalid]);
        assert_eq!(parser.state(), ParserState::AwaitingStart);
    }

    #[test]
    fn zero_length_resets_immediately() {
        let mut parser = FrameParser::new();
        assert_eq!(parser.feed(START), Outcome::Waiting);
        assert_eq!(parser.feed(0x00), Outcome::LengthInvalid);
        assert_eq!(parser.state(), ParserState::AwaitingStart);
        assert_eq!(parser.accumulated(), 0);

        // Bytes that would have been payload are treated as noise.
        assert_eq!(parser.feed(0x41), Outcome::Waiting);
        assert_eq!(parser.state(), ParserState::AwaitingStart);
        assert_eq!(parser.stats().length_failures, 1);
    }

    #[test]
    fn lowered_limit_rejects_long_frames() {
        let mut parser = FrameParser::with_config(&FrameConfig::with_max_payload(4));
        assert_eq!(parser.max_payload(), 4);

        let outcomes = feed_all(&mut parser, &encoded(&[0x10; 5]));
        assert_eq!(outcomes, vec![Outcome::LengthInvalid]);
        assert_eq!(parser.state(), ParserState::AwaitingStart);

        let outcomes = feed_all(&mut parser, &encoded(&[0x10; 4]));
        assert_eq!(outcomes, vec![Outcome::FrameReady]);
    }

    #[test]
    fn start_marker_inside_payload_is_data() {
        let mut parser = FrameParser::new();
        let payload = [START, END, START];
        let outcomes = feed_all(&mut parser, &encoded(&payload));
        assert_eq!(outcomes, vec![Outcome::FrameReady]);
        assert_eq!(parser.payload(), Some(&payload[..]));
    }

    #[test]
    fn take_frame_clears_ready_flag() {
        let mut parser = FrameParser::new();
        feed_all(&mut parser, &encoded(b"abc"));

        let frame = parser.take_frame().unwrap();
        assert_eq!(frame.payload.as_ref(), b"abc");
        assert!(!parser.is_frame_ready());
        assert!(parser.take_frame().is_none());
    }

    #[test]
    fn next_start_marker_clears_ready_flag() {
        let mut parser = FrameParser::new();
        feed_all(&mut parser, &encoded(b"abc"));
        assert!(parser.is_frame_ready());

        parser.feed(START);
        assert!(!parser.is_frame_ready());
        assert_eq!(parser.state(), ParserState::AwaitingLength);
    }

    #[test]
    fn reset_discards_partial_frame() {
        let mut parser = FrameParser::new();
        for &b in &[0x02, 0x03, 0x01, 0x02] {
            parser.feed(b);
        }
        assert_eq!(parser.state(), ParserState::AwaitingPayload);
        assert_eq!(parser.accumulated(), 2);

        parser.reset();
        assert_eq!(parser.state(), ParserState::AwaitingStart);
        assert_eq!(parser.accumulated(), 0);
        assert_eq!(parser.expected_len(), 0);
    }

    #[test]
    fn back_to_back_frames() {
        let mut parser = FrameParser::new();
        let mut wire = encoded(b"one");
        wire.extend_from_slice(&[0xFF, 0x00]);
        wire.extend_from_slice(&encoded(b"two"));

        let mut payloads = Vec::new();
        for &b in &wire {
            if parser.feed(b) == Outcome::FrameReady {
                payloads.push(parser.take_frame().unwrap().payload);
            }
        }
        assert_eq!(payloads, vec![&b"one"[..], &b"two"[..]]);
    }
}
