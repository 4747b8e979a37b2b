//! `tokio_util::codec` adapter over the byte-driven parser.

use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::debug;

use crate::codec::{encode_into, validate_payload, Frame, FrameConfig};
use crate::error::FrameError;
use crate::parser::{FrameParser, Outcome, ParserStats};

/// Codec for use with `FramedRead` / `FramedWrite`.
///
/// Decoding consumes the source buffer byte by byte, so a partial frame
/// lives inside the parser rather than in `src`. Rejected frames are
/// skipped.
#[derive(Debug, Clone, Default)]
pub struct AckwireCodec {
    parser: FrameParser,
    config: FrameConfig,
}

impl AckwireCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            parser: FrameParser::with_config(&config),
            config,
        }
    }

    /// Accepted and rejected frame counters.
    pub fn stats(&self) -> ParserStats {
        self.parser.stats()
    }
}

impl Decoder for AckwireCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, FrameError> {
        while src.has_remaining() {
            match self.parser.feed(src.get_u8()) {
                Outcome::Waiting => {}
                Outcome::FrameReady => return Ok(self.parser.take_frame()),
                rejected => debug!(?rejected, "codec skipping rejected frame"),
            }
        }
        Ok(None)
    }
}

impl Encoder<&[u8]> for AckwireCodec {
    type Error = FrameError;

    fn encode(&mut self, payload: &[u8], dst: &mut BytesMut) -> Result<(), FrameError> {
        validate_payload(payload, self.config.max_payload_size)?;
        encode_into(payload, dst)?;
        Ok(())
    }
}

impl Encoder<Bytes> for AckwireCodec {
    type Error = FrameError;

    fn encode(&mut self, payload: Bytes, dst: &mut BytesMut) -> Result<(), FrameError> {
        Encoder::<&[u8]>::encode(self, payload.as_ref(), dst)
    }
}

impl Encoder<Frame> for AckwireCodec {
    type Error = FrameError;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<(), FrameError> {
        Encoder::<&[u8]>::encode(self, frame.payload.as_ref(), dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EncodeError;

    #[test]
    fn decode_across_split_buffers() {
        let mut codec = AckwireCodec::new();
        let mut wire = BytesMut::new();
        Encoder::<&[u8]>::encode(&mut codec, &b"split"[..], &mut wire).unwrap();

        let mut first = wire.split_to(3);
        assert!(codec.decode(&mut first).unwrap().is_none());
        assert!(first.is_empty());

        let frame = codec.decode(&mut wire).unwrap().unwrap();
        assert_eq!(frame.payload.as_ref(), b"split");
    }

    #[test]
    fn decode_leaves_following_frame_in_buffer() {
        let mut codec = AckwireCodec::new();
        let mut wire = BytesMut::new();
        Encoder::<Bytes>::encode(&mut codec, Bytes::from_static(b"a"), &mut wire).unwrap();
        Encoder::<Frame>::encode(&mut codec, Frame::new(&b"b"[..]), &mut wire).unwrap();

        assert_eq!(codec.decode(&mut wire).unwrap().unwrap().payload.as_ref(), b"a");
        assert_eq!(wire.len(), 5);
        assert_eq!(codec.decode(&mut wire).unwrap().unwrap().payload.as_ref(), b"b");
        assert!(codec.decode(&mut wire).unwrap().is_none());
    }

    #[test]
    fn decode_skips_corrupt_frame() {
        let mut codec = AckwireCodec::new();
        let mut wire = BytesMut::from(&[0x02, 0x01, 0x41, 0x00, 0x03, 0x02, 0x01, 0x41, 0x41, 0x03][..]);

        let frame = codec.decode(&mut wire).unwrap().unwrap();
        assert_eq!(frame.payload.as_ref(), b"A");
        assert_eq!(codec.stats().checksum_failures, 1);
    }

    #[test]
    fn encode_honors_config_limit() {
        let mut codec = AckwireCodec::with_config(FrameConfig::with_max_payload(1));
        let mut dst = BytesMut::new();
        let err = Encoder::<&[u8]>::encode(&mut codec, &b"ab"[..], &mut dst).unwrap_err();
        assert!(matches!(
            err,
            FrameError::Encode(EncodeError::InvalidLength { len: 2, max: 1 })
        ));
        assert!(dst.is_empty());
    }

    #[tokio::test]
    async fn framed_roundtrip_over_duplex() {
        use futures_util::{SinkExt, StreamExt};
        use tokio_util::codec::{FramedRead, FramedWrite};

        let (near, far) = tokio::io::duplex(64);
        let mut writer = FramedWrite::new(near, AckwireCodec::new());
        let mut reader = FramedRead::new(far, AckwireCodec::new());

        writer.send(Frame::new(&b"one"[..])).await.unwrap();
        writer.send(Bytes::from_static(b"two")).await.unwrap();
        drop(writer);

        let first = reader.next().await.unwrap().unwrap();
        let second = reader.next().await.unwrap().unwrap();
        assert_eq!(first.payload.as_ref(), b"one");
        assert_eq!(second.payload.as_ref(), b"two");
        assert!(reader.next().await.is_none());
    }
}
