use std::io::{ErrorKind, Read, Write};

use bytes::{Buf, BytesMut};
use tracing::debug;

use crate::error::{Result, TransportError};
use crate::traits::ByteChannel;

const READ_CHUNK_SIZE: usize = 256;

/// Channel backed by two byte streams: one for frames, one for acks.
///
/// Both streams should be in non-blocking mode; `WouldBlock` on read is
/// reported as "nothing available". Writes retry on `WouldBlock` and
/// `Interrupted` until the whole buffer is accepted.
pub struct StreamChannel<D, A> {
    data: D,
    ack: A,
    inbound: BytesMut,
}

impl<D: Read + Write, A: Read + Write> StreamChannel<D, A> {
    /// Wrap a frame stream and an acknowledgment stream.
    pub fn new(data: D, ack: A) -> Self {
        Self {
            data,
            ack,
            inbound: BytesMut::with_capacity(READ_CHUNK_SIZE),
        }
    }

    /// Borrow the frame stream.
    pub fn data_ref(&self) -> &D {
        &self.data
    }

    /// Borrow the acknowledgment stream.
    pub fn ack_ref(&self) -> &A {
        &self.ack
    }

    /// Consume the channel and return both streams.
    ///
    /// Frame bytes already read but not yet received are discarded.
    pub fn into_inner(self) -> (D, A) {
        (self.data, self.ack)
    }

    fn fill_inbound(&mut self) -> Result<()> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            match self.data.read(&mut chunk) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(n) => {
                    self.inbound.extend_from_slice(&chunk[..n]);
                    return Ok(());
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => return Ok(()),
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }
}

impl<D: Read + Write, A: Read + Write> ByteChannel for StreamChannel<D, A> {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        write_all(&mut self.data, bytes)?;
        debug!(len = bytes.len(), "stream channel sent frame");
        Ok(())
    }

    fn try_receive_byte(&mut self) -> Result<Option<u8>> {
        if !self.inbound.has_remaining() {
            self.fill_inbound()?;
        }
        if self.inbound.has_remaining() {
            Ok(Some(self.inbound.get_u8()))
        } else {
            Ok(None)
        }
    }

    fn send_ack(&mut self, ack: u8) -> Result<()> {
        write_all(&mut self.ack, &[ack])
    }

    fn try_receive_ack(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.ack.read(&mut byte) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(_) => return Ok(Some(byte[0])),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => return Ok(None),
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }
}

fn write_all<W: Write>(stream: &mut W, bytes: &[u8]) -> Result<()> {
    let mut offset = 0usize;
    while offset < bytes.len() {
        match stream.write(&bytes[offset..]) {
            Ok(0) => {
                return Err(TransportError::ShortWrite {
                    written: offset,
                    expected: bytes.len(),
                })
            }
            Ok(n) => offset += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
            Err(err) => return Err(TransportError::Io(err)),
        }
    }

    loop {
        match stream.flush() {
            Ok(()) => return Ok(()),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
            Err(err) => return Err(TransportError::Io(err)),
        }
    }
}

impl<D, A> std::fmt::Debug for StreamChannel<D, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamChannel")
            .field("buffered", &self.inbound.len())
            .finish_non_exhaustive()
    }
}
