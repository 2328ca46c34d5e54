//! Stream synchronizer: locates frame boundaries in a continuous byte
//! stream and yields validated frames, silently resynchronizing past
//! malformed or corrupted ones.

use std::io::Read;

use gatelink_protocol::frame::{CRC_LEN, SOF_0, SOF_1, WIRE_HEADER_LEN};
use gatelink_protocol::{Frame, GateLinkError, decode_frame};
use tracing::{debug, trace};

use crate::error::{ClientError, Result};

/// Pull-based frame reader over any blocking byte source.
///
/// `read_frame` alternates between two phases: scanning byte-by-byte for the
/// two-byte start marker, then reading the fixed header, the declared
/// payload, and the CRC trailer. Decode failures of either kind discard the
/// consumed bytes and resume scanning, so corruption never tears down the
/// stream. Only a closed source ([`ClientError::Disconnected`]) or a real
/// I/O error propagates.
pub struct FrameReader<R> {
    source: R,
    /// Byte consumed while scanning that may itself start a marker.
    pending: Option<u8>,
}

impl<R: Read> FrameReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            pending: None,
        }
    }

    pub fn get_ref(&self) -> &R {
        &self.source
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.source
    }

    pub fn into_inner(self) -> R {
        self.source
    }

    /// Fill `buf` completely, looping over short reads. A zero-byte read
    /// means the source is closed, which is fatal for the current attempt.
    fn read_full(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.source.read(&mut buf[filled..]) {
                Ok(0) => return Err(ClientError::Disconnected),
                Ok(n) => filled += n,
                Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.read_full(&mut byte)?;
        Ok(byte[0])
    }

    /// Block until the next valid frame is found.
    pub fn read_frame(&mut self) -> Result<Frame> {
        loop {
            let b0 = match self.pending.take() {
                Some(b) => b,
                None => self.read_byte()?,
            };
            if b0 != SOF_0 {
                continue;
            }

            let b1 = self.read_byte()?;
            if b1 != SOF_1 {
                // May itself be the first marker byte; reconsider it.
                self.pending = Some(b1);
                continue;
            }

            let mut raw = vec![0u8; WIRE_HEADER_LEN];
            raw[0] = SOF_0;
            raw[1] = SOF_1;
            self.read_full(&mut raw[2..])?;

            let length = raw[WIRE_HEADER_LEN - 1] as usize;
            raw.resize(WIRE_HEADER_LEN + length + CRC_LEN, 0);
            self.read_full(&mut raw[WIRE_HEADER_LEN..])?;

            match decode_frame(&raw) {
                Ok(frame) => {
                    trace!(seq = frame.seq, msg_type = ?frame.msg_type, "frame received");
                    return Ok(frame);
                }
                Err(GateLinkError::ChecksumMismatch {
                    calculated,
                    received,
                }) => {
                    // Well-formed but corrupted in transit
                    debug!(calculated, received, "checksum mismatch, resynchronizing");
                }
                Err(err) => {
                    trace!(%err, "malformed frame, resynchronizing");
                }
            }
        }
    }
}
