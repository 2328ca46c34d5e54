//! Frame codec: pure byte-level encode/decode, no I/O, no state.
//!
//! Wire layout (multi-byte integers big-endian):
//!
//! ```text
//! [SOF0:1][SOF1:1][ver:1][msg_type:1][flags:1][gate_id:1][seq:2][len:1][payload:len][crc32:4]
//! ```
//!
//! The CRC-32 (IEEE) covers VER..LEN plus the payload. The start marker is
//! excluded so that scanning for it during resynchronization stays
//! independent of the integrity check.

use serde::Serialize;

use crate::error::{GateLinkError, Result};
use crate::frame::{
    CRC_LEN, Frame, FrameFlags, MAX_PAYLOAD_LEN, MIN_FRAME_LEN, MsgType, PROTOCOL_VERSION, SOF_0,
    SOF_1, WIRE_HEADER_LEN,
};

/// CRC-32 IEEE (zlib variant) over `data`.
pub fn checksum(data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Encode a frame with the current [`PROTOCOL_VERSION`].
///
/// `gate_id` and `seq` are range-safe by type; the payload must fit the
/// single-byte length field or [`GateLinkError::PayloadTooLarge`] is
/// returned before any bytes are produced.
pub fn encode_frame(
    msg_type: MsgType,
    flags: FrameFlags,
    gate_id: u8,
    seq: u16,
    payload: &[u8],
) -> Result<Vec<u8>> {
    encode_frame_with_version(PROTOCOL_VERSION, msg_type, flags, gate_id, seq, payload)
}

/// Encode a frame with an explicit version byte.
pub fn encode_frame_with_version(
    version: u8,
    msg_type: MsgType,
    flags: FrameFlags,
    gate_id: u8,
    seq: u16,
    payload: &[u8],
) -> Result<Vec<u8>> {
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(GateLinkError::PayloadTooLarge {
            len: payload.len(),
            max: MAX_PAYLOAD_LEN,
        });
    }

    let mut frame = Vec::with_capacity(WIRE_HEADER_LEN + payload.len() + CRC_LEN);
    frame.push(SOF_0);
    frame.push(SOF_1);
    frame.push(version);
    frame.push(msg_type.to_byte());
    frame.push(flags.to_byte());
    frame.push(gate_id);
    frame.extend_from_slice(&seq.to_be_bytes());
    frame.push(payload.len() as u8);
    frame.extend_from_slice(payload);

    // CRC over VER..LEN + payload, SOF excluded
    let crc = checksum(&frame[2..]);
    frame.extend_from_slice(&crc.to_be_bytes());

    Ok(frame)
}

/// Encode a frame whose payload is the compact JSON serialization of `value`
/// (declaration-order keys, no extraneous whitespace).
pub fn encode_json_frame<T: Serialize>(
    msg_type: MsgType,
    flags: FrameFlags,
    gate_id: u8,
    seq: u16,
    value: &T,
) -> Result<Vec<u8>> {
    let payload = serde_json::to_vec(value)?;
    encode_frame(msg_type, flags, gate_id, seq, &payload)
}

/// Decode one complete frame from exactly `raw`.
///
/// Framing failures (short buffer, bad marker, length mismatch, unknown
/// message type) and checksum mismatch are distinct error variants; the
/// stream layer resynchronizes on either but logs them differently.
pub fn decode_frame(raw: &[u8]) -> Result<Frame> {
    if raw.len() < MIN_FRAME_LEN {
        return Err(GateLinkError::FrameTooShort {
            expected: MIN_FRAME_LEN,
            actual: raw.len(),
        });
    }

    if raw[0] != SOF_0 || raw[1] != SOF_1 {
        return Err(GateLinkError::InvalidStartMarker {
            actual: [raw[0], raw[1]],
        });
    }

    let version = raw[2];
    let msg_type = MsgType::from_byte(raw[3])?;
    let flags = FrameFlags::from_byte(raw[4]);
    let gate_id = raw[5];
    let seq = u16::from_be_bytes([raw[6], raw[7]]);
    let length = raw[8] as usize;

    let expected = WIRE_HEADER_LEN + length + CRC_LEN;
    if raw.len() != expected {
        return Err(GateLinkError::LengthMismatch {
            expected,
            actual: raw.len(),
        });
    }

    let payload = &raw[WIRE_HEADER_LEN..WIRE_HEADER_LEN + length];
    let received = u32::from_be_bytes([
        raw[expected - 4],
        raw[expected - 3],
        raw[expected - 2],
        raw[expected - 1],
    ]);

    let calculated = checksum(&raw[2..WIRE_HEADER_LEN + length]);
    if calculated != received {
        return Err(GateLinkError::ChecksumMismatch {
            calculated,
            received,
        });
    }

    Ok(Frame {
        version,
        msg_type,
        flags,
        gate_id,
        seq,
        payload: payload.to_vec(),
        crc32: received,
    })
}
