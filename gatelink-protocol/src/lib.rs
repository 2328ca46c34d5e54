//! GateLink wire protocol: frame codec, opcodes, and command envelopes.
//!
//! This crate provides the shared protocol layer for commanding gate
//! controllers over a byte stream, used by the client crate. It is pure
//! encoding/decoding with no I/O.

pub mod codec;
pub mod error;
pub mod frame;
pub mod ops;
pub mod payload;
pub mod sequence;

pub use codec::{checksum, decode_frame, encode_frame, encode_json_frame};
pub use error::{GateLinkError, Result};
pub use frame::{Frame, FrameFlags, MsgType};
pub use ops::Op;
pub use payload::{Cmd, CmdAck};
pub use sequence::SequenceCounter;
