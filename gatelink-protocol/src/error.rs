#[derive(Debug, thiserror::Error)]
pub enum GateLinkError {
    #[error("payload too large: {len} > {max}")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("frame too short: expected at least {expected}, actual {actual}")]
    FrameTooShort { expected: usize, actual: usize },

    #[error("invalid start marker: {actual:02X?}")]
    InvalidStartMarker { actual: [u8; 2] },

    #[error("frame length mismatch: expected {expected}, actual {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("unknown message type: 0x{0:02X}")]
    UnknownMsgType(u8),

    #[error("unknown opcode: 0x{0:02X}")]
    UnknownOpcode(u8),

    #[error("checksum mismatch: calculated {calculated:08X}, received {received:08X}")]
    ChecksumMismatch { calculated: u32, received: u32 },

    #[error("payload encoding: {0}")]
    Payload(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GateLinkError>;
