use std::time::Duration;

/// Errors that can occur during GateLink client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// TCP or socket I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Protocol error on the send path (oversize payload, envelope
    /// serialization). Decode-side protocol errors never surface here; the
    /// frame reader consumes them during resynchronization.
    #[error("protocol error: {0}")]
    Protocol(#[from] gatelink_protocol::GateLinkError),

    /// No matching reply arrived before the deadline. The connection stays
    /// open.
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    /// Peer closed the connection (read returned 0 bytes).
    #[error("disconnected")]
    Disconnected,

    /// The configured host/port did not resolve to a socket address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

/// Convenience alias for `Result<T, ClientError>`.
pub type Result<T> = std::result::Result<T, ClientError>;
