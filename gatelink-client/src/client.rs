use std::io::ErrorKind;
use std::time::{Duration, Instant};

use gatelink_protocol::{
    Cmd, CmdAck, Frame, FrameFlags, MsgType, SequenceCounter, encode_frame, encode_json_frame,
};
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::connection::Connection;
use crate::error::{ClientError, Result};

/// Configuration for [`GateClient`] connections.
#[derive(Clone, Debug)]
pub struct GateClientConfig {
    /// Gate controller hostname or IP.
    pub host: String,
    /// Gate controller TCP port.
    pub port: u16,
    /// Address of the gate unit commands are sent to by default.
    pub gate_id: u8,
    /// Bounds the TCP connect and socket writes, and is the default reply
    /// wait. Default: 2 seconds.
    pub timeout: Duration,
}

impl GateClientConfig {
    pub fn new(host: impl Into<String>, port: u16, gate_id: u8) -> Self {
        Self {
            host: host.into(),
            port,
            gate_id,
            timeout: Duration::from_secs(2),
        }
    }
}

/// Blocking client for one gate controller connection.
///
/// Owns the connection and the sequence counter; sending and waiting are
/// separate operations so a caller can correlate the reply itself. The
/// design allows one outstanding request at a time: [`wait_for`] discards
/// every frame that does not match the awaited sequence and type, so replies
/// to other requests issued concurrently on the same connection are lost.
///
/// [`wait_for`]: GateClient::wait_for
///
/// # Example
///
/// ```no_run
/// # fn example() -> gatelink_client::Result<()> {
/// use gatelink_client::{GateClient, GateClientConfig};
/// use gatelink_protocol::{Cmd, Op};
///
/// let config = GateClientConfig::new("192.168.4.20", 9100, 7);
/// let mut client = GateClient::connect(config)?;
/// let ack = client.command(&Cmd::bare(Op::DoorStatusGet))?;
/// println!("ok={} code={} msg={}", ack.ok, ack.code, ack.msg);
/// # Ok(())
/// # }
/// ```
pub struct GateClient {
    connection: Connection,
    config: GateClientConfig,
    seq: SequenceCounter,
}

impl GateClient {
    /// Connect to the gate controller. The returned client is ready to send.
    pub fn connect(config: GateClientConfig) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port);
        info!(addr, gate_id = config.gate_id, "connecting");
        let connection = Connection::connect(&addr, config.timeout)?;

        Ok(Self {
            connection,
            config,
            seq: SequenceCounter::new(),
        })
    }

    /// Returns the configuration used for this connection.
    pub fn config(&self) -> &GateClientConfig {
        &self.config
    }

    /// Encode and send one frame, returning the allocated sequence id for
    /// later correlation. Does not wait for anything.
    pub fn send(
        &mut self,
        msg_type: MsgType,
        flags: FrameFlags,
        gate_id: u8,
        payload: &[u8],
    ) -> Result<u16> {
        let seq = self.seq.advance();
        let raw = encode_frame(msg_type, flags, gate_id, seq, payload)?;
        self.connection.send_raw(&raw)?;
        trace!(seq, ?msg_type, len = payload.len(), "frame sent");
        Ok(seq)
    }

    /// Send a frame whose payload is the compact JSON serialization of
    /// `value`, addressed to the configured gate.
    pub fn send_json<T: Serialize>(
        &mut self,
        msg_type: MsgType,
        flags: FrameFlags,
        value: &T,
    ) -> Result<u16> {
        let seq = self.seq.advance();
        let raw = encode_json_frame(msg_type, flags, self.config.gate_id, seq, value)?;
        self.connection.send_raw(&raw)?;
        trace!(seq, ?msg_type, "frame sent");
        Ok(seq)
    }

    /// Send a command envelope as a CMD frame with the ACK_REQ flag set.
    pub fn send_cmd(&mut self, cmd: &Cmd) -> Result<u16> {
        debug!(op = ?cmd.op, "CMD");
        self.send_json(MsgType::Cmd, FrameFlags::ACK_REQ, cmd)
    }

    /// Wait for a frame matching `seq` and one of `accepted`, up to
    /// `timeout`.
    ///
    /// The deadline is absolute: non-matching frames arriving in quick
    /// succession share one budget rather than each refreshing it. Frames
    /// with another sequence or an unexpected type are discarded, not
    /// queued. A closed stream surfaces as [`ClientError::Disconnected`];
    /// deadline expiry as [`ClientError::Timeout`] with the connection
    /// still open.
    pub fn wait_for(&mut self, seq: u16, accepted: &[MsgType], timeout: Duration) -> Result<Frame> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                warn!(seq, ?timeout, "reply wait timed out");
                return Err(ClientError::Timeout(timeout));
            }

            self.connection.set_read_timeout(Some(remaining))?;
            match self.connection.read_frame() {
                Ok(frame) => {
                    if frame.seq != seq {
                        trace!(got = frame.seq, want = seq, "discarding unrelated frame");
                        continue;
                    }
                    if !accepted.contains(&frame.msg_type) {
                        trace!(msg_type = ?frame.msg_type, "discarding frame of unexpected type");
                        continue;
                    }
                    return Ok(frame);
                }
                // Socket read timeout: loop around and let the deadline decide.
                Err(ClientError::Io(ref e))
                    if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
                Err(e) => return Err(e),
            }
        }
    }

    /// Wait for the CMD_ACK matching `seq` and parse its envelope.
    pub fn wait_cmd_ack(&mut self, seq: u16, timeout: Duration) -> Result<CmdAck> {
        let frame = self.wait_for(seq, &[MsgType::CmdAck], timeout)?;
        Ok(CmdAck::from_payload(&frame.payload)?)
    }

    /// Send a command and wait for its acknowledgment under the configured
    /// timeout.
    pub fn command(&mut self, cmd: &Cmd) -> Result<CmdAck> {
        let seq = self.send_cmd(cmd)?;
        self.wait_cmd_ack(seq, self.config.timeout)
    }

    /// Shut down the socket and consume the client. Dropping the client
    /// without calling this also closes the connection.
    pub fn close(mut self) -> Result<()> {
        debug!("closing connection");
        self.connection.shutdown()
    }
}
