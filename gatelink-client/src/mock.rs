//! In-process mock gate controller for tests.

use std::io::Write;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;

use gatelink_protocol::{Cmd, CmdAck, FrameFlags, MsgType, encode_frame, encode_json_frame};

use crate::reader::FrameReader;

pub struct MockGateConfig {
    pub gate_id: u8,
    /// Raw bytes written before any frame exchange (noise for resync tests).
    pub preamble: Vec<u8>,
    /// Raw blobs written before each CMD_ACK (unrelated or corrupt frames).
    pub inject_before_ack: Vec<Vec<u8>>,
    /// When false, commands are read and swallowed without a reply.
    pub respond: bool,
    /// Close the connection after handling the first command.
    pub close_after_first: bool,
}

impl MockGateConfig {
    pub fn responding(gate_id: u8) -> Self {
        Self {
            gate_id,
            preamble: Vec::new(),
            inject_before_ack: Vec::new(),
            respond: true,
            close_after_first: false,
        }
    }

    pub fn silent(gate_id: u8) -> Self {
        Self {
            respond: false,
            ..Self::responding(gate_id)
        }
    }
}

pub struct MockGate {
    addr: SocketAddr,
}

impl MockGate {
    pub fn start(config: MockGateConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        thread::spawn(move || {
            Self::handle_connection(listener, config);
        });

        Self { addr }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn handle_connection(listener: TcpListener, config: MockGateConfig) {
        let Ok((stream, _)) = listener.accept() else {
            return;
        };

        let mut write_half: TcpStream = stream.try_clone().unwrap();
        let mut reader = FrameReader::new(stream);

        if !config.preamble.is_empty() && write_half.write_all(&config.preamble).is_err() {
            return;
        }

        loop {
            let frame = match reader.read_frame() {
                Ok(frame) => frame,
                Err(_) => break,
            };

            match frame.msg_type {
                MsgType::Cmd => {
                    for blob in &config.inject_before_ack {
                        if write_half.write_all(blob).is_err() {
                            return;
                        }
                    }

                    if config.respond {
                        let Ok(cmd) = Cmd::from_payload(&frame.payload) else {
                            continue;
                        };
                        let ack = CmdAck::ok(cmd.op, None);
                        let raw = encode_json_frame(
                            MsgType::CmdAck,
                            FrameFlags::RESPONSE,
                            config.gate_id,
                            frame.seq,
                            &ack,
                        )
                        .unwrap();
                        if write_half.write_all(&raw).is_err() {
                            return;
                        }
                    }

                    if config.close_after_first {
                        break;
                    }
                }
                MsgType::Heartbeat => {
                    let raw = encode_frame(
                        MsgType::Ack,
                        FrameFlags::RESPONSE,
                        config.gate_id,
                        frame.seq,
                        b"",
                    )
                    .unwrap();
                    if write_half.write_all(&raw).is_err() {
                        return;
                    }
                }
                _ => {}
            }
        }
    }
}
