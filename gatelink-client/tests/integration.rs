//! End-to-end tests driving a [`GateClient`] against the in-process mock
//! gate over real sockets.

use std::time::{Duration, Instant};

use gatelink_client::mock::{MockGate, MockGateConfig};
use gatelink_client::{ClientError, GateClient, GateClientConfig};
use gatelink_protocol::{
    Cmd, CmdAck, FrameFlags, MsgType, Op, encode_frame, encode_json_frame,
};

const GATE_ID: u8 = 7;

fn connect(mock: &MockGate) -> GateClient {
    let addr = mock.addr();
    let config = GateClientConfig::new(addr.ip().to_string(), addr.port(), GATE_ID);
    GateClient::connect(config).unwrap()
}

#[test]
fn command_ack_roundtrip() {
    let mock = MockGate::start(MockGateConfig::responding(GATE_ID));
    let mut client = connect(&mock);

    let ack = client.command(&Cmd::bare(Op::DoorPositionGet)).unwrap();
    assert!(ack.ok);
    assert_eq!(ack.op, Op::DoorPositionGet);
    assert_eq!(ack.code, 0);
    assert_eq!(ack.msg, "OK");

    client.close().unwrap();
}

#[test]
fn sequence_ids_advance_per_send() {
    let mock = MockGate::start(MockGateConfig::responding(GATE_ID));
    let mut client = connect(&mock);

    let first = client.send_cmd(&Cmd::bare(Op::VBusGet)).unwrap();
    let second = client.send_cmd(&Cmd::bare(Op::TempGet)).unwrap();
    assert_eq!(first, 1);
    assert_eq!(second, 2);
}

#[test]
fn wait_skips_wrong_sequence_and_type() {
    // Before the real ack (seq=1, CMD_ACK) the gate emits a frame with the
    // right sequence but wrong type, then one with the right type but wrong
    // sequence. Only the real ack may come back.
    let status = encode_frame(MsgType::Status, FrameFlags::NONE, GATE_ID, 1, b"{}").unwrap();
    let stray_ack = encode_json_frame(
        MsgType::CmdAck,
        FrameFlags::RESPONSE,
        GATE_ID,
        2,
        &CmdAck::ok(Op::VBusGet, None),
    )
    .unwrap();

    let config = MockGateConfig {
        inject_before_ack: vec![status, stray_ack],
        ..MockGateConfig::responding(GATE_ID)
    };
    let mock = MockGate::start(config);
    let mut client = connect(&mock);

    let seq = client.send_cmd(&Cmd::bare(Op::DoorStatusGet)).unwrap();
    assert_eq!(seq, 1);

    let frame = client
        .wait_for(seq, &[MsgType::CmdAck], Duration::from_secs(2))
        .unwrap();
    assert_eq!(frame.seq, 1);
    assert_eq!(frame.msg_type, MsgType::CmdAck);

    let ack = CmdAck::from_payload(&frame.payload).unwrap();
    assert_eq!(ack.op, Op::DoorStatusGet);
}

#[test]
fn resynchronizes_past_corrupt_frame() {
    let mut corrupt = encode_frame(MsgType::Status, FrameFlags::NONE, GATE_ID, 1, b"{}").unwrap();
    let last = corrupt.len() - 1;
    corrupt[last] ^= 0xFF;

    let config = MockGateConfig {
        inject_before_ack: vec![corrupt],
        ..MockGateConfig::responding(GATE_ID)
    };
    let mock = MockGate::start(config);
    let mut client = connect(&mock);

    let ack = client.command(&Cmd::bare(Op::DoorPositionGet)).unwrap();
    assert!(ack.ok);
}

#[test]
fn resynchronizes_past_noise_preamble() {
    let config = MockGateConfig {
        // Stray marker bytes included: scanning must not be derailed.
        preamble: vec![0x00, 0xA5, 0x17, 0xA5, 0xA5, 0x42],
        ..MockGateConfig::responding(GATE_ID)
    };
    let mock = MockGate::start(config);
    let mut client = connect(&mock);

    let ack = client.command(&Cmd::bare(Op::MacGet)).unwrap();
    assert!(ack.ok);
    assert_eq!(ack.op, Op::MacGet);
}

#[test]
fn wait_times_out_when_gate_is_silent() {
    let mock = MockGate::start(MockGateConfig::silent(GATE_ID));
    let mut client = connect(&mock);

    let seq = client.send_cmd(&Cmd::bare(Op::IpGet)).unwrap();
    let timeout = Duration::from_millis(200);

    let started = Instant::now();
    let err = client.wait_cmd_ack(seq, timeout).unwrap_err();
    assert!(matches!(err, ClientError::Timeout(t) if t == timeout));
    assert!(started.elapsed() >= timeout);
}

#[test]
fn wait_times_out_despite_unrelated_traffic() {
    // The gate keeps talking, just never the frame we asked for.
    let push = encode_frame(MsgType::PushStatus, FrameFlags::NONE, GATE_ID, 0, b"{}").unwrap();
    let config = MockGateConfig {
        inject_before_ack: vec![push.clone(), push],
        respond: false,
        ..MockGateConfig::responding(GATE_ID)
    };
    let mock = MockGate::start(config);
    let mut client = connect(&mock);

    let seq = client.send_cmd(&Cmd::bare(Op::TempGet)).unwrap();
    let err = client
        .wait_for(seq, &[MsgType::CmdAck], Duration::from_millis(200))
        .unwrap_err();
    assert!(matches!(err, ClientError::Timeout(_)));
}

#[test]
fn closed_connection_surfaces_as_disconnected() {
    let config = MockGateConfig {
        respond: false,
        close_after_first: true,
        ..MockGateConfig::responding(GATE_ID)
    };
    let mock = MockGate::start(config);
    let mut client = connect(&mock);

    let seq = client.send_cmd(&Cmd::bare(Op::DoorSet)).unwrap();
    let err = client
        .wait_for(seq, &[MsgType::CmdAck], Duration::from_secs(2))
        .unwrap_err();
    assert!(matches!(err, ClientError::Disconnected));
}

#[test]
fn heartbeat_is_acknowledged() {
    let mock = MockGate::start(MockGateConfig::responding(GATE_ID));
    let mut client = connect(&mock);

    let seq = client
        .send(MsgType::Heartbeat, FrameFlags::ACK_REQ, GATE_ID, b"")
        .unwrap();
    let frame = client
        .wait_for(seq, &[MsgType::Ack], Duration::from_secs(2))
        .unwrap();
    assert_eq!(frame.msg_type, MsgType::Ack);
    assert!(frame.flags.contains(FrameFlags::RESPONSE));
    assert_eq!(frame.payload_len(), 0);
}
