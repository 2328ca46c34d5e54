//! Command envelope convention carried inside frame payloads.
//!
//! A request is `{"v":1,"op":<int>,"params":{...}}`; a reply adds a success
//! flag, a numeric result code, a human-readable message, and optional
//! structured data. Serialization is compact JSON with keys in declaration
//! order.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::ops::Op;

/// Envelope format version.
pub const ENVELOPE_VERSION: u8 = 1;

/// A command request envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cmd {
    pub v: u8,
    pub op: Op,
    pub params: Map<String, Value>,
}

impl Cmd {
    pub fn new(op: Op, params: Map<String, Value>) -> Self {
        Self {
            v: ENVELOPE_VERSION,
            op,
            params,
        }
    }

    /// A command with no parameters.
    pub fn bare(op: Op) -> Self {
        Self::new(op, Map::new())
    }

    /// Parse a command envelope from raw payload bytes.
    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(payload)?)
    }
}

/// A command acknowledgment envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CmdAck {
    pub v: u8,
    pub op: Op,
    pub ok: bool,
    pub code: i32,
    pub msg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
}

impl CmdAck {
    /// A successful acknowledgment with default code and message.
    pub fn ok(op: Op, data: Option<Map<String, Value>>) -> Self {
        Self {
            v: ENVELOPE_VERSION,
            op,
            ok: true,
            code: 0,
            msg: "OK".to_owned(),
            data,
        }
    }

    /// A failed acknowledgment with a result code and message.
    pub fn err(op: Op, code: i32, msg: impl Into<String>) -> Self {
        Self {
            v: ENVELOPE_VERSION,
            op,
            ok: false,
            code,
            msg: msg.into(),
            data: None,
        }
    }

    /// Parse an acknowledgment envelope from raw payload bytes.
    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(payload)?)
    }
}
