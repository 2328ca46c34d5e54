use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{GateLinkError, Result};

/// Gate operation codes carried inside command envelopes.
///
/// A closed set: unknown values are rejected at the decode boundary, both
/// from raw bytes and from JSON. The frame codec never interprets these;
/// only the envelope layer does.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    /// Sentinel for a request the gate refused to authorize.
    Unauthorized,

    DoorSet,
    DoorMaxSpeedSet,
    DoorLowSpeedSet,
    DoorAccelMsSet,
    DoorDecelMsSet,
    DoorHoldMsSet,
    DoorPositionGet,
    DoorStatusGet,

    VBusGet,
    TempGet,
    FanEnable,
    BuzzerEnable,
    BuzzerMsSet,

    IpGet,
    MacGet,
    LocalPortGet,

    /// Reserved maximum; valid on the wire, not a real operation.
    Reserved,
}

impl Op {
    pub fn from_byte(b: u8) -> Result<Self> {
        match b {
            0x00 => Ok(Self::Unauthorized),
            0x01 => Ok(Self::DoorSet),
            0x02 => Ok(Self::DoorMaxSpeedSet),
            0x03 => Ok(Self::DoorLowSpeedSet),
            0x04 => Ok(Self::DoorAccelMsSet),
            0x05 => Ok(Self::DoorDecelMsSet),
            0x06 => Ok(Self::DoorHoldMsSet),
            0x07 => Ok(Self::DoorPositionGet),
            0x08 => Ok(Self::DoorStatusGet),
            0x21 => Ok(Self::VBusGet),
            0x22 => Ok(Self::TempGet),
            0x23 => Ok(Self::FanEnable),
            0x24 => Ok(Self::BuzzerEnable),
            0x25 => Ok(Self::BuzzerMsSet),
            0x31 => Ok(Self::IpGet),
            0x32 => Ok(Self::MacGet),
            0x33 => Ok(Self::LocalPortGet),
            0xFF => Ok(Self::Reserved),
            _ => Err(GateLinkError::UnknownOpcode(b)),
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Self::Unauthorized => 0x00,
            Self::DoorSet => 0x01,
            Self::DoorMaxSpeedSet => 0x02,
            Self::DoorLowSpeedSet => 0x03,
            Self::DoorAccelMsSet => 0x04,
            Self::DoorDecelMsSet => 0x05,
            Self::DoorHoldMsSet => 0x06,
            Self::DoorPositionGet => 0x07,
            Self::DoorStatusGet => 0x08,
            Self::VBusGet => 0x21,
            Self::TempGet => 0x22,
            Self::FanEnable => 0x23,
            Self::BuzzerEnable => 0x24,
            Self::BuzzerMsSet => 0x25,
            Self::IpGet => 0x31,
            Self::MacGet => 0x32,
            Self::LocalPortGet => 0x33,
            Self::Reserved => 0xFF,
        }
    }
}

// Envelopes carry opcodes as plain integers.
impl Serialize for Op {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.to_byte())
    }
}

impl<'de> Deserialize<'de> for Op {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = u8::deserialize(deserializer)?;
        Op::from_byte(value).map_err(|_| de::Error::custom(format!("unknown opcode: {value}")))
    }
}
