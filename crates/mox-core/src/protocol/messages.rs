//! MOX LT frame types and wire constants.
//!
//! Every frame shares a 5-byte header:
//!
//! ```text
//! [priority:1][module_high:1][module_mid:1][module_low:1][channel:1]
//! ```
//!
//! followed by a 5-byte opcode block and, for writes, a value byte plus a
//! fixed trailer.  There are no multi-byte integers anywhere on the wire.

use serde::{Deserialize, Serialize};

use crate::addressing::{ChannelId, CorrelationKey, ModuleAddress};

// ── Protocol constants ────────────────────────────────────────────────────────

/// Size of the common frame header in bytes.
pub const HEADER_SIZE: usize = 5;

/// Offset of the first opcode byte.
pub const OPCODE_OFFSET: usize = HEADER_SIZE;

/// Offset of the value byte in writes and status replies.
pub const VALUE_OFFSET: usize = 10;

pub const OPCODE_ON_OFF_WRITE: [u8; 5] = [0x01, 0x00, 0x00, 0x02, 0x03];
pub const OPCODE_ON_OFF_READ: [u8; 5] = [0x01, 0x00, 0x00, 0x01, 0x02];
pub const OPCODE_BRIGHTNESS_WRITE: [u8; 5] = [0x02, 0x00, 0x00, 0x02, 0x06];
pub const OPCODE_BRIGHTNESS_READ: [u8; 5] = [0x03, 0x00, 0x00, 0x01, 0x02];
pub const OPCODE_CURTAIN_WRITE: [u8; 5] = [0x01, 0x00, 0x00, 0x02, 0x04];
/// The curtain query shares its template with the on/off query.
pub const OPCODE_CURTAIN_READ: [u8; 5] = OPCODE_ON_OFF_READ;

/// Bytes following the value in a brightness write.
pub const BRIGHTNESS_WRITE_TRAILER: [u8; 3] = [0x00, 0x64, 0x00];
/// Bytes following the value in a curtain write.
pub const CURTAIN_WRITE_TRAILER: [u8; 1] = [0x00];

/// Opcode block of an on/off status reply (11 bytes total).
pub const RESPONSE_ON_OFF: [u8; 5] = [0x01, 0x00, 0x00, 0x03, 0x03];
/// Opcode block of a brightness reply (12 bytes total).
pub const RESPONSE_BRIGHTNESS: [u8; 5] = [0x03, 0x00, 0x00, 0x03, 0x04];
/// Opcode block of a curtain position reply (12 bytes total).
pub const RESPONSE_CURTAIN: [u8; 5] = [0x01, 0x00, 0x00, 0x03, 0x04];

pub const ON_OFF_RESPONSE_LEN: usize = 11;
pub const LEVEL_RESPONSE_LEN: usize = 12;

// ── Priority ──────────────────────────────────────────────────────────────────

/// First byte of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Priority {
    /// Read/query commands.
    Query = 0x02,
    /// Write commands that change device state.
    Write = 0x03,
}

impl TryFrom<u8> for Priority {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        match value {
            0x02 => Ok(Priority::Query),
            0x03 => Ok(Priority::Write),
            _ => Err(()),
        }
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

/// Every operation the client can ask a MOX LT server to perform.
///
/// Values carried by `SetBrightness` and `SetCurtainPosition` are written to
/// the wire exactly as given; keeping them within 0–100 is the caller's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    TurnOn,
    TurnOff,
    ReadOnOff,
    SetBrightness(u8),
    ReadBrightness,
    SetCurtainPosition(u8),
    ReadCurtainPosition,
}

impl Command {
    /// The priority byte this command is sent with.
    pub const fn priority(self) -> Priority {
        if self.is_query() {
            Priority::Query
        } else {
            Priority::Write
        }
    }

    /// Returns `true` for commands that ask the server for a status reply.
    pub const fn is_query(self) -> bool {
        matches!(
            self,
            Command::ReadOnOff | Command::ReadBrightness | Command::ReadCurtainPosition
        )
    }

    /// The kind of status reply a query is answered with.
    pub const fn reply_kind(self) -> Option<ResponseKind> {
        match self {
            Command::ReadOnOff => Some(ResponseKind::OnOffStatus),
            Command::ReadBrightness => Some(ResponseKind::BrightnessValue),
            Command::ReadCurtainPosition => Some(ResponseKind::CurtainPosition),
            _ => None,
        }
    }

    /// The value byte carried by write commands, if any.
    pub const fn value(self) -> Option<u8> {
        match self {
            Command::TurnOn => Some(0x01),
            Command::TurnOff => Some(0x00),
            Command::SetBrightness(v) | Command::SetCurtainPosition(v) => Some(v),
            Command::ReadOnOff | Command::ReadBrightness | Command::ReadCurtainPosition => None,
        }
    }

    /// The fixed opcode block identifying the operation.
    pub const fn opcode(self) -> [u8; 5] {
        match self {
            Command::TurnOn | Command::TurnOff => OPCODE_ON_OFF_WRITE,
            Command::ReadOnOff => OPCODE_ON_OFF_READ,
            Command::SetBrightness(_) => OPCODE_BRIGHTNESS_WRITE,
            Command::ReadBrightness => OPCODE_BRIGHTNESS_READ,
            Command::SetCurtainPosition(_) => OPCODE_CURTAIN_WRITE,
            Command::ReadCurtainPosition => OPCODE_CURTAIN_READ,
        }
    }

    /// Bytes that follow the value byte.
    pub const fn trailer(self) -> &'static [u8] {
        match self {
            Command::SetBrightness(_) => &BRIGHTNESS_WRITE_TRAILER,
            Command::SetCurtainPosition(_) => &CURTAIN_WRITE_TRAILER,
            _ => &[],
        }
    }
}

/// A decoded outbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestFrame {
    pub address: ModuleAddress,
    pub channel: ChannelId,
    pub command: Command,
}

impl RequestFrame {
    pub fn key(&self) -> CorrelationKey {
        CorrelationKey::new(self.address, self.channel)
    }
}

// ── Responses ─────────────────────────────────────────────────────────────────

/// The common 5-byte header present on every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Raw priority byte; replies are not restricted to the two request values.
    pub priority: u8,
    pub address: ModuleAddress,
    pub channel: ChannelId,
}

impl FrameHeader {
    pub fn key(&self) -> CorrelationKey {
        CorrelationKey::new(self.address, self.channel)
    }
}

/// Outcome of classifying an inbound datagram.
///
/// Exactly one variant applies to any byte sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    OnOffStatus,
    BrightnessValue,
    CurtainPosition,
    Unrecognized,
}

/// The semantic value carried by a status reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusValue {
    OnOff(bool),
    /// Dimmer level, 0–100.
    Brightness(u8),
    /// Curtain position, 0–100, in the device's own orientation.
    CurtainPosition(u8),
}

impl StatusValue {
    /// The value assumed for a device nobody has heard from yet: off, or 0.
    pub const fn default_for(kind: ResponseKind) -> Option<StatusValue> {
        match kind {
            ResponseKind::OnOffStatus => Some(StatusValue::OnOff(false)),
            ResponseKind::BrightnessValue => Some(StatusValue::Brightness(0)),
            ResponseKind::CurtainPosition => Some(StatusValue::CurtainPosition(0)),
            ResponseKind::Unrecognized => None,
        }
    }

    pub const fn kind(self) -> ResponseKind {
        match self {
            StatusValue::OnOff(_) => ResponseKind::OnOffStatus,
            StatusValue::Brightness(_) => ResponseKind::BrightnessValue,
            StatusValue::CurtainPosition(_) => ResponseKind::CurtainPosition,
        }
    }

    pub const fn as_on_off(self) -> Option<bool> {
        match self {
            StatusValue::OnOff(on) => Some(on),
            _ => None,
        }
    }

    /// Returns the level for brightness or curtain values.
    pub const fn as_level(self) -> Option<u8> {
        match self {
            StatusValue::Brightness(v) | StatusValue::CurtainPosition(v) => Some(v),
            StatusValue::OnOff(_) => None,
        }
    }
}

/// A classified and decoded inbound status frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusReport {
    pub header: FrameHeader,
    pub value: StatusValue,
}

impl StatusReport {
    /// The key under which waiters for this device are registered.
    pub fn key(&self) -> CorrelationKey {
        self.header.key()
    }

    pub fn kind(&self) -> ResponseKind {
        self.value.kind()
    }
}
