//! Binary codec for MOX LT frames.
//!
//! Wire format:
//! ```text
//! [priority:1][oid_h:1][oid_m:1][oid_l:1][channel:1][opcode:5][value:1][trailer:N]
//! ```
//!
//! The wire has no length prefix and no framing, so inbound datagrams are
//! recognised purely by their exact length and a handful of fixed bytes.
//! Anything that does not match a known template is simply not ours: it
//! classifies as [`ResponseKind::Unrecognized`] and is dropped without error.

use thiserror::Error;
use tracing::trace;

use crate::addressing::{ChannelId, ModuleAddress};
use crate::protocol::messages::{
    Command, FrameHeader, Priority, RequestFrame, ResponseKind, StatusReport, StatusValue,
    BRIGHTNESS_WRITE_TRAILER, CURTAIN_WRITE_TRAILER, HEADER_SIZE, LEVEL_RESPONSE_LEN,
    ON_OFF_RESPONSE_LEN, OPCODE_BRIGHTNESS_READ, OPCODE_BRIGHTNESS_WRITE, OPCODE_CURTAIN_WRITE,
    OPCODE_OFFSET, OPCODE_ON_OFF_READ, OPCODE_ON_OFF_WRITE, RESPONSE_BRIGHTNESS,
    RESPONSE_CURTAIN, RESPONSE_ON_OFF, VALUE_OFFSET,
};

/// Errors that can occur while decoding a frame.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The byte slice is shorter than the 5-byte frame header.
    #[error("insufficient data: need at least {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },

    /// The bytes after the header do not match any request template.
    #[error("unknown command frame ({len} bytes, opcode {opcode:02X?})")]
    UnknownCommand { len: usize, opcode: Vec<u8> },
}

// ── Encoding ──────────────────────────────────────────────────────────────────

/// Encodes `command` for the device at `address` / `channel`.
///
/// Values are copied verbatim; nothing is clamped here.
///
/// # Examples
///
/// ```rust
/// use mox_core::{encode_command, ChannelId, Command, ModuleAddress};
///
/// let addr: ModuleAddress = "0x0000cb".parse().unwrap();
/// let bytes = encode_command(addr, ChannelId(1), Command::SetBrightness(42));
/// assert_eq!(
///     bytes,
///     [0x03, 0x00, 0x00, 0xCB, 0x01, 0x02, 0x00, 0x00, 0x02, 0x06, 42, 0x00, 0x64, 0x00]
/// );
/// ```
pub fn encode_command(address: ModuleAddress, channel: ChannelId, command: Command) -> Vec<u8> {
    let trailer = command.trailer();
    let mut buf = Vec::with_capacity(HEADER_SIZE + 6 + trailer.len());

    buf.push(command.priority() as u8);
    buf.extend_from_slice(&address.bytes());
    buf.push(channel.get());
    buf.extend_from_slice(&command.opcode());
    if let Some(value) = command.value() {
        buf.push(value);
    }
    buf.extend_from_slice(trailer);
    buf
}

// ── Header ────────────────────────────────────────────────────────────────────

/// Decodes the 5-byte header shared by every frame.
///
/// # Errors
///
/// Returns [`ProtocolError::InsufficientData`] if `bytes` is shorter than
/// the header.
pub fn decode_header(bytes: &[u8]) -> Result<FrameHeader, ProtocolError> {
    if bytes.len() < HEADER_SIZE {
        return Err(ProtocolError::InsufficientData {
            needed: HEADER_SIZE,
            available: bytes.len(),
        });
    }
    Ok(FrameHeader {
        priority: bytes[0],
        address: ModuleAddress::new(bytes[1], bytes[2], bytes[3]),
        channel: ChannelId(bytes[4]),
    })
}

// ── Responses ─────────────────────────────────────────────────────────────────

/// Classifies an inbound datagram by exact length and fixed opcode bytes.
///
/// Total over every input: short or unknown buffers are `Unrecognized`.
pub fn classify(bytes: &[u8]) -> ResponseKind {
    let opcode = |b: &[u8]| -> [u8; 5] {
        let mut op = [0u8; 5];
        op.copy_from_slice(&b[OPCODE_OFFSET..OPCODE_OFFSET + 5]);
        op
    };

    match bytes.len() {
        ON_OFF_RESPONSE_LEN if opcode(bytes) == RESPONSE_ON_OFF => ResponseKind::OnOffStatus,
        LEVEL_RESPONSE_LEN if bytes[LEVEL_RESPONSE_LEN - 1] == 0x00 => match opcode(bytes) {
            RESPONSE_BRIGHTNESS => ResponseKind::BrightnessValue,
            RESPONSE_CURTAIN => ResponseKind::CurtainPosition,
            _ => ResponseKind::Unrecognized,
        },
        _ => ResponseKind::Unrecognized,
    }
}

/// Decodes an inbound status frame.
///
/// Returns `Ok(None)` for frames that classify as unrecognized; that is
/// expected traffic, not an error.
///
/// # Errors
///
/// Returns [`ProtocolError::InsufficientData`] only when `bytes` is shorter
/// than the 5-byte header.
///
/// # Examples
///
/// ```rust
/// use mox_core::{decode_response, StatusValue};
///
/// let frame = [0x02, 0x00, 0x00, 0xCB, 0x01, 0x03, 0x00, 0x00, 0x03, 0x04, 42, 0x00];
/// let report = decode_response(&frame).unwrap().unwrap();
/// assert_eq!(report.value, StatusValue::Brightness(42));
/// ```
pub fn decode_response(bytes: &[u8]) -> Result<Option<StatusReport>, ProtocolError> {
    let header = decode_header(bytes)?;

    let value = match classify(bytes) {
        ResponseKind::OnOffStatus => StatusValue::OnOff(bytes[VALUE_OFFSET] == 0x01),
        ResponseKind::BrightnessValue => StatusValue::Brightness(bytes[VALUE_OFFSET]),
        ResponseKind::CurtainPosition => StatusValue::CurtainPosition(bytes[VALUE_OFFSET]),
        ResponseKind::Unrecognized => {
            trace!(len = bytes.len(), "unrecognized frame for {}", header.address);
            return Ok(None);
        }
    };

    Ok(Some(StatusReport { header, value }))
}

// ── Requests ──────────────────────────────────────────────────────────────────

/// Decodes an outbound frame back into a [`RequestFrame`].
///
/// The on/off query and the curtain query share one template; it decodes as
/// [`Command::ReadOnOff`].
///
/// # Errors
///
/// Returns [`ProtocolError::InsufficientData`] for buffers shorter than the
/// header and [`ProtocolError::UnknownCommand`] when the rest of the frame
/// matches no request template.
pub fn decode_command(bytes: &[u8]) -> Result<RequestFrame, ProtocolError> {
    let header = decode_header(bytes)?;
    let body = &bytes[HEADER_SIZE..];
    let priority = Priority::try_from(header.priority).ok();

    let command = match (priority, body) {
        (Some(Priority::Write), [o0, o1, o2, o3, o4, value])
            if [*o0, *o1, *o2, *o3, *o4] == OPCODE_ON_OFF_WRITE && *value <= 0x01 =>
        {
            if *value == 0x01 {
                Command::TurnOn
            } else {
                Command::TurnOff
            }
        }
        (Some(Priority::Write), [o0, o1, o2, o3, o4, value, trailer @ ..])
            if [*o0, *o1, *o2, *o3, *o4] == OPCODE_BRIGHTNESS_WRITE
                && trailer == BRIGHTNESS_WRITE_TRAILER =>
        {
            Command::SetBrightness(*value)
        }
        (Some(Priority::Write), [o0, o1, o2, o3, o4, value, trailer @ ..])
            if [*o0, *o1, *o2, *o3, *o4] == OPCODE_CURTAIN_WRITE
                && trailer == CURTAIN_WRITE_TRAILER =>
        {
            Command::SetCurtainPosition(*value)
        }
        (Some(Priority::Query), [o0, o1, o2, o3, o4]) if [*o0, *o1, *o2, *o3, *o4] == OPCODE_ON_OFF_READ => {
            Command::ReadOnOff
        }
        (Some(Priority::Query), [o0, o1, o2, o3, o4])
            if [*o0, *o1, *o2, *o3, *o4] == OPCODE_BRIGHTNESS_READ =>
        {
            Command::ReadBrightness
        }
        _ => {
            return Err(ProtocolError::UnknownCommand {
                len: bytes.len(),
                opcode: body.iter().take(5).copied().collect(),
            })
        }
    };

    Ok(RequestFrame {
        address: header.address,
        channel: header.channel,
        command,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
