//! # mox-core
//!
//! Shared library for the MOX LT bridge containing the wire codec, module
//! addressing, and the correlation keys used to match replies to requests.
//!
//! This crate has zero dependencies on sockets, async runtimes, or
//! configuration files; everything here is pure translation between typed
//! values and bytes.
//!
//! # Architecture overview (for beginners)
//!
//! A MOX LT server is a home-automation controller that speaks a tiny binary
//! protocol over UDP.  Every frame starts with the same 5-byte header
//! (priority, 3-byte module address, channel) followed by a fixed "opcode"
//! block that says what the frame is about.
//!
//! - **`addressing`** – Which device a frame is about.  A `ModuleAddress`
//!   names a physical control module, a `ChannelId` picks one relay or dimmer
//!   inside it, and a `CorrelationKey` is the stable identity derived from the
//!   pair.  Replies from the server carry no request id, so the key is the
//!   only thing that ties a reply back to the request that caused it.
//!
//! - **`protocol`** – How bytes travel over the network.  Commands are laid
//!   out into fixed byte templates; inbound frames are classified by their
//!   exact length and opcode bytes and decoded into a typed `StatusReport`.

pub mod addressing;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `mox_core::ModuleAddress` instead of `mox_core::addressing::module::ModuleAddress`.
pub use addressing::{AddressError, ChannelId, CorrelationKey, ModuleAddress};
pub use protocol::codec::{
    classify, decode_command, decode_header, decode_response, encode_command, ProtocolError,
};
pub use protocol::messages::{
    Command, FrameHeader, Priority, RequestFrame, ResponseKind, StatusReport, StatusValue,
};
