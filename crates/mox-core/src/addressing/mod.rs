//! Device identity: module addresses, channels and correlation keys.

pub mod channel;
pub mod correlation;
pub mod module;

pub use channel::ChannelId;
pub use correlation::CorrelationKey;
pub use module::ModuleAddress;

use thiserror::Error;

/// Errors produced while parsing a module address or channel id.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// The text is not of the form `0x` followed by six hex digits.
    #[error("invalid module address {0:?}: expected `0x` followed by 6 hex digits")]
    InvalidModuleAddress(String),

    /// A raw byte sequence did not contain exactly three bytes.
    #[error("invalid module address: expected 3 bytes, got {0}")]
    InvalidModuleAddressLength(usize),

    /// The text is not a one or two digit hexadecimal channel.
    #[error("invalid channel id {0:?}: expected 1-2 hex digits with an optional `0x` prefix")]
    InvalidChannel(String),
}
