//! Channel selectors within a module.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::AddressError;

/// Selects one sub-control (relay, dimmer output, curtain motor) inside a
/// module.
///
/// Configuration files write channels in hexadecimal, with or without a
/// `0x` prefix (`"01"`, `"0x1f"`, `"a"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChannelId(pub u8);

impl ChannelId {
    /// Returns the raw channel byte.
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl From<u8> for ChannelId {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl From<ChannelId> for u8 {
    fn from(channel: ChannelId) -> Self {
        channel.0
    }
}

impl FromStr for ChannelId {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(AddressError::InvalidChannel(s.to_string()));
        }
        u8::from_str_radix(digits, 16)
            .map(Self)
            .map_err(|_| AddressError::InvalidChannel(s.to_string()))
    }
}

impl TryFrom<String> for ChannelId {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ChannelId> for String {
    fn from(channel: ChannelId) -> Self {
        channel.to_string()
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02x}", self.0)
    }
}
