//! MOX LT module addresses.
//!
//! A module address (often called the module "OID") is three bytes – high,
//! middle, low – that identify one physical control module on the MOX bus.
//! Configuration files spell it as `0x` followed by six hex digits, e.g.
//! `0x0000cb`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::AddressError;

/// Three-byte identity of a physical MOX LT control module.
///
/// # Examples
///
/// ```rust
/// use mox_core::ModuleAddress;
///
/// let addr: ModuleAddress = "0x0000cb".parse().unwrap();
/// assert_eq!(addr.bytes(), [0x00, 0x00, 0xCB]);
/// assert_eq!(addr, ModuleAddress::from([0x00, 0x00, 0xCB]));
/// assert_eq!(addr.to_string(), "0x0000cb");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModuleAddress {
    high: u8,
    mid: u8,
    low: u8,
}

impl ModuleAddress {
    /// Length of the textual form, including the `0x` prefix.
    pub const TEXT_LEN: usize = 8;

    /// Creates an address from its three component bytes.
    pub const fn new(high: u8, mid: u8, low: u8) -> Self {
        Self { high, mid, low }
    }

    /// Parses the `0xHHHHHH` textual form.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::InvalidModuleAddress`] for any other shape:
    /// wrong length, missing prefix, or non-hex digits.
    pub fn parse(text: &str) -> Result<Self, AddressError> {
        let invalid = || AddressError::InvalidModuleAddress(text.to_string());

        if text.len() != Self::TEXT_LEN {
            return Err(invalid());
        }
        let digits = text.strip_prefix("0x").ok_or_else(invalid)?;
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let byte_at = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self::new(byte_at(0)?, byte_at(2)?, byte_at(4)?))
    }

    /// Returns `[high, mid, low]` in wire order.
    pub const fn bytes(self) -> [u8; 3] {
        [self.high, self.mid, self.low]
    }

    pub const fn high(self) -> u8 {
        self.high
    }

    pub const fn mid(self) -> u8 {
        self.mid
    }

    pub const fn low(self) -> u8 {
        self.low
    }
}

impl From<[u8; 3]> for ModuleAddress {
    fn from(bytes: [u8; 3]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2])
    }
}

impl TryFrom<&[u8]> for ModuleAddress {
    type Error = AddressError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let raw: [u8; 3] = bytes
            .try_into()
            .map_err(|_| AddressError::InvalidModuleAddressLength(bytes.len()))?;
        Ok(Self::from(raw))
    }
}

impl FromStr for ModuleAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ModuleAddress {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ModuleAddress> for String {
    fn from(addr: ModuleAddress) -> Self {
        addr.to_string()
    }
}

impl fmt::Display for ModuleAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02x}{:02x}{:02x}", self.high, self.mid, self.low)
    }
}
