//! Correlation keys: the only link between a reply and its request.
//!
//! # Why not a sequence number? (for beginners)
//!
//! Most request/response protocols stamp each request with an id and echo it
//! in the reply.  MOX LT does not: a status reply only says *which device* it
//! is about.  So the client files every outstanding read under a key derived
//! from the device identity (module address + channel) and, when a reply
//! arrives, looks up that same key from the address bytes inside the reply.
//!
//! The key is a name-based (version 5) UUID.  Version 5 UUIDs are a SHA-1
//! hash of a fixed namespace plus a name string, so the same device always
//! maps to the same key – across calls, across process restarts, and across
//! machines.  Subscribers that remember a key never need to re-synchronise.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ChannelId, ModuleAddress};

/// Namespace for MOX accessory identifiers.
const MOX_NAMESPACE: Uuid = Uuid::from_u128(0x17b8e566_afb6_4884_a77f_4e5e82deefec);

/// Stable identity of one (module, channel) pair.
///
/// # Examples
///
/// ```rust
/// use mox_core::{ChannelId, CorrelationKey, ModuleAddress};
///
/// let addr: ModuleAddress = "0x0000cb".parse().unwrap();
/// let a = CorrelationKey::new(addr, ChannelId(1));
/// let b = CorrelationKey::new(addr, ChannelId(1));
/// assert_eq!(a, b);
/// assert_ne!(a, CorrelationKey::new(addr, ChannelId(2)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationKey(Uuid);

impl CorrelationKey {
    /// Derives the key for `address` / `channel`.
    pub fn new(address: ModuleAddress, channel: ChannelId) -> Self {
        // Unpadded lowercase hex components, e.g. "0-0-cb-1".
        let name = format!(
            "{:x}-{:x}-{:x}-{:x}",
            address.high(),
            address.mid(),
            address.low(),
            channel.get()
        );
        Self(Uuid::new_v5(&MOX_NAMESPACE, name.as_bytes()))
    }

    /// Returns the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for CorrelationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_key_is_deterministic() {
        let addr = ModuleAddress::new(0x00, 0x00, 0xCB);
        assert_eq!(
            CorrelationKey::new(addr, ChannelId(1)),
            CorrelationKey::new(addr, ChannelId(1))
        );
    }

    #[test]
    fn test_key_is_a_version_5_uuid() {
        let key = CorrelationKey::new(ModuleAddress::new(1, 2, 3), ChannelId(4));
        assert_eq!(key.as_uuid().get_version_num(), 5);
    }

    #[test]
    fn test_key_matches_name_based_derivation() {
        // Arrange
        let addr = ModuleAddress::new(0x00, 0x01, 0x0A);
        let expected = Uuid::new_v5(&MOX_NAMESPACE, b"0-1-a-2");

        // Act
        let key = CorrelationKey::new(addr, ChannelId(2));

        // Assert
        assert_eq!(*key.as_uuid(), expected);
    }

    #[test]
    fn test_distinct_pairs_produce_distinct_keys() {
        // Every channel of a handful of neighbouring modules.
        let mut seen = HashSet::new();
        for low in 0..=8u8 {
            for channel in 0..=u8::MAX {
                let key = CorrelationKey::new(ModuleAddress::new(0, 0, low), ChannelId(channel));
                assert!(seen.insert(key), "collision at module {low}, channel {channel}");
            }
        }
    }

    #[test]
    fn test_module_and_channel_are_not_interchangeable() {
        let a = CorrelationKey::new(ModuleAddress::new(0, 0, 1), ChannelId(2));
        let b = CorrelationKey::new(ModuleAddress::new(0, 0, 2), ChannelId(1));
        assert_ne!(a, b);
    }
}
