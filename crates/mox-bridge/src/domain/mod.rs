//! Domain layer for mox-bridge.
//!
//! Pure types with no I/O: the config file schema and the vocabulary used to
//! talk about accessories (kinds, characteristics, values).

pub mod accessory;
pub mod config;

pub use accessory::{
    clamp_percent, AccessoryKind, Characteristic, CharacteristicValue, DomainError, PositionState,
};
pub use config::{AccessoryConfig, BridgeConfig, ConfigError, EntryConfig};
