//! Bridge configuration schema.
//!
//! The file lists the MOX endpoints and, per room, the accessories wired to
//! each module channel:
//!
//! ```toml
//! client_ip_address = "172.16.254.1"   # required
//! client_port_number = 6666
//! server_ip_address = "172.16.254.254"
//! server_port_number = 6670
//! status_timeout_ms = 500
//! log_level = "info"
//!
//! [[entries]]
//! name = "Living room"
//!
//!   [[entries.accessories]]
//!   name = "Ceiling"
//!   type = "dimmer"
//!   module_id = "0x0000cb"
//!   channel_id = "01"
//! ```
//!
//! # Serde default values
//!
//! Fields annotated with `#[serde(default = "some_fn")]` take the value of
//! `some_fn()` when absent, so a minimal file only needs
//! `client_ip_address`.
//!
//! `module_id` and `channel_id` are parsed into typed addresses while the
//! file is read, so a malformed one fails the whole load.  An unknown
//! accessory `type` does not: that accessory is skipped when the platform
//! is built.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use mox_core::{ChannelId, CorrelationKey, ModuleAddress};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML is malformed or a field has an invalid value.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The file parsed but describes something unusable.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ── Schema ────────────────────────────────────────────────────────────────────

/// Top-level bridge configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BridgeConfig {
    /// Local address the client binds; the server sends replies here.
    pub client_ip_address: IpAddr,
    #[serde(default = "default_client_port")]
    pub client_port_number: u16,
    #[serde(default = "default_server_ip")]
    pub server_ip_address: IpAddr,
    #[serde(default = "default_server_port")]
    pub server_port_number: u16,
    /// Deadline for status reads, in milliseconds.
    #[serde(default = "default_status_timeout_ms")]
    pub status_timeout_ms: u64,
    /// `tracing` filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub entries: Vec<EntryConfig>,
}

/// A room and the accessories in it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntryConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub accessories: Vec<AccessoryConfig>,
}

/// One accessory wired to a module channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessoryConfig {
    pub name: String,
    /// `light`, `dimmer`, `switch` or `window` (any case).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub module_id: ModuleAddress,
    pub channel_id: ChannelId,
}

impl AccessoryConfig {
    pub fn key(&self) -> CorrelationKey {
        CorrelationKey::new(self.module_id, self.channel_id)
    }
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_client_port() -> u16 {
    6666
}
fn default_server_ip() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(172, 16, 254, 254))
}
fn default_server_port() -> u16 {
    6670
}
fn default_status_timeout_ms() -> u64 {
    500
}
fn default_log_level() -> String {
    "info".to_string()
}

// ── Behaviour ─────────────────────────────────────────────────────────────────

impl BridgeConfig {
    /// Parses and validates a config document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for malformed TOML, a missing
    /// `client_ip_address`, or an invalid `module_id` / `channel_id`;
    /// [`ConfigError::Invalid`] for accessories with an empty name.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: BridgeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for entry in &self.entries {
            for accessory in &entry.accessories {
                if accessory.name.trim().is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "accessory on {} channel {} in {:?} has no name",
                        accessory.module_id, accessory.channel_id, entry.name
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn client_addr(&self) -> SocketAddr {
        SocketAddr::new(self.client_ip_address, self.client_port_number)
    }

    pub fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server_ip_address, self.server_port_number)
    }

    pub fn status_timeout(&self) -> Duration {
        Duration::from_millis(self.status_timeout_ms)
    }

    /// Every configured accessory, across all rooms, in file order.
    pub fn accessories(&self) -> impl Iterator<Item = &AccessoryConfig> {
        self.entries.iter().flat_map(|entry| entry.accessories.iter())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
