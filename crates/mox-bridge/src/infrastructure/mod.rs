//! Infrastructure layer for mox-bridge.
//!
//! - **`config_file`** – Reads the TOML config from disk.
//! - **`mox_link`** – [`DeviceLink`](crate::application::DeviceLink) over a
//!   real [`MoxClient`](mox_client::MoxClient), and the startup routine that
//!   binds it.
//!
//! **Dependency rule**: this layer may depend on `application`, `domain` and
//! the `mox_*` crates, but MUST NOT be imported by `application` or `domain`.

pub mod config_file;
pub mod mox_link;

pub use config_file::load_config;
pub use mox_link::{client_config, connect};
