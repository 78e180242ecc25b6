//! mox-bridge library crate.
//!
//! Exposes the devices wired to a MOX LT server as named accessories (a
//! light, a dimmer, a switch, a window covering) configured from a TOML file.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! mox-bridge CLI (run / list / get / set)
//!         ↕
//! [mox-bridge]
//!   ├── domain/           Config schema, accessory kinds, characteristics
//!   ├── application/      Accessories and the platform that builds them
//!   └── infrastructure/
//!         ├── config_file/ Loading the TOML file from disk
//!         └── mox_link/    DeviceLink backed by a MoxClient
//!         ↕
//! MOX LT server (binary UDP, port 6670)
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O and no async.
//! - `application` talks to devices only through the [`application::DeviceLink`]
//!   trait, so accessories can be tested against recording doubles.
//! - `infrastructure` depends on all other layers plus `mox-client`.

/// Domain layer: configuration schema and accessory vocabulary.
pub mod domain;

/// Application layer: accessories and the platform.
pub mod application;

/// Infrastructure layer: config file and the MOX client link.
pub mod infrastructure;
