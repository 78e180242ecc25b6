//! Application layer for mox-bridge.
//!
//! - **`link`** – The [`DeviceLink`] seam accessories use to reach devices.
//! - **`accessories`** – Light, dimmer, switch and window accessories.
//! - **`platform`** – Builds the accessory list from config and primes it.

pub mod accessories;
pub mod link;
pub mod platform;

pub use accessories::{build_accessory, Accessory, AccessoryError};
pub use link::DeviceLink;
pub use platform::Platform;
