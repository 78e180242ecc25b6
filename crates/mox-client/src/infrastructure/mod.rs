//! Infrastructure layer for the MOX client.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `mox_core`, but MUST NOT be imported by the `application` layer.
//!
//! - **`transport`** – The UDP socket: one send path, one receive task.
//! - **`client`** – [`client::MoxClient`], which wires the transport to the
//!   application layer.

pub mod client;
pub mod transport;
