//! mox-client library entry point.
//!
//! # What does mox-client do? (for beginners)
//!
//! A MOX LT server answers commands over UDP, but its replies carry no
//! request id and may never arrive at all.  This crate turns that into
//! something a caller can `await`:
//!
//! 1. [`MoxClient`] binds a local UDP socket and sends encoded commands to
//!    the server's fixed endpoint.
//! 2. Every inbound datagram is classified.  Status replies resolve all
//!    outstanding reads for that device, update the [`StatusCache`], and are
//!    broadcast to subscribers.
//! 3. [`MoxClient::read_status`] races a reply against a deadline.  If the
//!    server is silent it answers from the cache instead, so callers always
//!    get *some* value within a bounded time.

/// Application layer: reply correlation, status cache, bounded reads.
pub mod application;

/// Infrastructure layer: the UDP transport and the client that drives it.
pub mod infrastructure;

pub use application::bounded_read::{ReadOutcome, DEFAULT_STATUS_TIMEOUT};
pub use application::correlation::{CorrelationRegistry, PendingReply, SharedRegistry, WaiterTicket};
pub use application::status_cache::StatusCache;
pub use infrastructure::client::{ClientConfig, ClientError, MoxClient, StatusEvent};
pub use infrastructure::transport::{DatagramSink, InboundHandler, TransportError, UdpTransport};
