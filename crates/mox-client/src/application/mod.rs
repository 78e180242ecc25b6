//! Application layer for the MOX client.
//!
//! Nothing here touches a socket.  These modules decide what happens to a
//! reply once it has been decoded:
//!
//! - **`correlation`** – Queues of callers waiting for a reply from a given
//!   device, resolved together when one arrives.
//! - **`status_cache`** – Last value heard from each device, used when the
//!   server does not answer in time.
//! - **`bounded_read`** – The race between a reply and a deadline.

pub mod bounded_read;
pub mod correlation;
pub mod status_cache;
