//! Bounded-latency reads.
//!
//! A read races the device's reply against a deadline and ends in exactly
//! one of two ways:
//!
//! ```text
//!             ┌── reply first ───▶ Fresh(value)
//! Racing ─────┤
//!             └── deadline first ▶ Cached(last known value, or default)
//! ```
//!
//! A dimmer reports on/off and brightness under one key, so a reply of the
//! other kind can wake the read first.  The read then queues a new waiter
//! and keeps racing the same deadline.
//!
//! When the deadline wins the waiter is left registered.  A late reply
//! still reaches the cache through the client's ingestion path, but it can
//! never complete the original read a second time: that read's receiver no
//! longer exists.

use std::time::Duration;

use mox_core::{ResponseKind, StatusValue};
use tokio::time::{timeout_at, Instant};
use tracing::debug;

use crate::application::correlation::PendingReply;

/// How long a read waits for the device before answering from the cache.
pub const DEFAULT_STATUS_TIMEOUT: Duration = Duration::from_millis(500);

/// How a bounded read was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome<T> {
    /// The device replied before the deadline.
    Fresh(T),
    /// The deadline passed first (or the client shut down); the value came
    /// from the cache.
    Cached(T),
}

impl<T> ReadOutcome<T> {
    pub fn into_inner(self) -> T {
        match self {
            ReadOutcome::Fresh(v) | ReadOutcome::Cached(v) => v,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, ReadOutcome::Fresh(_))
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ReadOutcome<U> {
        match self {
            ReadOutcome::Fresh(v) => ReadOutcome::Fresh(f(v)),
            ReadOutcome::Cached(v) => ReadOutcome::Cached(f(v)),
        }
    }
}

/// Races `reply` against `deadline`.
///
/// `fallback` is evaluated only once the race is over, so it sees any value
/// cached while the read was waiting.  A reply of a different kind than
/// `expected` does not end the race: a fresh waiter is registered for the
/// same key and the read waits out the rest of the deadline.
pub async fn race_reply<F>(
    reply: PendingReply,
    deadline: Duration,
    expected: ResponseKind,
    fallback: F,
) -> ReadOutcome<StatusValue>
where
    F: FnOnce() -> StatusValue,
{
    let key = reply.key();
    let registry = reply.registry().clone();
    let expires = Instant::now() + deadline;
    let mut reply = reply;
    loop {
        match timeout_at(expires, reply.recv()).await {
            Ok(Some(report)) if report.kind() == expected => return ReadOutcome::Fresh(report.value),
            Ok(Some(report)) => {
                debug!(%key, got = ?report.kind(), ?expected, "reply of another kind; still waiting");
                reply = registry.register(key);
            }
            Ok(None) => {
                debug!(%key, "reply channel closed; using cache");
                return ReadOutcome::Cached(fallback());
            }
            Err(_) => {
                debug!(%key, ?deadline, "no reply before deadline; using cache");
                return ReadOutcome::Cached(fallback());
            }
        }
    }
}
