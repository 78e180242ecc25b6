//! Reply correlation: who is waiting for which device.
//!
//! MOX LT replies carry no request id, only the module address and channel
//! they are about.  So instead of matching a reply to *one* request, the
//! registry keeps a FIFO queue of waiters per [`CorrelationKey`] and, when a
//! reply for that key arrives, hands the same value to every waiter in the
//! queue at once.  After a reply the queue is always empty.
//!
//! # Abandoned waiters
//!
//! A bounded read that hits its deadline stops listening but does not
//! unregister; a reply may still be on its way and the next one for that
//! key flushes the queue anyway.  A device that never answers would let
//! those dead entries pile up, so once a queue reaches
//! [`MAX_QUEUED_PER_KEY`] every waiter whose receiver is gone is discarded
//! before the next one is added.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use mox_core::{CorrelationKey, StatusReport};
use tokio::sync::oneshot;
use tracing::{debug, trace};

/// Queue length at which closed waiters are evicted on registration.
pub const MAX_QUEUED_PER_KEY: usize = 64;

/// Identifies one registered waiter so it can be cancelled later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WaiterTicket {
    key: CorrelationKey,
    id: u64,
}

impl WaiterTicket {
    pub fn key(&self) -> CorrelationKey {
        self.key
    }
}

struct PendingWaiter {
    id: u64,
    tx: oneshot::Sender<StatusReport>,
}

/// Per-key FIFO queues of callers awaiting a status reply.
#[derive(Default)]
pub struct CorrelationRegistry {
    queues: HashMap<CorrelationKey, VecDeque<PendingWaiter>>,
    next_id: u64,
}

impl CorrelationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a waiter to the queue for `key`.
    pub fn register(&mut self, key: CorrelationKey) -> (WaiterTicket, oneshot::Receiver<StatusReport>) {
        let (tx, rx) = oneshot::channel();
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);

        let queue = self.queues.entry(key).or_default();
        if queue.len() >= MAX_QUEUED_PER_KEY {
            let before = queue.len();
            queue.retain(|w| !w.tx.is_closed());
            debug!(%key, evicted = before - queue.len(), "evicted abandoned waiters");
        }
        queue.push_back(PendingWaiter { id, tx });

        (WaiterTicket { key, id }, rx)
    }

    /// Resolves every waiter queued under the report's key, oldest first,
    /// and returns how many were still listening.
    ///
    /// The queue is left empty whether or not anyone was listening.
    pub fn resolve(&mut self, report: &StatusReport) -> usize {
        let Some(queue) = self.queues.remove(&report.key()) else {
            return 0;
        };

        let mut delivered = 0;
        for waiter in queue {
            if waiter.tx.send(*report).is_ok() {
                delivered += 1;
            } else {
                trace!(id = waiter.id, "waiter stopped listening before its reply");
            }
        }
        delivered
    }

    /// Removes one waiter without resolving it.  Returns `false` if it was
    /// already resolved or cancelled.
    pub fn cancel(&mut self, ticket: &WaiterTicket) -> bool {
        let Some(queue) = self.queues.get_mut(&ticket.key) else {
            return false;
        };
        let Some(pos) = queue.iter().position(|w| w.id == ticket.id) else {
            return false;
        };
        queue.remove(pos);
        if queue.is_empty() {
            self.queues.remove(&ticket.key);
        }
        true
    }

    /// Number of waiters queued for `key`.
    pub fn pending(&self, key: &CorrelationKey) -> usize {
        self.queues.get(key).map_or(0, VecDeque::len)
    }

    pub fn total_pending(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum()
    }

    /// Drops every waiter.  Their receivers observe a closed channel.
    pub fn clear(&mut self) {
        self.queues.clear();
    }
}

// ── Shared handle ─────────────────────────────────────────────────────────────

/// A [`CorrelationRegistry`] shared between the receive task and callers.
///
/// The lock is only ever held for the duration of one registry call, never
/// across an `.await`.
#[derive(Clone, Default)]
pub struct SharedRegistry(Arc<Mutex<CorrelationRegistry>>);

impl SharedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CorrelationRegistry> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a waiter for `key` and returns a handle to await its reply.
    pub fn register(&self, key: CorrelationKey) -> PendingReply {
        let (ticket, rx) = self.lock().register(key);
        PendingReply {
            ticket,
            rx,
            registry: self.clone(),
        }
    }

    pub fn resolve(&self, report: &StatusReport) -> usize {
        self.lock().resolve(report)
    }

    pub fn cancel(&self, ticket: &WaiterTicket) -> bool {
        self.lock().cancel(ticket)
    }

    pub fn pending(&self, key: &CorrelationKey) -> usize {
        self.lock().pending(key)
    }

    pub fn total_pending(&self) -> usize {
        self.lock().total_pending()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

/// An outstanding wait for the next status reply about one device.
///
/// Dropping a `PendingReply` without cancelling it leaves its waiter queued
/// until the next reply for that key arrives.
pub struct PendingReply {
    ticket: WaiterTicket,
    rx: oneshot::Receiver<StatusReport>,
    registry: SharedRegistry,
}

impl PendingReply {
    pub fn key(&self) -> CorrelationKey {
        self.ticket.key
    }

    pub fn ticket(&self) -> WaiterTicket {
        self.ticket
    }

    /// The registry this waiter is queued in.
    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// Waits for the reply.  Returns `None` if the registry dropped the
    /// waiter without resolving it (client shutdown).
    pub async fn recv(self) -> Option<StatusReport> {
        self.rx.await.ok()
    }

    /// Withdraws the waiter from the registry.
    pub fn cancel(self) -> bool {
        self.registry.cancel(&self.ticket)
    }
}

impl std::fmt::Debug for PendingReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingReply").field("ticket", &self.ticket).finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
