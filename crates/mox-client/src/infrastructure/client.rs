//! [`MoxClient`]: the public face of the crate.
//!
//! Architecture:
//! - The client owns one [`DatagramSink`] (normally a [`UdpTransport`]) for
//!   outbound commands.
//! - The transport's receive task calls [`Inbound::on_datagram`], which
//!   decodes the datagram, updates the [`StatusCache`], resolves waiters in
//!   the [`SharedRegistry`], and broadcasts a [`StatusEvent`].
//! - Reads register their waiter *before* the query goes out, so a fast
//!   reply can never arrive ahead of the waiter it belongs to.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use mox_core::{
    decode_response, encode_command, ChannelId, Command, CorrelationKey, ModuleAddress,
    StatusReport, StatusValue,
};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::application::bounded_read::{race_reply, ReadOutcome, DEFAULT_STATUS_TIMEOUT};
use crate::application::correlation::{PendingReply, SharedRegistry};
use crate::application::status_cache::StatusCache;
use crate::infrastructure::transport::{DatagramSink, InboundHandler, TransportError, UdpTransport};

/// Default MOX LT server endpoint.
pub const DEFAULT_SERVER_ADDR: SocketAddrV4 = SocketAddrV4::new(Ipv4Addr::new(172, 16, 254, 254), 6670);

/// Default local port; the server sends its replies here.
pub const DEFAULT_CLIENT_PORT: u16 = 6666;

/// Capacity of the status broadcast channel.  Slow subscribers lag and skip
/// events rather than holding up the receive task.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Errors returned by [`MoxClient`] operations.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    /// A status read was requested with a write command.
    #[error("{0:?} is not a status query")]
    NotAQuery(Command),
    /// The client has been shut down.
    #[error("client is shut down")]
    Closed,
}

/// Endpoints and timing for a [`MoxClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Local address to bind.  The port is where the server sends replies.
    pub local_addr: SocketAddr,
    /// The MOX LT server's UDP endpoint.
    pub server_addr: SocketAddr,
    /// Deadline for bounded status reads.
    pub status_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            local_addr: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, DEFAULT_CLIENT_PORT)),
            server_addr: SocketAddr::V4(DEFAULT_SERVER_ADDR),
            status_timeout: DEFAULT_STATUS_TIMEOUT,
        }
    }
}

/// A decoded status reply, as seen by subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusEvent {
    pub key: CorrelationKey,
    pub report: StatusReport,
}

// ── Inbound path ──────────────────────────────────────────────────────────────

/// Everything the receive task needs.  Held separately from the client so
/// the task does not keep the client alive.
struct Inbound {
    registry: SharedRegistry,
    cache: Arc<StatusCache>,
    events: broadcast::Sender<StatusEvent>,
}

impl Inbound {
    fn ingest(&self, bytes: &[u8]) {
        let report = match decode_response(bytes) {
            Ok(Some(report)) => report,
            Ok(None) => return,
            Err(e) => {
                trace!("dropping short datagram: {e}");
                return;
            }
        };

        let key = report.key();
        self.cache.apply(&report);
        let delivered = self.registry.resolve(&report);
        debug!(
            "status {} ch {}: {:?} ({delivered} waiter(s))",
            report.header.address, report.header.channel, report.value
        );

        // No subscribers is not an error.
        let _ = self.events.send(StatusEvent { key, report });
    }
}

impl InboundHandler for Inbound {
    fn on_datagram(&self, bytes: &[u8], _from: SocketAddr) {
        self.ingest(bytes);
    }
}

// ── Client ────────────────────────────────────────────────────────────────────

/// Async client for one MOX LT server.
///
/// Every client owns its own registry, cache and socket; nothing is global.
pub struct MoxClient {
    inbound: Arc<Inbound>,
    sink: RwLock<Option<Arc<dyn DatagramSink>>>,
    receiver: Mutex<Option<JoinHandle<()>>>,
    local_addr: Option<SocketAddr>,
    status_timeout: Duration,
    closed: AtomicBool,
}

impl MoxClient {
    fn new(sink: Arc<dyn DatagramSink>, local_addr: Option<SocketAddr>, status_timeout: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inbound: Arc::new(Inbound {
                registry: SharedRegistry::new(),
                cache: Arc::new(StatusCache::new()),
                events,
            }),
            sink: RwLock::new(Some(sink)),
            receiver: Mutex::new(None),
            local_addr,
            status_timeout,
            closed: AtomicBool::new(false),
        }
    }

    /// Binds the local socket and starts receiving.  Returns once the
    /// socket is bound.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if the socket cannot be bound.
    pub async fn connect(config: ClientConfig) -> Result<Self, ClientError> {
        let transport = UdpTransport::bind(config.local_addr, config.server_addr).await?;
        let local_addr = transport.local_addr()?;

        let client = Self::new(Arc::new(transport.clone()), Some(local_addr), config.status_timeout);
        let handle = transport.spawn_receiver(Arc::clone(&client.inbound) as Arc<dyn InboundHandler>);
        *client.receiver.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);

        Ok(client)
    }

    /// Builds a client around an arbitrary sink.  Inbound datagrams must be
    /// fed through [`MoxClient::ingest`].
    pub fn with_transport(sink: Arc<dyn DatagramSink>, status_timeout: Duration) -> Self {
        Self::new(sink, None, status_timeout)
    }

    // ── Commands ──────────────────────────────────────────────────────────────

    /// Encodes and sends one command.  Values are sent exactly as given.
    pub async fn send_command(
        &self,
        address: ModuleAddress,
        channel: ChannelId,
        command: Command,
    ) -> Result<(), ClientError> {
        let sink = self.sink()?;
        let frame = encode_command(address, channel, command);
        debug!("send {command:?} to {address} ch {channel}");
        sink.send(&frame).await.map_err(|e| {
            warn!("send {command:?} to {address} ch {channel} failed: {e}");
            ClientError::from(e)
        })
    }

    pub async fn turn_on(&self, address: ModuleAddress, channel: ChannelId) -> Result<(), ClientError> {
        self.send_command(address, channel, Command::TurnOn).await
    }

    pub async fn turn_off(&self, address: ModuleAddress, channel: ChannelId) -> Result<(), ClientError> {
        self.send_command(address, channel, Command::TurnOff).await
    }

    pub async fn set_brightness(
        &self,
        address: ModuleAddress,
        channel: ChannelId,
        value: u8,
    ) -> Result<(), ClientError> {
        self.send_command(address, channel, Command::SetBrightness(value)).await
    }

    pub async fn set_curtain_position(
        &self,
        address: ModuleAddress,
        channel: ChannelId,
        value: u8,
    ) -> Result<(), ClientError> {
        self.send_command(address, channel, Command::SetCurtainPosition(value)).await
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    /// Registers a waiter for the device, then sends `command`.
    ///
    /// If the send fails the waiter is withdrawn before the error is
    /// returned.
    pub async fn query(
        &self,
        command: Command,
        address: ModuleAddress,
        channel: ChannelId,
    ) -> Result<PendingReply, ClientError> {
        if !command.is_query() {
            return Err(ClientError::NotAQuery(command));
        }
        let sink = self.sink()?;

        let pending = self.inbound.registry.register(CorrelationKey::new(address, channel));
        let frame = encode_command(address, channel, command);
        debug!("query {command:?} to {address} ch {channel}");
        if let Err(e) = sink.send(&frame).await {
            warn!("query {command:?} to {address} ch {channel} failed: {e}");
            pending.cancel();
            return Err(e.into());
        }
        Ok(pending)
    }

    /// Asks the device for its status and waits at most the configured
    /// status timeout for the answer.
    ///
    /// If the device stays silent the last cached value (or off / 0) is
    /// returned as [`ReadOutcome::Cached`].
    ///
    /// # Errors
    ///
    /// Only a failure to send the query is an error.
    pub async fn read_status(
        &self,
        command: Command,
        address: ModuleAddress,
        channel: ChannelId,
    ) -> Result<ReadOutcome<StatusValue>, ClientError> {
        let Some(kind) = command.reply_kind() else {
            return Err(ClientError::NotAQuery(command));
        };
        let default = StatusValue::default_for(kind).ok_or(ClientError::NotAQuery(command))?;
        let key = CorrelationKey::new(address, channel);

        let pending = self.query(command, address, channel).await?;
        let cache = Arc::clone(&self.inbound.cache);
        let outcome = race_reply(pending, self.status_timeout, kind, move || {
            cache.get(key, kind).unwrap_or(default)
        })
        .await;
        Ok(outcome)
    }

    // ── Inbound ───────────────────────────────────────────────────────────────

    /// Feeds one inbound datagram through the client.
    ///
    /// Unrecognized or short datagrams are dropped silently.  Recognized
    /// replies update the cache, resolve every waiter for that device and
    /// are broadcast to subscribers, whether or not anyone was waiting.
    pub fn ingest(&self, bytes: &[u8]) {
        self.inbound.ingest(bytes);
    }

    /// Subscribes to every status reply received from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.inbound.events.subscribe()
    }

    pub fn cache(&self) -> &StatusCache {
        &self.inbound.cache
    }

    /// Number of reads still waiting on the device.
    pub fn pending_replies(&self, address: ModuleAddress, channel: ChannelId) -> usize {
        self.inbound.registry.pending(&CorrelationKey::new(address, channel))
    }

    /// The bound local address, if this client owns a UDP socket.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn status_timeout(&self) -> Duration {
        self.status_timeout
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    /// Stops receiving, releases the socket and drops every pending waiter.
    ///
    /// Outstanding reads resolve from the cache immediately; later sends
    /// fail with [`ClientError::Closed`].  Calling it twice is harmless.
    pub fn shutdown(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(handle) = self.receiver.lock().unwrap_or_else(PoisonError::into_inner).take() {
            handle.abort();
        }
        self.sink.write().unwrap_or_else(PoisonError::into_inner).take();
        let dropped = self.inbound.registry.total_pending();
        self.inbound.registry.clear();
        info!("MOX client shut down ({dropped} pending read(s) dropped)");
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn sink(&self) -> Result<Arc<dyn DatagramSink>, ClientError> {
        self.sink
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(ClientError::Closed)
    }
}

impl Drop for MoxClient {
    fn drop(&mut self) {
        if let Some(handle) = self.receiver.lock().unwrap_or_else(PoisonError::into_inner).take() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for MoxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoxClient")
            .field("local_addr", &self.local_addr)
            .field("status_timeout", &self.status_timeout)
            .field("closed", &self.is_closed())
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
