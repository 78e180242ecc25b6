//! UDP transport to a MOX LT server.
//!
//! One socket per client, bound to a fixed local port (the server sends
//! replies to it) and sending to one fixed server endpoint.
//!
//! The transport never parses anything.  Outbound it writes the bytes it is
//! given; inbound a single receive task hands every datagram, raw, to one
//! [`InboundHandler`].
//!
//! # Errors
//!
//! - Failing to bind is fatal for the client: [`TransportError::BindFailed`].
//! - A failed send is reported to the caller that sent: [`TransportError::SendFailed`].
//! - Receive errors (e.g. ICMP port-unreachable surfacing as a reset on
//!   some platforms) are logged and the loop keeps going after a short
//!   pause, so a socket stuck in an error state cannot spin.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tracing::{info, trace, warn};

/// Largest datagram the receive loop accepts.  MOX LT frames are 12 bytes or
/// less; anything bigger is not ours anyway.
const RECV_BUFFER_SIZE: usize = 2048;

/// Pause after a receive error before reading again.
const RECV_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Errors that can occur in the UDP transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The local socket could not be bound.
    #[error("failed to bind UDP socket on {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    /// A datagram could not be written to the socket.
    #[error("failed to send to {addr}: {source}")]
    SendFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    /// Any other socket I/O error.
    #[error("socket I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The outbound half of a transport.
///
/// [`UdpTransport`] is the real implementation; tests substitute recording
/// doubles or mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DatagramSink: Send + Sync {
    /// Sends one datagram to the server.  `Ok` means the local write
    /// completed, not that anything arrived.
    async fn send(&self, frame: &[u8]) -> Result<(), TransportError>;
}

/// Receives every inbound datagram from the transport's receive task.
pub trait InboundHandler: Send + Sync + 'static {
    fn on_datagram(&self, bytes: &[u8], from: SocketAddr);
}

/// A bound UDP socket paired with the server endpoint it talks to.
#[derive(Debug, Clone)]
pub struct UdpTransport {
    socket: Arc<UdpSocket>,
    remote: SocketAddr,
}

impl UdpTransport {
    /// Binds `local` and targets `remote` for every send.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::BindFailed`] if the socket cannot be bound
    /// (address in use, address not on this host, permission denied).
    pub async fn bind(local: SocketAddr, remote: SocketAddr) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind(local)
            .await
            .map_err(|source| TransportError::BindFailed { addr: local, source })?;
        info!(
            "bound UDP {} for MOX server {remote}",
            socket.local_addr().unwrap_or(local)
        );
        Ok(Self {
            socket: Arc::new(socket),
            remote,
        })
    }

    /// The address the socket is actually bound to (resolves port 0).
    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.socket.local_addr()?)
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.remote
    }

    /// Spawns the receive loop.  It runs until the returned handle is
    /// aborted.
    pub fn spawn_receiver(&self, handler: Arc<dyn InboundHandler>) -> JoinHandle<()> {
        let source: Arc<dyn DatagramSource> = Arc::clone(&self.socket) as Arc<dyn DatagramSource>;
        tokio::spawn(receive_loop(source, handler))
    }
}

/// The inbound half of a transport, so the receive loop can be driven
/// without a real socket.
#[async_trait]
trait DatagramSource: Send + Sync {
    async fn recv_datagram(&self, buf: &mut [u8]) -> std::io::Result<(usize, SocketAddr)>;
}

#[async_trait]
impl DatagramSource for UdpSocket {
    async fn recv_datagram(&self, buf: &mut [u8]) -> std::io::Result<(usize, SocketAddr)> {
        self.recv_from(buf).await
    }
}

async fn receive_loop(source: Arc<dyn DatagramSource>, handler: Arc<dyn InboundHandler>) {
    let mut buf = vec![0u8; RECV_BUFFER_SIZE];
    loop {
        match source.recv_datagram(&mut buf).await {
            Ok((len, from)) => {
                trace!("{len} bytes from {from}: {:02X?}", &buf[..len]);
                handler.on_datagram(&buf[..len], from);
            }
            Err(e) => {
                warn!("UDP receive error: {e}");
                tokio::time::sleep(RECV_ERROR_BACKOFF).await;
            }
        }
    }
}

#[async_trait]
impl DatagramSink for UdpTransport {
    async fn send(&self, frame: &[u8]) -> Result<(), TransportError> {
        self.socket
            .send_to(frame, self.remote)
            .await
            .map(|_| ())
            .map_err(|source| TransportError::SendFailed {
                addr: self.remote,
                source,
            })
    }
}
