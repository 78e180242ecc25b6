//! Integration tests over real UDP sockets.
//!
//! A plain tokio socket on 127.0.0.1 plays the MOX LT server.  Each test
//! binds a real [`MoxClient`] against it and drives the full path: encode,
//! send, receive, classify, correlate, cache.

use std::net::SocketAddr;
use std::time::Duration;

use mox_client::{ClientConfig, ClientError, MoxClient, ReadOutcome};
use mox_core::{ChannelId, Command, CorrelationKey, ModuleAddress, ResponseKind, StatusValue};
use tokio::net::UdpSocket;

const ADDR: ModuleAddress = ModuleAddress::new(0x00, 0x00, 0xCB);
const CH: ChannelId = ChannelId(0x01);

/// Binds a fake server and a client pointed at it.
async fn setup(status_timeout: Duration) -> (MoxClient, UdpSocket) {
    let server = UdpSocket::bind("127.0.0.1:0").await.expect("server bind");
    let config = ClientConfig {
        local_addr: "127.0.0.1:0".parse().unwrap(),
        server_addr: server.local_addr().unwrap(),
        status_timeout,
    };
    let client = MoxClient::connect(config).await.expect("client bind");
    (client, server)
}

/// Receives one request on the fake server.
async fn recv_request(server: &UdpSocket) -> (Vec<u8>, SocketAddr) {
    let mut buf = [0u8; 64];
    let (len, from) = tokio::time::timeout(Duration::from_secs(2), server.recv_from(&mut buf))
        .await
        .expect("request within 2s")
        .expect("recv");
    (buf[..len].to_vec(), from)
}

fn brightness_reply(value: u8) -> [u8; 12] {
    [0x02, 0x00, 0x00, 0xCB, 0x01, 0x03, 0x00, 0x00, 0x03, 0x04, value, 0x00]
}

#[tokio::test]
async fn test_read_status_gets_fresh_reply_from_server() {
    // Arrange
    let (client, server) = setup(Duration::from_secs(2)).await;
    let responder = async {
        let (request, from) = recv_request(&server).await;
        assert_eq!(request, [0x02, 0x00, 0x00, 0xCB, 0x01, 0x03, 0x00, 0x00, 0x01, 0x02]);
        server.send_to(&brightness_reply(42), from).await.unwrap();
    };

    // Act
    let (outcome, ()) = tokio::join!(client.read_status(Command::ReadBrightness, ADDR, CH), responder);

    // Assert
    assert_eq!(outcome.unwrap(), ReadOutcome::Fresh(StatusValue::Brightness(42)));
    client.shutdown();
}

#[tokio::test]
async fn test_silent_server_yields_cached_value_within_deadline() {
    let (client, server) = setup(Duration::from_millis(100)).await;
    client.cache().set(CorrelationKey::new(ADDR, CH), StatusValue::OnOff(true));

    let started = tokio::time::Instant::now();
    let outcome = client.read_status(Command::ReadOnOff, ADDR, CH).await.unwrap();

    assert_eq!(outcome, ReadOutcome::Cached(StatusValue::OnOff(true)));
    assert!(started.elapsed() < Duration::from_secs(2));
    // The query still went out.
    let (request, _) = recv_request(&server).await;
    assert_eq!(request[0], 0x02);
    client.shutdown();
}

#[tokio::test]
async fn test_late_reply_updates_cache_and_subscribers() {
    // Arrange
    let (client, server) = setup(Duration::from_millis(50)).await;
    let mut events = client.subscribe();

    // Act: the read times out before the server answers.
    let outcome = client.read_status(Command::ReadBrightness, ADDR, CH).await.unwrap();
    assert_eq!(outcome, ReadOutcome::Cached(StatusValue::Brightness(0)));

    let (_, from) = recv_request(&server).await;
    server.send_to(&brightness_reply(77), from).await.unwrap();

    // Assert
    let event = tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("event within 2s")
        .unwrap();
    assert_eq!(event.report.value, StatusValue::Brightness(77));
    assert_eq!(
        client.cache().get(CorrelationKey::new(ADDR, CH), ResponseKind::BrightnessValue),
        Some(StatusValue::Brightness(77))
    );
    assert_eq!(client.pending_replies(ADDR, CH), 0);
    client.shutdown();
}

#[tokio::test]
async fn test_unsolicited_status_is_broadcast() {
    let (client, server) = setup(Duration::from_millis(100)).await;
    let mut events = client.subscribe();
    let client_addr = client.local_addr().expect("bound");

    let on = [0x02, 0x00, 0x00, 0xCB, 0x01, 0x01, 0x00, 0x00, 0x03, 0x03, 0x01];
    server.send_to(b"garbage", client_addr).await.unwrap();
    server.send_to(&on, client_addr).await.unwrap();

    let event = tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("event within 2s")
        .unwrap();
    assert_eq!(event.key, CorrelationKey::new(ADDR, CH));
    assert_eq!(event.report.value, StatusValue::OnOff(true));
    client.shutdown();
}

#[tokio::test]
async fn test_commands_after_shutdown_fail_closed() {
    let (client, _server) = setup(Duration::from_millis(100)).await;
    client.shutdown();
    assert!(matches!(
        client.set_brightness(ADDR, CH, 10).await,
        Err(ClientError::Closed)
    ));
}

#[tokio::test]
async fn test_bind_conflict_is_reported() {
    let (first, _server) = setup(Duration::from_millis(100)).await;
    let config = ClientConfig {
        local_addr: first.local_addr().unwrap(),
        server_addr: "127.0.0.1:9".parse().unwrap(),
        status_timeout: Duration::from_millis(100),
    };
    assert!(matches!(
        MoxClient::connect(config).await,
        Err(ClientError::Transport(_))
    ));
}
