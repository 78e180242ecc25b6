//! End-to-end bridge tests against a fake MOX LT server on 127.0.0.1.

use std::net::SocketAddr;
use std::time::Duration;

use mox_bridge::domain::{BridgeConfig, Characteristic, CharacteristicValue};
use mox_bridge::infrastructure::connect;
use mox_client::ReadOutcome;
use tokio::net::UdpSocket;

fn config_for(server: SocketAddr, status_timeout_ms: u64) -> BridgeConfig {
    let doc = format!(
        r#"
client_ip_address = "127.0.0.1"
client_port_number = 0
server_ip_address = "{ip}"
server_port_number = {port}
status_timeout_ms = {status_timeout_ms}

[[entries]]
name = "Living room"

  [[entries.accessories]]
  name = "Ceiling"
  type = "dimmer"
  module_id = "0x0000cb"
  channel_id = "01"

  [[entries.accessories]]
  name = "Curtain"
  type = "window"
  module_id = "0x0000cc"
  channel_id = "02"
"#,
        ip = server.ip(),
        port = server.port(),
    );
    BridgeConfig::from_toml_str(&doc).expect("valid config")
}

async fn recv_request(server: &UdpSocket) -> (Vec<u8>, SocketAddr) {
    let mut buf = [0u8; 64];
    let (len, from) = tokio::time::timeout(Duration::from_secs(2), server.recv_from(&mut buf))
        .await
        .expect("request within 2s")
        .expect("recv");
    (buf[..len].to_vec(), from)
}

#[tokio::test]
async fn test_dimmer_brightness_read_over_udp() {
    // Arrange
    let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let (platform, client) = connect(&config_for(server.local_addr().unwrap(), 2000))
        .await
        .expect("client binds");
    let ceiling = platform.find("ceiling").expect("configured");
    let responder = async {
        let (request, from) = recv_request(&server).await;
        assert_eq!(request, [0x02, 0x00, 0x00, 0xCB, 0x01, 0x03, 0x00, 0x00, 0x01, 0x02]);
        let reply = [0x02, 0x00, 0x00, 0xCB, 0x01, 0x03, 0x00, 0x00, 0x03, 0x04, 0x3C, 0x00];
        server.send_to(&reply, from).await.unwrap();
    };

    // Act
    let (outcome, ()) = tokio::join!(ceiling.get(Characteristic::Brightness), responder);

    // Assert
    assert_eq!(outcome.unwrap(), ReadOutcome::Fresh(CharacteristicValue::Level(60)));
    client.shutdown();
}

#[tokio::test]
async fn test_window_set_sends_inverted_curtain_position() {
    // Arrange
    let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let (platform, client) = connect(&config_for(server.local_addr().unwrap(), 100))
        .await
        .unwrap();
    let curtain = platform.find("Curtain").unwrap();

    // Act
    curtain
        .set(Characteristic::TargetPosition, CharacteristicValue::Level(75))
        .await
        .unwrap();

    // Assert
    let (request, _) = recv_request(&server).await;
    assert_eq!(
        request,
        [0x03, 0x00, 0x00, 0xCC, 0x02, 0x01, 0x00, 0x00, 0x02, 0x04, 25, 0x00]
    );

    // A silent server leaves the optimistic value in place.
    let position = curtain.get(Characteristic::CurrentPosition).await.unwrap();
    assert_eq!(position, ReadOutcome::Cached(CharacteristicValue::Level(75)));
    client.shutdown();
}

#[tokio::test]
async fn test_prime_all_seeds_cache_from_replies() {
    // Arrange
    let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let (platform, client) = connect(&config_for(server.local_addr().unwrap(), 50))
        .await
        .unwrap();
    let mut events = client.subscribe();

    // Act: prime sends three queries (ceiling on/off, ceiling brightness,
    // curtain position); answer only the on/off one.
    assert_eq!(platform.prime_all().await, 2);
    let mut from = None;
    for _ in 0..3 {
        let (_, sender) = recv_request(&server).await;
        from = Some(sender);
    }
    let on = [0x02, 0x00, 0x00, 0xCB, 0x01, 0x01, 0x00, 0x00, 0x03, 0x03, 0x01];
    server.send_to(&on, from.unwrap()).await.unwrap();
    tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("event within 2s")
        .unwrap();

    // Assert: the silent read now falls back to the primed value.
    let ceiling = platform.find("Ceiling").unwrap();
    let on_state = ceiling.get(Characteristic::On).await.unwrap();
    assert_eq!(on_state, ReadOutcome::Cached(CharacteristicValue::Bool(true)));
    client.shutdown();
}
