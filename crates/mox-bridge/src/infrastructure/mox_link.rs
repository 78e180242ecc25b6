//! The production [`DeviceLink`]: a [`MoxClient`] bound to a UDP socket.

use std::sync::Arc;

use async_trait::async_trait;
use mox_client::{ClientConfig, ClientError, MoxClient, ReadOutcome};
use mox_core::{ChannelId, Command, CorrelationKey, ModuleAddress, ResponseKind, StatusValue};
use tracing::info;

use crate::application::{DeviceLink, Platform};
use crate::domain::BridgeConfig;

#[async_trait]
impl DeviceLink for MoxClient {
    async fn send(
        &self,
        address: ModuleAddress,
        channel: ChannelId,
        command: Command,
    ) -> Result<(), ClientError> {
        self.send_command(address, channel, command).await
    }

    async fn read(
        &self,
        address: ModuleAddress,
        channel: ChannelId,
        command: Command,
    ) -> Result<ReadOutcome<StatusValue>, ClientError> {
        self.read_status(command, address, channel).await
    }

    fn remember(&self, key: CorrelationKey, value: StatusValue) {
        self.cache().set(key, value);
    }

    fn recall(&self, key: CorrelationKey, kind: ResponseKind) -> Option<StatusValue> {
        self.cache().get(key, kind)
    }
}

/// The client half of a [`BridgeConfig`].
pub fn client_config(config: &BridgeConfig) -> ClientConfig {
    ClientConfig {
        local_addr: config.client_addr(),
        server_addr: config.server_addr(),
        status_timeout: config.status_timeout(),
    }
}

/// Binds the client and builds the platform on top of it.
///
/// The returned client is shared with every accessory; keep it to
/// subscribe to status events and to shut down.
///
/// # Errors
///
/// Returns [`ClientError::Transport`] if the local socket cannot be bound.
pub async fn connect(config: &BridgeConfig) -> Result<(Platform, Arc<MoxClient>), ClientError> {
    let client = Arc::new(MoxClient::connect(client_config(config)).await?);
    info!(
        "MOX client on {} -> {}",
        client.local_addr().map_or_else(|| "?".to_string(), |a| a.to_string()),
        config.server_addr()
    );
    let platform = Platform::new(config, Arc::clone(&client) as Arc<dyn DeviceLink>);
    Ok((platform, client))
}
