//! The seam between accessories and the MOX client.

use async_trait::async_trait;
use mox_client::{ClientError, ReadOutcome};
use mox_core::{ChannelId, Command, CorrelationKey, ModuleAddress, ResponseKind, StatusValue};

/// What an accessory needs from the network.
///
/// Implemented for [`mox_client::MoxClient`] in the infrastructure layer and
/// by recording doubles in tests.
#[async_trait]
pub trait DeviceLink: Send + Sync {
    /// Sends a command without waiting for any reply.
    async fn send(
        &self,
        address: ModuleAddress,
        channel: ChannelId,
        command: Command,
    ) -> Result<(), ClientError>;

    /// Bounded status read: a fresh reply or the cached value.
    async fn read(
        &self,
        address: ModuleAddress,
        channel: ChannelId,
        command: Command,
    ) -> Result<ReadOutcome<StatusValue>, ClientError>;

    /// Records a value as the device's last known status.
    fn remember(&self, key: CorrelationKey, value: StatusValue);

    /// The last known value of one kind, if the device ever reported it.
    fn recall(&self, key: CorrelationKey, kind: ResponseKind) -> Option<StatusValue>;
}
