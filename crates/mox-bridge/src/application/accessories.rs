//! Accessories: named devices with characteristics.
//!
//! Each accessory kind maps its characteristics onto MOX commands:
//!
//! | Kind   | Characteristic                  | Read                  | Write                     |
//! |--------|---------------------------------|-----------------------|---------------------------|
//! | light  | on                              | on/off query          | turn on / turn off        |
//! | dimmer | on, brightness                  | + brightness query    | + set brightness          |
//! | switch | on                              | on/off query          | turn on / turn off        |
//! | window | current/target position, state  | curtain query         | set curtain position      |
//!
//! Every read is a bounded read: if the device does not answer within the
//! status timeout the last known value is returned instead.
//!
//! # Curtain orientation
//!
//! MOX reports curtain position the other way round from what users expect
//! (100 is open on the device).  The window accessory is the only place that
//! knows this: [`device_to_bridge`] flips reads, [`bridge_to_device`] flips
//! writes.  The device values 1 and 99 are snapped to fully closed and fully
//! open.
//!
//! A curtain that has never reported reads as [`UNKNOWN_POSITION`] (closed)
//! rather than whatever the device-side default maps to.

use std::sync::Arc;

use async_trait::async_trait;
use mox_client::{ClientError, ReadOutcome};
use mox_core::{ChannelId, Command, CorrelationKey, ModuleAddress, ResponseKind, StatusValue};
use thiserror::Error;
use tracing::{debug, info};

use crate::application::link::DeviceLink;
use crate::domain::{
    clamp_percent, AccessoryConfig, AccessoryKind, Characteristic, CharacteristicValue,
    DomainError, PositionState,
};

/// Error type for accessory operations.
#[derive(Debug, Error)]
pub enum AccessoryError {
    #[error("{name}: a {kind} has no {characteristic} characteristic")]
    Unsupported {
        name: String,
        kind: AccessoryKind,
        characteristic: Characteristic,
    },
    #[error("{name}: {characteristic} is read-only")]
    ReadOnly {
        name: String,
        characteristic: Characteristic,
    },
    #[error("{name}: {value} is not a valid {characteristic} value")]
    InvalidValue {
        name: String,
        characteristic: Characteristic,
        value: CharacteristicValue,
    },
    #[error("client error: {0}")]
    Client(#[from] ClientError),
}

/// A named device the bridge exposes.
#[async_trait]
pub trait Accessory: Send + Sync {
    fn name(&self) -> &str;
    fn kind(&self) -> AccessoryKind;
    fn address(&self) -> ModuleAddress;
    fn channel(&self) -> ChannelId;

    fn key(&self) -> CorrelationKey {
        CorrelationKey::new(self.address(), self.channel())
    }

    fn characteristics(&self) -> &'static [Characteristic] {
        self.kind().characteristics()
    }

    /// Reads one characteristic, bounded by the status timeout.
    async fn get(
        &self,
        characteristic: Characteristic,
    ) -> Result<ReadOutcome<CharacteristicValue>, AccessoryError>;

    /// Writes one characteristic.  Levels are clamped to 0–100 first.
    async fn set(
        &self,
        characteristic: Characteristic,
        value: CharacteristicValue,
    ) -> Result<(), AccessoryError>;

    /// Asks the device for its current status so the cache is warm before
    /// the first read.  Does not wait for the answer.
    async fn prime(&self) -> Result<(), AccessoryError> {
        Ok(())
    }
}

/// Builds the accessory described by `config`.
///
/// # Errors
///
/// Returns [`DomainError::UnknownKind`] when the `type` is missing or not
/// one of light, dimmer, switch, window.
pub fn build_accessory(
    config: &AccessoryConfig,
    link: Arc<dyn DeviceLink>,
) -> Result<Box<dyn Accessory>, DomainError> {
    let kind: AccessoryKind = config.kind.as_deref().unwrap_or_default().parse()?;
    let device = Device {
        name: config.name.clone(),
        address: config.module_id,
        channel: config.channel_id,
        link,
    };
    Ok(match kind {
        AccessoryKind::Light => Box::new(LightAccessory { device }),
        AccessoryKind::Dimmer => Box::new(DimmerAccessory {
            light: LightAccessory { device },
        }),
        AccessoryKind::Switch => Box::new(SwitchAccessory { device }),
        AccessoryKind::Window => Box::new(WindowAccessory { device }),
    })
}

// ── Curtain orientation ───────────────────────────────────────────────────────

/// Bridge position reported for a curtain with no known status.
pub const UNKNOWN_POSITION: u8 = 0;

/// Maps a device curtain value to the bridge's orientation.
pub fn device_to_bridge(value: u8) -> u8 {
    match (100 - i32::from(value)).abs() {
        1 => 0,
        99 => 100,
        other => clamp_percent(other),
    }
}

/// Maps a bridge position (already clamped) to the device's orientation.
pub fn bridge_to_device(position: u8) -> u8 {
    100 - position.min(100)
}

// ── Shared device binding ─────────────────────────────────────────────────────

struct Device {
    name: String,
    address: ModuleAddress,
    channel: ChannelId,
    link: Arc<dyn DeviceLink>,
}

impl Device {
    fn key(&self) -> CorrelationKey {
        CorrelationKey::new(self.address, self.channel)
    }

    async fn send(&self, command: Command) -> Result<(), AccessoryError> {
        Ok(self.link.send(self.address, self.channel, command).await?)
    }

    async fn read(&self, command: Command) -> Result<ReadOutcome<StatusValue>, AccessoryError> {
        let outcome = self.link.read(self.address, self.channel, command).await?;
        debug!(
            "[{}] [{}, {}]: {command:?} -> {outcome:?}",
            self.name, self.address, self.channel
        );
        Ok(outcome)
    }

    async fn read_on_off(&self) -> Result<ReadOutcome<CharacteristicValue>, AccessoryError> {
        let outcome = self.read(Command::ReadOnOff).await?;
        Ok(outcome.map(|v| CharacteristicValue::Bool(v.as_on_off().unwrap_or(false))))
    }

    async fn switch(&self, on: bool) -> Result<(), AccessoryError> {
        info!("[{}] [{}, {}]: set on = {on}", self.name, self.address, self.channel);
        self.send(if on { Command::TurnOn } else { Command::TurnOff }).await
    }

    fn unsupported(&self, kind: AccessoryKind, characteristic: Characteristic) -> AccessoryError {
        AccessoryError::Unsupported {
            name: self.name.clone(),
            kind,
            characteristic,
        }
    }

    fn invalid(&self, characteristic: Characteristic, value: CharacteristicValue) -> AccessoryError {
        AccessoryError::InvalidValue {
            name: self.name.clone(),
            characteristic,
            value,
        }
    }
}

/// Interprets a value written to an `on` characteristic.
fn as_power(value: CharacteristicValue) -> Option<bool> {
    match value {
        CharacteristicValue::Bool(on) => Some(on),
        CharacteristicValue::Level(level) => Some(level != 0),
        CharacteristicValue::Position(_) => None,
    }
}

// ── Light ─────────────────────────────────────────────────────────────────────

/// On/off light.  Writes update the cache right away so a read that times
/// out afterwards reflects what was just requested.
pub struct LightAccessory {
    device: Device,
}

impl LightAccessory {
    async fn set_on(&self, value: CharacteristicValue) -> Result<(), AccessoryError> {
        let on = as_power(value).ok_or_else(|| self.device.invalid(Characteristic::On, value))?;
        self.device.link.remember(self.device.key(), StatusValue::OnOff(on));
        self.device.switch(on).await
    }
}

#[async_trait]
impl Accessory for LightAccessory {
    fn name(&self) -> &str {
        &self.device.name
    }
    fn kind(&self) -> AccessoryKind {
        AccessoryKind::Light
    }
    fn address(&self) -> ModuleAddress {
        self.device.address
    }
    fn channel(&self) -> ChannelId {
        self.device.channel
    }

    async fn get(
        &self,
        characteristic: Characteristic,
    ) -> Result<ReadOutcome<CharacteristicValue>, AccessoryError> {
        match characteristic {
            Characteristic::On => self.device.read_on_off().await,
            other => Err(self.device.unsupported(self.kind(), other)),
        }
    }

    async fn set(
        &self,
        characteristic: Characteristic,
        value: CharacteristicValue,
    ) -> Result<(), AccessoryError> {
        match characteristic {
            Characteristic::On => self.set_on(value).await,
            other => Err(self.device.unsupported(self.kind(), other)),
        }
    }

    async fn prime(&self) -> Result<(), AccessoryError> {
        self.device.send(Command::ReadOnOff).await
    }
}

// ── Dimmer ────────────────────────────────────────────────────────────────────

/// A light with a brightness level.
pub struct DimmerAccessory {
    light: LightAccessory,
}

#[async_trait]
impl Accessory for DimmerAccessory {
    fn name(&self) -> &str {
        self.light.name()
    }
    fn kind(&self) -> AccessoryKind {
        AccessoryKind::Dimmer
    }
    fn address(&self) -> ModuleAddress {
        self.light.address()
    }
    fn channel(&self) -> ChannelId {
        self.light.channel()
    }

    async fn get(
        &self,
        characteristic: Characteristic,
    ) -> Result<ReadOutcome<CharacteristicValue>, AccessoryError> {
        let device = &self.light.device;
        match characteristic {
            Characteristic::On => device.read_on_off().await,
            Characteristic::Brightness => {
                let outcome = device.read(Command::ReadBrightness).await?;
                Ok(outcome.map(|v| CharacteristicValue::Level(i32::from(v.as_level().unwrap_or(0)))))
            }
            other => Err(device.unsupported(self.kind(), other)),
        }
    }

    async fn set(
        &self,
        characteristic: Characteristic,
        value: CharacteristicValue,
    ) -> Result<(), AccessoryError> {
        let device = &self.light.device;
        match (characteristic, value) {
            (Characteristic::On, _) => self.light.set_on(value).await,
            (Characteristic::Brightness, CharacteristicValue::Level(requested)) => {
                let level = clamp_percent(requested);
                device.link.remember(device.key(), StatusValue::Brightness(level));
                info!(
                    "[{}] [{}, {}]: set brightness = {level}",
                    device.name, device.address, device.channel
                );
                device.send(Command::SetBrightness(level)).await
            }
            (Characteristic::Brightness, _) => Err(device.invalid(characteristic, value)),
            (other, _) => Err(device.unsupported(self.kind(), other)),
        }
    }

    async fn prime(&self) -> Result<(), AccessoryError> {
        self.light.prime().await?;
        self.light.device.send(Command::ReadBrightness).await
    }
}

// ── Switch ────────────────────────────────────────────────────────────────────

/// Plain switch.  Unlike a light it never assumes a write took effect; the
/// cache only changes when the device reports back.
pub struct SwitchAccessory {
    device: Device,
}

#[async_trait]
impl Accessory for SwitchAccessory {
    fn name(&self) -> &str {
        &self.device.name
    }
    fn kind(&self) -> AccessoryKind {
        AccessoryKind::Switch
    }
    fn address(&self) -> ModuleAddress {
        self.device.address
    }
    fn channel(&self) -> ChannelId {
        self.device.channel
    }

    async fn get(
        &self,
        characteristic: Characteristic,
    ) -> Result<ReadOutcome<CharacteristicValue>, AccessoryError> {
        match characteristic {
            Characteristic::On => self.device.read_on_off().await,
            other => Err(self.device.unsupported(self.kind(), other)),
        }
    }

    async fn set(
        &self,
        characteristic: Characteristic,
        value: CharacteristicValue,
    ) -> Result<(), AccessoryError> {
        match characteristic {
            Characteristic::On => {
                let on = as_power(value).ok_or_else(|| self.device.invalid(characteristic, value))?;
                self.device.switch(on).await
            }
            other => Err(self.device.unsupported(self.kind(), other)),
        }
    }
}

// ── Window ────────────────────────────────────────────────────────────────────

/// Window covering driven by a curtain motor.
pub struct WindowAccessory {
    device: Device,
}

#[async_trait]
impl Accessory for WindowAccessory {
    fn name(&self) -> &str {
        &self.device.name
    }
    fn kind(&self) -> AccessoryKind {
        AccessoryKind::Window
    }
    fn address(&self) -> ModuleAddress {
        self.device.address
    }
    fn channel(&self) -> ChannelId {
        self.device.channel
    }

    async fn get(
        &self,
        characteristic: Characteristic,
    ) -> Result<ReadOutcome<CharacteristicValue>, AccessoryError> {
        match characteristic {
            // The device only reports where it is, so target reads the same.
            Characteristic::CurrentPosition | Characteristic::TargetPosition => {
                let outcome = self.device.read(Command::ReadCurtainPosition).await?;
                let never_reported = self
                    .device
                    .link
                    .recall(self.device.key(), ResponseKind::CurtainPosition)
                    .is_none();
                if !outcome.is_fresh() && never_reported {
                    return Ok(ReadOutcome::Cached(CharacteristicValue::Level(i32::from(
                        UNKNOWN_POSITION,
                    ))));
                }
                Ok(outcome.map(|v| {
                    CharacteristicValue::Level(i32::from(device_to_bridge(v.as_level().unwrap_or(0))))
                }))
            }
            Characteristic::PositionState => {
                Ok(ReadOutcome::Fresh(CharacteristicValue::Position(PositionState::Stopped)))
            }
            other => Err(self.device.unsupported(self.kind(), other)),
        }
    }

    async fn set(
        &self,
        characteristic: Characteristic,
        value: CharacteristicValue,
    ) -> Result<(), AccessoryError> {
        match (characteristic, value) {
            (Characteristic::TargetPosition, CharacteristicValue::Level(requested)) => {
                let position = clamp_percent(requested);
                let device_value = bridge_to_device(position);
                self.device
                    .link
                    .remember(self.device.key(), StatusValue::CurtainPosition(device_value));
                info!(
                    "[{}] [{}, {}]: set target position = {position} (device {device_value})",
                    self.device.name, self.device.address, self.device.channel
                );
                self.device.send(Command::SetCurtainPosition(device_value)).await
            }
            (Characteristic::TargetPosition, _) => Err(self.device.invalid(characteristic, value)),
            (Characteristic::CurrentPosition | Characteristic::PositionState, _) => {
                Err(AccessoryError::ReadOnly {
                    name: self.device.name.clone(),
                    characteristic,
                })
            }
            (other, _) => Err(self.device.unsupported(self.kind(), other)),
        }
    }

    async fn prime(&self) -> Result<(), AccessoryError> {
        self.device.send(Command::ReadCurtainPosition).await
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use mox_client::TransportError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    // ── Test doubles ──────────────────────────────────────────────────────────

    /// Records every command and answers reads from a script.
    #[derive(Default)]
    pub(crate) struct RecordingLink {
        pub sent: Mutex<Vec<(ModuleAddress, ChannelId, Command)>>,
        pub reads: Mutex<Vec<Command>>,
        pub remembered: Mutex<Vec<(CorrelationKey, StatusValue)>>,
        pub replies: Mutex<HashMap<Command, ReadOutcome<StatusValue>>>,
        pub should_fail: bool,
    }

    impl RecordingLink {
        pub fn reply(&self, command: Command, outcome: ReadOutcome<StatusValue>) {
            self.replies.lock().unwrap().insert(command, outcome);
        }

        pub fn sent_commands(&self) -> Vec<Command> {
            self.sent.lock().unwrap().iter().map(|(_, _, c)| *c).collect()
        }

        fn failure() -> ClientError {
            ClientError::Transport(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "injected failure",
            )))
        }
    }

    #[async_trait]
    impl DeviceLink for RecordingLink {
        async fn send(
            &self,
            address: ModuleAddress,
            channel: ChannelId,
            command: Command,
        ) -> Result<(), ClientError> {
            if self.should_fail {
                return Err(Self::failure());
            }
            self.sent.lock().unwrap().push((address, channel, command));
            Ok(())
        }

        async fn read(
            &self,
            _address: ModuleAddress,
            _channel: ChannelId,
            command: Command,
        ) -> Result<ReadOutcome<StatusValue>, ClientError> {
            if self.should_fail {
                return Err(Self::failure());
            }
            self.reads.lock().unwrap().push(command);
            let scripted = self.replies.lock().unwrap().get(&command).copied();
            Ok(scripted.unwrap_or_else(|| {
                let kind = command.reply_kind().expect("reads use query commands");
                ReadOutcome::Cached(StatusValue::default_for(kind).expect("known kind"))
            }))
        }

        fn remember(&self, key: CorrelationKey, value: StatusValue) {
            self.remembered.lock().unwrap().push((key, value));
        }

        fn recall(&self, key: CorrelationKey, kind: ResponseKind) -> Option<StatusValue> {
            self.remembered
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find(|(k, v)| *k == key && v.kind() == kind)
                .map(|(_, v)| *v)
        }
    }

    fn make(kind: &str) -> (Box<dyn Accessory>, Arc<RecordingLink>) {
        let link = Arc::new(RecordingLink::default());
        let config = AccessoryConfig {
            name: format!("test {kind}"),
            kind: Some(kind.to_string()),
            module_id: ModuleAddress::new(0x00, 0x00, 0xCB),
            channel_id: ChannelId(0x01),
        };
        let accessory = build_accessory(&config, link.clone()).expect("known kind");
        (accessory, link)
    }

    // ── Factory ───────────────────────────────────────────────────────────────

    #[test]
    fn test_build_accessory_matches_kind_case_insensitively() {
        for (text, kind) in [
            ("light", AccessoryKind::Light),
            ("Dimmer", AccessoryKind::Dimmer),
            ("SWITCH", AccessoryKind::Switch),
            ("window", AccessoryKind::Window),
        ] {
            assert_eq!(make(text).0.kind(), kind);
        }
    }

    #[test]
    fn test_build_accessory_rejects_unknown_or_missing_type() {
        let link: Arc<dyn DeviceLink> = Arc::new(RecordingLink::default());
        let mut config = AccessoryConfig {
            name: "x".to_string(),
            kind: Some("fan".to_string()),
            module_id: ModuleAddress::new(0, 0, 1),
            channel_id: ChannelId(1),
        };
        assert!(build_accessory(&config, Arc::clone(&link)).is_err());
        config.kind = None;
        assert!(build_accessory(&config, link).is_err());
    }

    // ── Light ─────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_light_get_returns_fresh_on_off() {
        // Arrange
        let (light, link) = make("light");
        link.reply(Command::ReadOnOff, ReadOutcome::Fresh(StatusValue::OnOff(true)));

        // Act
        let value = light.get(Characteristic::On).await.unwrap();

        // Assert
        assert_eq!(value, ReadOutcome::Fresh(CharacteristicValue::Bool(true)));
        assert_eq!(*link.reads.lock().unwrap(), vec![Command::ReadOnOff]);
    }

    #[tokio::test]
    async fn test_light_set_sends_and_updates_cache_optimistically() {
        let (light, link) = make("light");

        light.set(Characteristic::On, CharacteristicValue::Bool(true)).await.unwrap();
        light.set(Characteristic::On, CharacteristicValue::Level(0)).await.unwrap();

        assert_eq!(link.sent_commands(), vec![Command::TurnOn, Command::TurnOff]);
        let remembered: Vec<_> = link.remembered.lock().unwrap().iter().map(|(_, v)| *v).collect();
        assert_eq!(remembered, vec![StatusValue::OnOff(true), StatusValue::OnOff(false)]);
    }

    #[tokio::test]
    async fn test_light_rejects_brightness() {
        let (light, _link) = make("light");
        let err = light.get(Characteristic::Brightness).await.unwrap_err();
        assert!(matches!(err, AccessoryError::Unsupported { .. }));
    }

    #[tokio::test]
    async fn test_light_prime_sends_status_query() {
        let (light, link) = make("light");
        light.prime().await.unwrap();
        assert_eq!(link.sent_commands(), vec![Command::ReadOnOff]);
    }

    // ── Dimmer ────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_dimmer_set_brightness_clamps_before_sending() {
        // Arrange
        let (dimmer, link) = make("dimmer");

        // Act
        dimmer.set(Characteristic::Brightness, CharacteristicValue::Level(150)).await.unwrap();
        dimmer.set(Characteristic::Brightness, CharacteristicValue::Level(-3)).await.unwrap();

        // Assert
        assert_eq!(
            link.sent_commands(),
            vec![Command::SetBrightness(100), Command::SetBrightness(0)]
        );
    }

    #[tokio::test]
    async fn test_dimmer_get_brightness_uses_cache_on_timeout() {
        let (dimmer, link) = make("dimmer");
        link.reply(Command::ReadBrightness, ReadOutcome::Cached(StatusValue::Brightness(35)));

        let value = dimmer.get(Characteristic::Brightness).await.unwrap();

        assert_eq!(value, ReadOutcome::Cached(CharacteristicValue::Level(35)));
    }

    #[tokio::test]
    async fn test_dimmer_keeps_light_behaviour() {
        let (dimmer, link) = make("dimmer");
        dimmer.set(Characteristic::On, CharacteristicValue::Bool(true)).await.unwrap();
        assert_eq!(link.sent_commands(), vec![Command::TurnOn]);
    }

    #[tokio::test]
    async fn test_dimmer_rejects_bool_brightness() {
        let (dimmer, link) = make("dimmer");
        let err = dimmer
            .set(Characteristic::Brightness, CharacteristicValue::Bool(true))
            .await
            .unwrap_err();
        assert!(matches!(err, AccessoryError::InvalidValue { .. }));
        assert!(link.sent_commands().is_empty());
    }

    #[tokio::test]
    async fn test_dimmer_prime_queries_both_values() {
        let (dimmer, link) = make("dimmer");
        dimmer.prime().await.unwrap();
        assert_eq!(link.sent_commands(), vec![Command::ReadOnOff, Command::ReadBrightness]);
    }

    // ── Switch ────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_switch_set_does_not_touch_cache() {
        let (switch, link) = make("switch");

        switch.set(Characteristic::On, CharacteristicValue::Bool(true)).await.unwrap();

        assert_eq!(link.sent_commands(), vec![Command::TurnOn]);
        assert!(link.remembered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_switch_prime_is_a_no_op() {
        let (switch, link) = make("switch");
        switch.prime().await.unwrap();
        assert!(link.sent_commands().is_empty());
    }

    // ── Window ────────────────────────────────────────────────────────────────

    #[test]
    fn test_curtain_orientation_mapping() {
        assert_eq!(device_to_bridge(0), 100);
        assert_eq!(device_to_bridge(100), 0);
        assert_eq!(device_to_bridge(30), 70);
        assert_eq!(device_to_bridge(99), 0);
        assert_eq!(device_to_bridge(1), 100);
        assert_eq!(device_to_bridge(250), 100);
        assert_eq!(bridge_to_device(70), 30);
        assert_eq!(bridge_to_device(0), 100);
    }

    #[tokio::test]
    async fn test_window_reads_position_in_bridge_orientation() {
        let (window, link) = make("window");
        link.reply(
            Command::ReadCurtainPosition,
            ReadOutcome::Fresh(StatusValue::CurtainPosition(20)),
        );

        let current = window.get(Characteristic::CurrentPosition).await.unwrap();
        let target = window.get(Characteristic::TargetPosition).await.unwrap();

        assert_eq!(current, ReadOutcome::Fresh(CharacteristicValue::Level(80)));
        assert_eq!(target, current);
    }

    #[tokio::test]
    async fn test_window_set_target_maps_and_sends_curtain_command() {
        // Arrange
        let (window, link) = make("window");

        // Act
        window
            .set(Characteristic::TargetPosition, CharacteristicValue::Level(130))
            .await
            .unwrap();

        // Assert: 130 clamps to 100 (open), which the device calls 0.
        assert_eq!(link.sent_commands(), vec![Command::SetCurtainPosition(0)]);
        assert_eq!(
            link.remembered.lock().unwrap()[0].1,
            StatusValue::CurtainPosition(0)
        );
    }

    #[tokio::test]
    async fn test_window_never_reported_reads_closed() {
        // Arrange: no reply and nothing cached.
        let (window, _link) = make("window");

        // Act
        let position = window.get(Characteristic::CurrentPosition).await.unwrap();

        // Assert
        assert_eq!(
            position,
            ReadOutcome::Cached(CharacteristicValue::Level(i32::from(UNKNOWN_POSITION)))
        );
    }

    #[tokio::test]
    async fn test_window_cached_position_is_mapped_once_known() {
        let (window, link) = make("window");
        window
            .set(Characteristic::TargetPosition, CharacteristicValue::Level(40))
            .await
            .unwrap();
        link.reply(
            Command::ReadCurtainPosition,
            ReadOutcome::Cached(StatusValue::CurtainPosition(60)),
        );

        let position = window.get(Characteristic::TargetPosition).await.unwrap();

        assert_eq!(position, ReadOutcome::Cached(CharacteristicValue::Level(40)));
    }

    #[tokio::test]
    async fn test_window_position_state_is_always_stopped() {
        let (window, link) = make("window");
        let state = window.get(Characteristic::PositionState).await.unwrap();
        assert_eq!(state, ReadOutcome::Fresh(CharacteristicValue::Position(PositionState::Stopped)));
        assert!(link.reads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_window_current_position_is_read_only() {
        let (window, _link) = make("window");
        let err = window
            .set(Characteristic::CurrentPosition, CharacteristicValue::Level(10))
            .await
            .unwrap_err();
        assert!(matches!(err, AccessoryError::ReadOnly { .. }));
    }

    // ── Failures ──────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_send_failure_surfaces_as_client_error() {
        let link = Arc::new(RecordingLink {
            should_fail: true,
            ..Default::default()
        });
        let config = AccessoryConfig {
            name: "lamp".to_string(),
            kind: Some("light".to_string()),
            module_id: ModuleAddress::new(0, 0, 1),
            channel_id: ChannelId(1),
        };
        let light = build_accessory(&config, link).unwrap();

        let err = light.set(Characteristic::On, CharacteristicValue::Bool(true)).await.unwrap_err();

        assert!(matches!(err, AccessoryError::Client(_)));
    }
}
