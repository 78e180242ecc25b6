//! Accessory vocabulary: kinds, characteristics and their values.
//!
//! An accessory is a named device wired to one module channel.  What it can
//! do is described by its [`Characteristic`]s: a light has `On`, a dimmer
//! adds `Brightness`, a window covering has positions instead.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors from parsing accessory vocabulary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown accessory type: {0:?}")]
    UnknownKind(String),
    #[error("unknown characteristic: {0:?}")]
    UnknownCharacteristic(String),
    #[error("invalid value {0:?}: expected on/off or a number")]
    InvalidValue(String),
}

/// Clamps a requested percentage into 0–100.
///
/// Every level written to a device passes through here; nothing below the
/// accessory layer validates ranges.
pub fn clamp_percent(value: i32) -> u8 {
    // Lossless: the clamped value fits in a u8.
    value.clamp(0, 100) as u8
}

// ── Kinds ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessoryKind {
    Light,
    Dimmer,
    Switch,
    Window,
}

impl AccessoryKind {
    pub const ALL: [AccessoryKind; 4] = [
        AccessoryKind::Light,
        AccessoryKind::Dimmer,
        AccessoryKind::Switch,
        AccessoryKind::Window,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            AccessoryKind::Light => "light",
            AccessoryKind::Dimmer => "dimmer",
            AccessoryKind::Switch => "switch",
            AccessoryKind::Window => "window",
        }
    }

    /// Characteristics exposed by this kind, primary first.
    pub const fn characteristics(self) -> &'static [Characteristic] {
        match self {
            AccessoryKind::Light | AccessoryKind::Switch => &[Characteristic::On],
            AccessoryKind::Dimmer => &[Characteristic::On, Characteristic::Brightness],
            AccessoryKind::Window => &[
                Characteristic::CurrentPosition,
                Characteristic::TargetPosition,
                Characteristic::PositionState,
            ],
        }
    }

    /// The characteristic read when none is named.
    pub const fn primary(self) -> Characteristic {
        match self {
            AccessoryKind::Window => Characteristic::CurrentPosition,
            _ => Characteristic::On,
        }
    }

    /// The characteristic a bare written value refers to: a number sets a
    /// dimmer's brightness, anything sets a window's target position, and
    /// everything else switches `On`.
    pub const fn characteristic_for(self, value: CharacteristicValue) -> Characteristic {
        match (self, value) {
            (AccessoryKind::Window, _) => Characteristic::TargetPosition,
            (AccessoryKind::Dimmer, CharacteristicValue::Level(_)) => Characteristic::Brightness,
            _ => Characteristic::On,
        }
    }
}

impl FromStr for AccessoryKind {
    type Err = DomainError;

    /// Case-insensitive: `"Dimmer"` and `"DIMMER"` are both accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AccessoryKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::UnknownKind(s.to_string()))
    }
}

impl fmt::Display for AccessoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Characteristics ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Characteristic {
    On,
    Brightness,
    CurrentPosition,
    TargetPosition,
    PositionState,
}

impl Characteristic {
    pub const fn as_str(self) -> &'static str {
        match self {
            Characteristic::On => "on",
            Characteristic::Brightness => "brightness",
            Characteristic::CurrentPosition => "current-position",
            Characteristic::TargetPosition => "target-position",
            Characteristic::PositionState => "position-state",
        }
    }
}

impl FromStr for Characteristic {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        [
            Characteristic::On,
            Characteristic::Brightness,
            Characteristic::CurrentPosition,
            Characteristic::TargetPosition,
            Characteristic::PositionState,
        ]
        .into_iter()
        .find(|c| c.as_str() == normalized)
        .ok_or_else(|| DomainError::UnknownCharacteristic(s.to_string()))
    }
}

impl fmt::Display for Characteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Motion of a window covering.  MOX curtains do not report motion, so
/// this is always `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionState {
    Decreasing,
    Increasing,
    Stopped,
}

/// A characteristic's value.
///
/// Levels are signed so out-of-range requests survive until
/// [`clamp_percent`] sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacteristicValue {
    Bool(bool),
    Level(i32),
    Position(PositionState),
}

impl FromStr for CharacteristicValue {
    type Err = DomainError;

    /// Accepts `on`/`off`/`true`/`false` or an integer.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "on" | "true" => Ok(CharacteristicValue::Bool(true)),
            "off" | "false" => Ok(CharacteristicValue::Bool(false)),
            other => other
                .parse::<i32>()
                .map(CharacteristicValue::Level)
                .map_err(|_| DomainError::InvalidValue(s.to_string())),
        }
    }
}

impl fmt::Display for CharacteristicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CharacteristicValue::Bool(true) => f.write_str("on"),
            CharacteristicValue::Bool(false) => f.write_str("off"),
            CharacteristicValue::Level(v) => write!(f, "{v}"),
            CharacteristicValue::Position(state) => write!(f, "{state:?}"),
        }
    }
}
