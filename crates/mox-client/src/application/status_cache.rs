//! Last known status of every device the client has heard from.
//!
//! Entries are keyed by device *and* reply kind: a dimmer reports both an
//! on/off status and a brightness under the same correlation key.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use mox_core::{CorrelationKey, ResponseKind, StatusReport, StatusValue};

#[derive(Debug, Default)]
pub struct StatusCache {
    entries: RwLock<HashMap<(CorrelationKey, ResponseKind), StatusValue>>,
}

impl StatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the value carried by a decoded reply.
    pub fn apply(&self, report: &StatusReport) {
        self.set(report.key(), report.value);
    }

    pub fn set(&self, key: CorrelationKey, value: StatusValue) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((key, value.kind()), value);
    }

    pub fn get(&self, key: CorrelationKey, kind: ResponseKind) -> Option<StatusValue> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(key, kind))
            .copied()
    }

    /// The cached value, or the kind's default (off / 0) if nothing has been
    /// heard yet.
    ///
    /// Returns `None` only for [`ResponseKind::Unrecognized`].
    pub fn get_or_default(&self, key: CorrelationKey, kind: ResponseKind) -> Option<StatusValue> {
        self.get(key, kind).or_else(|| StatusValue::default_for(kind))
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
