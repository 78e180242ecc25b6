//! The platform: every configured accessory, built once at startup.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::application::accessories::{build_accessory, Accessory};
use crate::application::link::DeviceLink;
use crate::domain::BridgeConfig;

/// The set of accessories exposed by the bridge, sorted by name.
pub struct Platform {
    accessories: Vec<Box<dyn Accessory>>,
}

impl Platform {
    /// Builds one accessory per configured entry.
    ///
    /// An accessory with a missing or unknown `type` is logged and skipped;
    /// the rest still load.
    pub fn new(config: &BridgeConfig, link: Arc<dyn DeviceLink>) -> Self {
        let mut accessories: Vec<Box<dyn Accessory>> = Vec::new();
        for entry in &config.entries {
            for accessory in &entry.accessories {
                match build_accessory(accessory, Arc::clone(&link)) {
                    Ok(built) => accessories.push(built),
                    Err(e) => error!(
                        "skipping accessory {:?} in {:?} ({} ch {}): {e}",
                        accessory.name, entry.name, accessory.module_id, accessory.channel_id
                    ),
                }
            }
        }
        accessories.sort_by(|a, b| a.name().cmp(b.name()));
        info!("platform loaded {} accessories", accessories.len());
        Self { accessories }
    }

    pub fn accessories(&self) -> &[Box<dyn Accessory>] {
        &self.accessories
    }

    pub fn len(&self) -> usize {
        self.accessories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accessories.is_empty()
    }

    /// Looks an accessory up by name, ignoring case.
    pub fn find(&self, name: &str) -> Option<&dyn Accessory> {
        self.accessories
            .iter()
            .find(|a| a.name().eq_ignore_ascii_case(name.trim()))
            .map(|a| a.as_ref())
    }

    /// Sends every accessory's status query.  Failures are logged, not
    /// returned; returns how many accessories were primed.
    pub async fn prime_all(&self) -> usize {
        let mut primed = 0;
        for accessory in &self.accessories {
            match accessory.prime().await {
                Ok(()) => primed += 1,
                Err(e) => warn!("could not prime {:?}: {e}", accessory.name()),
            }
        }
        primed
    }
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.accessories.iter().map(|a| (a.name(), a.kind())))
            .finish()
    }
}
