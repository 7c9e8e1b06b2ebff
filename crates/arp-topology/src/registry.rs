//! Persisted device registry
//!
//! The registry is the single owner of the device list. Every mutation writes
//! the full list as a JSON array to the backing store under one key. Writes
//! are fire-and-forget: a failed write is logged and the in-memory change
//! stands.

use std::collections::HashSet;
use std::fmt;
use std::net::Ipv4Addr;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::defaults::{default_devices, random_devices};
use crate::device::{Device, DeviceId};
use crate::error::RegistryError;
use crate::store::KeyValueStore;

/// Store key the device list is persisted under
pub const DEVICES_KEY: &str = "arp-rarp-devices";

/// The mutable set of simulated devices
pub struct DeviceRegistry {
    devices: Vec<Device>,
    store: Box<dyn KeyValueStore>,
    key: String,
}

impl DeviceRegistry {
    /// Load the device list from `store`
    ///
    /// Falls back to the built-in topology if the key is absent, unreadable,
    /// malformed, empty, or holds duplicate device ids. Nothing is written.
    pub fn load(store: Box<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let devices = match store.get(&key) {
            Ok(Some(json)) => match serde_json::from_str::<Vec<Device>>(&json) {
                Ok(devices) if devices.is_empty() => {
                    info!("Stored device list is empty, using default topology");
                    default_devices()
                }
                Ok(devices) => match find_duplicate(&devices) {
                    Some(id) => {
                        warn!("Stored device list repeats id {}, using default topology", id);
                        default_devices()
                    }
                    None => {
                        info!("Loaded {} devices from store", devices.len());
                        devices
                    }
                },
                Err(e) => {
                    warn!("Stored device list is malformed ({}), using default topology", e);
                    default_devices()
                }
            },
            Ok(None) => {
                debug!("No stored device list under {}, using default topology", key);
                default_devices()
            }
            Err(e) => {
                warn!("Failed to read device list: {}, using default topology", e);
                default_devices()
            }
        };

        Self {
            devices,
            store,
            key,
        }
    }

    /// All devices in insertion order
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Look up a device by id
    pub fn get(&self, id: &DeviceId) -> Option<&Device> {
        self.devices.iter().find(|d| &d.id == id)
    }

    /// Check if any device currently holds `addr`
    pub fn contains_address(&self, addr: Ipv4Addr) -> bool {
        self.devices.iter().any(|d| d.address == addr)
    }

    /// Get the backing store
    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    /// Replace the whole device list
    ///
    /// Rejects the new list (leaving the registry untouched) if two devices
    /// share an id.
    pub fn replace_all(&mut self, devices: Vec<Device>) -> Result<(), RegistryError> {
        if let Some(id) = find_duplicate(&devices) {
            return Err(RegistryError::DuplicateId(id));
        }

        info!("Replacing device list ({} devices)", devices.len());
        self.devices = devices;
        self.persist();
        Ok(())
    }

    /// Regenerate the topology with fresh random endpoints
    pub fn randomize(&mut self) {
        self.randomize_with(&mut rand::thread_rng());
    }

    /// Regenerate the topology using the given random source
    pub fn randomize_with<R: Rng>(&mut self, rng: &mut R) {
        self.devices = random_devices(rng);
        info!("Generated random topology ({} devices)", self.devices.len());
        self.persist();
    }

    /// Overwrite a device's address, returning the address it replaced
    pub fn update_address(
        &mut self,
        id: &DeviceId,
        address: Ipv4Addr,
    ) -> Result<Ipv4Addr, RegistryError> {
        let device = self
            .devices
            .iter_mut()
            .find(|d| &d.id == id)
            .ok_or_else(|| RegistryError::UnknownDevice(id.clone()))?;

        let previous = std::mem::replace(&mut device.address, address);
        debug!("Device {} address {} -> {}", id, previous, address);
        self.persist();
        Ok(previous)
    }

    fn persist(&mut self) {
        let json = match serde_json::to_string_pretty(&self.devices) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize device list: {}", e);
                return;
            }
        };

        if let Err(e) = self.store.set(&self.key, &json) {
            warn!("Failed to persist device list: {}", e);
        }
    }
}

impl fmt::Debug for DeviceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceRegistry")
            .field("devices", &self.devices)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

fn find_duplicate(devices: &[Device]) -> Option<DeviceId> {
    let mut seen = HashSet::new();
    devices
        .iter()
        .find(|d| !seen.insert(&d.id))
        .map(|d| d.id.clone())
}
