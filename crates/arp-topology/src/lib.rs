//! Simulated Network Topology
//!
//! This crate owns the simulated devices the ARP/RARP engine works against:
//!
//! - **Device**: an endpoint or relay with an IPv4 address and a MAC address
//! - **DeviceRegistry**: the mutable device list, persisted on every change
//! - **AddressPool**: collision-checked source of addresses for RARP replies
//! - **KeyValueStore**: the opaque storage the registry persists through
//!
//! # Example
//!
//! ```rust
//! use arp_topology::{DeviceRegistry, MemoryStore, DEVICES_KEY};
//!
//! // An empty store falls back to the built-in topology
//! let registry = DeviceRegistry::load(Box::new(MemoryStore::new()), DEVICES_KEY);
//! assert!(registry.devices().iter().any(|d| d.is_relay()));
//! assert!(registry.len() > 1);
//! ```

pub mod defaults;
pub mod device;
pub mod error;
pub mod pool;
pub mod registry;
pub mod store;

pub use defaults::{default_devices, default_relay, random_devices, RANDOM_ENDPOINT_COUNT};
pub use device::{Device, DeviceId, DeviceKind, Position};
pub use error::{RegistryError, StoreError};
pub use pool::AddressPool;
pub use registry::{DeviceRegistry, DEVICES_KEY};
pub use store::{FileStore, KeyValueStore, MemoryStore};
