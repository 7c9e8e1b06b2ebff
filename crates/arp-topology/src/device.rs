//! Simulated network devices

use std::fmt;
use std::net::Ipv4Addr;

use arp_proto::{AddressPair, MacAddr};
use serde::{Deserialize, Serialize};

/// Unique identifier for a device in the registry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Create a device id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DeviceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Role of a device in the topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// A host that sends and answers resolution requests
    #[default]
    Endpoint,
    /// The central device traffic passes through
    Relay,
}

impl DeviceKind {
    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Endpoint => "Endpoint",
            Self::Relay => "Relay",
        }
    }
}

/// Layout position; cosmetic, owned by whoever draws the topology
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A simulated network device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    /// Unique id within the registry
    pub id: DeviceId,
    /// Display name
    pub name: String,
    /// IPv4 address (placeholder when unconfigured)
    pub address: Ipv4Addr,
    /// Hardware address
    pub hardware_id: MacAddr,
    /// Layout position
    #[serde(default)]
    pub position: Position,
    /// Whether the device answers traffic
    #[serde(default = "default_online")]
    pub online: bool,
    /// Endpoint or relay
    #[serde(default)]
    pub kind: DeviceKind,
}

fn default_online() -> bool {
    true
}

impl Device {
    /// Create an online endpoint at the origin
    pub fn endpoint(
        id: impl Into<DeviceId>,
        name: impl Into<String>,
        address: Ipv4Addr,
        hardware_id: MacAddr,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address,
            hardware_id,
            position: Position::default(),
            online: true,
            kind: DeviceKind::Endpoint,
        }
    }

    /// Create an online relay at the origin
    pub fn relay(
        id: impl Into<DeviceId>,
        name: impl Into<String>,
        address: Ipv4Addr,
        hardware_id: MacAddr,
    ) -> Self {
        Self {
            kind: DeviceKind::Relay,
            ..Self::endpoint(id, name, address, hardware_id)
        }
    }

    /// Set the layout position
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = Position::new(x, y);
        self
    }

    /// Set the online flag
    pub fn with_online(mut self, online: bool) -> Self {
        self.online = online;
        self
    }

    pub fn is_relay(&self) -> bool {
        self.kind == DeviceKind::Relay
    }

    /// Address and hardware id as one pair
    pub fn address_pair(&self) -> AddressPair {
        AddressPair::new(self.address, self.hardware_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mac() -> MacAddr {
        "00:1A:2B:3C:4D:5E".parse().unwrap()
    }

    #[test]
    fn test_create_endpoint() {
        let device = Device::endpoint("d1", "Alpha", Ipv4Addr::new(192, 168, 1, 10), mac());
        assert_eq!(device.id.as_str(), "d1");
        assert_eq!(device.kind, DeviceKind::Endpoint);
        assert!(device.online);
        assert!(!device.is_relay());
    }

    #[test]
    fn test_create_relay() {
        let device = Device::relay("hub", "Hub", Ipv4Addr::new(192, 168, 1, 1), mac())
            .with_position(300.0, 280.0);
        assert!(device.is_relay());
        assert_eq!(device.position, Position::new(300.0, 280.0));
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let json = r#"{
            "id": "d9",
            "name": "Legacy",
            "address": "10.0.0.9",
            "hardware_id": "AA:BB:CC:DD:EE:09"
        }"#;
        let device: Device = serde_json::from_str(json).unwrap();
        assert!(device.online);
        assert_eq!(device.kind, DeviceKind::Endpoint);
        assert_eq!(device.position, Position::default());
    }

    #[test]
    fn test_deserialize_rejects_bad_address() {
        let json = r#"{
            "id": "d9",
            "name": "Broken",
            "address": "10.0.0.999",
            "hardware_id": "AA:BB:CC:DD:EE:09"
        }"#;
        assert!(serde_json::from_str::<Device>(json).is_err());
    }
}
