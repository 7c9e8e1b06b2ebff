//! Built-in and randomly generated topologies

use std::collections::HashSet;
use std::net::Ipv4Addr;

use arp_proto::MacAddr;
use rand::Rng;

use crate::device::Device;

/// Number of endpoints in a randomly generated topology
pub const RANDOM_ENDPOINT_COUNT: usize = 6;

const RANDOM_NAMES: [&str; RANDOM_ENDPOINT_COUNT] =
    ["Alpha", "Beta", "Gamma", "Delta", "Epsilon", "Zeta"];
const RANDOM_ROLES: [&str; RANDOM_ENDPOINT_COUNT] =
    ["Terminal", "Station", "Node", "Bridge", "Router", "Server"];

/// The relay every topology is built around
pub fn default_relay() -> Device {
    Device::relay(
        "device-hub",
        "Network Hub",
        Ipv4Addr::new(192, 168, 1, 1),
        MacAddr::new([0x00, 0x00, 0x5E, 0x00, 0x01, 0x01]),
    )
    .with_position(300.0, 280.0)
}

/// Topology used when nothing usable has been persisted
pub fn default_devices() -> Vec<Device> {
    let endpoints = [
        ("device-1", "Alpha Terminal", 10, [0x00, 0x1A, 0x2B, 0x3C, 0x4D, 0x5E]),
        ("device-2", "Beta Station", 20, [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]),
        ("device-3", "Gamma Node", 30, [0x11, 0x22, 0x33, 0x44, 0x55, 0x66]),
        ("device-4", "Delta Bridge", 40, [0x77, 0x88, 0x99, 0xAA, 0xBB, 0xCC]),
        ("device-5", "Epsilon Router", 50, [0xDD, 0xEE, 0xFF, 0x00, 0x11, 0x22]),
        ("device-6", "Zeta Server", 60, [0x33, 0x44, 0x55, 0x66, 0x77, 0x88]),
    ];

    let mut devices: Vec<Device> = endpoints
        .iter()
        .enumerate()
        .map(|(i, (id, name, host, mac))| {
            Device::endpoint(
                *id,
                *name,
                Ipv4Addr::new(192, 168, 1, *host),
                MacAddr::new(*mac),
            )
            .with_position(50.0, 80.0 * (i as f32 + 1.0))
        })
        .collect();

    devices.insert(1, default_relay());
    devices
}

/// Generate a fresh topology: the default relay plus
/// [`RANDOM_ENDPOINT_COUNT`] endpoints with unique random addresses
pub fn random_devices<R: Rng>(rng: &mut R) -> Vec<Device> {
    let relay = default_relay();
    let mut used_addresses: HashSet<Ipv4Addr> = HashSet::from([relay.address]);
    let mut used_macs: HashSet<MacAddr> = HashSet::from([relay.hardware_id]);

    let mut devices = Vec::with_capacity(RANDOM_ENDPOINT_COUNT + 1);
    for i in 0..RANDOM_ENDPOINT_COUNT {
        let address = loop {
            let candidate = Ipv4Addr::new(192, 168, rng.gen_range(1..=255), rng.gen_range(1..=254));
            if used_addresses.insert(candidate) {
                break candidate;
            }
        };
        let hardware_id = loop {
            let candidate = MacAddr::new(rng.gen());
            if !candidate.is_broadcast() && used_macs.insert(candidate) {
                break candidate;
            }
        };

        devices.push(
            Device::endpoint(
                format!("device-{}", i + 1),
                format!("{} {}", RANDOM_NAMES[i], RANDOM_ROLES[i]),
                address,
                hardware_id,
            )
            .with_position(100.0, 100.0 + i as f32 * 100.0),
        );
    }

    devices.push(relay);
    devices
}
