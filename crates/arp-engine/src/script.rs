//! Phase scripts for ARP and RARP runs
//!
//! A script captures the devices taking part when the run starts. Later
//! registry changes do not alter a run that is already scheduled.

use std::net::Ipv4Addr;
use std::time::Duration;

use arp_proto::{AddressPair, MacAddr};
use arp_topology::{Device, DeviceId};
use serde::Serialize;

use crate::lifecycle::Phase;

/// A device as it was when a run started
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    pub id: DeviceId,
    pub name: String,
    pub address: Ipv4Addr,
    pub hardware_id: MacAddr,
}

impl Participant {
    /// Address and hardware id as one pair
    pub fn address_pair(&self) -> AddressPair {
        AddressPair::new(self.address, self.hardware_id)
    }
}

impl From<&Device> for Participant {
    fn from(device: &Device) -> Self {
        Self {
            id: device.id.clone(),
            name: device.name.clone(),
            address: device.address,
            hardware_id: device.hardware_id,
        }
    }
}

/// What a phase does when it fires
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseEffect {
    /// Sender broadcasts a request for the target's address
    ArpRequest {
        sender: Participant,
        target: Participant,
    },
    /// Target answers the sender with its hardware id
    ArpReply {
        sender: Participant,
        target: Participant,
    },
    /// Sender caches the target's mapping
    ArpCacheUpdate {
        sender: Participant,
        target: Participant,
    },
    /// Client broadcasts its hardware id asking for an address
    RarpRequest { client: Participant },
    /// Server picks an address and sends it to the client
    RarpReply { client: Participant },
    /// Client adopts the assigned address
    RarpAssign { client: Participant },
}

impl PhaseEffect {
    /// Short label for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::ArpRequest { .. } => "arp-request",
            Self::ArpReply { .. } => "arp-reply",
            Self::ArpCacheUpdate { .. } => "arp-cache-update",
            Self::RarpRequest { .. } => "rarp-request",
            Self::RarpReply { .. } => "rarp-reply",
            Self::RarpAssign { .. } => "rarp-assign",
        }
    }
}

/// Request, reply, cache update; each `delay` after the previous
pub fn arp_script(
    sender: Participant,
    target: Participant,
    delay: Duration,
) -> Vec<Phase<PhaseEffect>> {
    vec![
        Phase::new(
            delay,
            PhaseEffect::ArpRequest {
                sender: sender.clone(),
                target: target.clone(),
            },
        ),
        Phase::new(
            delay,
            PhaseEffect::ArpReply {
                sender: sender.clone(),
                target: target.clone(),
            },
        ),
        Phase::new(delay, PhaseEffect::ArpCacheUpdate { sender, target }),
    ]
}

/// Request, reply with assignment, device update; each `delay` after the
/// previous
pub fn rarp_script(client: Participant, delay: Duration) -> Vec<Phase<PhaseEffect>> {
    vec![
        Phase::new(
            delay,
            PhaseEffect::RarpRequest {
                client: client.clone(),
            },
        ),
        Phase::new(
            delay,
            PhaseEffect::RarpReply {
                client: client.clone(),
            },
        ),
        Phase::new(delay, PhaseEffect::RarpAssign { client }),
    ]
}
