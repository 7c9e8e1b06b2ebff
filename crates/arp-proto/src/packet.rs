//! Simulated packets
//!
//! A [`PacketDraft`] names the endpoints of an exchange; the lifecycle
//! manager turns it into a [`Packet`] with an id and animation state when the
//! phase that carries it begins.

use std::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::address::MacAddr;

/// The four packet-exchange phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacketKind {
    /// Broadcast: who has this IPv4 address?
    ArpRequest,
    /// Unicast answer carrying the target's hardware address
    ArpReply,
    /// Broadcast: which IPv4 address belongs to this hardware address?
    RarpRequest,
    /// Server answer carrying the assigned IPv4 address
    RarpReply,
}

impl PacketKind {
    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::ArpRequest => "ARP Request",
            Self::ArpReply => "ARP Reply",
            Self::RarpRequest => "RARP Request",
            Self::RarpReply => "RARP Reply",
        }
    }
}

impl fmt::Display for PacketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unique identifier for a packet within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PacketId(pub u64);

impl fmt::Display for PacketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pkt-{}", self.0)
    }
}

/// Endpoints and kind of a packet that has not been launched yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketDraft {
    /// Phase tag
    pub kind: PacketKind,
    /// Sender IPv4 address (placeholder for an unconfigured RARP client)
    pub source_address: Ipv4Addr,
    /// Sender hardware address
    pub source_hardware_id: MacAddr,
    /// Address being resolved or assigned
    pub target_address: Option<Ipv4Addr>,
    /// Hardware address of the receiver, when known
    pub target_hardware_id: Option<MacAddr>,
}

impl PacketDraft {
    /// Broadcast asking who owns `target_address`
    pub fn arp_request(
        source_address: Ipv4Addr,
        source_hardware_id: MacAddr,
        target_address: Ipv4Addr,
    ) -> Self {
        Self {
            kind: PacketKind::ArpRequest,
            source_address,
            source_hardware_id,
            target_address: Some(target_address),
            target_hardware_id: None,
        }
    }

    /// Answer from the resolved host back to the requester
    pub fn arp_reply(
        source_address: Ipv4Addr,
        source_hardware_id: MacAddr,
        requester_address: Ipv4Addr,
        requester_hardware_id: MacAddr,
    ) -> Self {
        Self {
            kind: PacketKind::ArpReply,
            source_address,
            source_hardware_id,
            target_address: Some(requester_address),
            target_hardware_id: Some(requester_hardware_id),
        }
    }

    /// Broadcast from a client that only knows its hardware address
    pub fn rarp_request(client_hardware_id: MacAddr, placeholder: Ipv4Addr) -> Self {
        Self {
            kind: PacketKind::RarpRequest,
            source_address: placeholder,
            source_hardware_id: client_hardware_id,
            target_address: None,
            target_hardware_id: None,
        }
    }

    /// Assignment delivered to the client
    pub fn rarp_reply(client_hardware_id: MacAddr, assigned: Ipv4Addr) -> Self {
        Self {
            kind: PacketKind::RarpReply,
            source_address: assigned,
            source_hardware_id: client_hardware_id,
            target_address: Some(assigned),
            target_hardware_id: Some(client_hardware_id),
        }
    }

    /// One-line explanation of what the packet says
    pub fn describe(&self) -> String {
        describe(
            self.kind,
            self.source_address,
            self.source_hardware_id,
            self.target_address,
        )
    }
}

/// A launched packet as seen by the rendering layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Packet {
    /// Unique id
    pub id: PacketId,
    /// Phase tag
    pub kind: PacketKind,
    /// Sender IPv4 address
    pub source_address: Ipv4Addr,
    /// Sender hardware address
    pub source_hardware_id: MacAddr,
    /// Address being resolved or assigned
    pub target_address: Option<Ipv4Addr>,
    /// Hardware address of the receiver, when known
    pub target_hardware_id: Option<MacAddr>,
    /// Animation progress, 0 to 100
    pub progress: u8,
    /// False once the packet has reached its destination
    pub active: bool,
}

impl Packet {
    /// Launch a draft under the given id
    pub fn from_draft(id: PacketId, draft: PacketDraft) -> Self {
        Self {
            id,
            kind: draft.kind,
            source_address: draft.source_address,
            source_hardware_id: draft.source_hardware_id,
            target_address: draft.target_address,
            target_hardware_id: draft.target_hardware_id,
            progress: 0,
            active: true,
        }
    }

    /// One-line explanation of what the packet says
    pub fn describe(&self) -> String {
        describe(
            self.kind,
            self.source_address,
            self.source_hardware_id,
            self.target_address,
        )
    }
}

fn describe(
    kind: PacketKind,
    source_address: Ipv4Addr,
    source_hardware_id: MacAddr,
    target_address: Option<Ipv4Addr>,
) -> String {
    let target = target_address
        .map(|a| a.to_string())
        .unwrap_or_else(|| "?".to_string());
    match kind {
        PacketKind::ArpRequest => format!("Who has {}? Tell {}", target, source_address),
        PacketKind::ArpReply => format!("{} is at {}", source_address, source_hardware_id),
        PacketKind::RarpRequest => format!("Who am I? My MAC is {}", source_hardware_id),
        PacketKind::RarpReply => format!("You are {}", target),
    }
}
