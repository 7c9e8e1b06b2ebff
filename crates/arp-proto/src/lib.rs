//! Address Resolution Protocol Vocabulary
//!
//! This crate defines the types shared by every layer of the ARP/RARP
//! teaching simulator:
//!
//! - **ARP** (forward resolution): a host knows a peer's IPv4 address and asks
//!   the segment for the matching hardware address
//! - **RARP** (reverse resolution): a diskless host knows only its own hardware
//!   address and asks a server to assign it an IPv4 address
//!
//! # Architecture
//!
//! Logical addresses use [`std::net::Ipv4Addr`] directly. Hardware addresses
//! are [`MacAddr`], a 48-bit value with a colon-separated text form. Each
//! simulated exchange moves a [`Packet`] tagged with a [`PacketKind`].
//!
//! This is a pedagogical approximation: no frames are encoded and no bytes
//! ever reach a network interface.
//!
//! # Example
//!
//! ```rust
//! use std::net::Ipv4Addr;
//! use arp_proto::{MacAddr, PacketDraft, PacketKind};
//!
//! let mac: MacAddr = "00:1A:2B:3C:4D:5E".parse().unwrap();
//! let draft = PacketDraft::arp_request(
//!     Ipv4Addr::new(192, 168, 1, 10),
//!     mac,
//!     Ipv4Addr::new(192, 168, 1, 20),
//! );
//!
//! assert_eq!(draft.kind, PacketKind::ArpRequest);
//! assert_eq!(draft.describe(), "Who has 192.168.1.20? Tell 192.168.1.10");
//! ```

pub mod address;
pub mod error;
pub mod packet;

use serde::{Deserialize, Serialize};

pub use address::{is_placeholder, AddressPair, MacAddr, PLACEHOLDER_ADDRESS};
pub use error::AddressError;
pub use packet::{Packet, PacketDraft, PacketId, PacketKind};

/// Which resolution protocol a simulation run demonstrates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolMode {
    /// Forward resolution: IPv4 address to hardware address
    Arp,
    /// Reverse resolution: hardware address to assigned IPv4 address
    Rarp,
}

impl ProtocolMode {
    /// Returns a human-readable name for the protocol
    pub fn name(&self) -> &'static str {
        match self {
            ProtocolMode::Arp => "ARP",
            ProtocolMode::Rarp => "RARP",
        }
    }
}

impl std::fmt::Display for ProtocolMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ProtocolMode {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "arp" | "forward" => Ok(ProtocolMode::Arp),
            "rarp" | "reverse" => Ok(ProtocolMode::Rarp),
            other => Err(AddressError::UnknownMode(other.to_string())),
        }
    }
}
