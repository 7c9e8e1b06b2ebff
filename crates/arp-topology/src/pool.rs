//! Address pool for RARP assignments
//!
//! Assignment is a deterministic linear scan: start at the pool base and walk
//! upward through host `.254` of the base's /24, returning the first address
//! that is neither a placeholder nor held by any device.

use std::net::Ipv4Addr;

use arp_proto::{is_placeholder, PLACEHOLDER_ADDRESS};
use serde::{Deserialize, Serialize};

use crate::device::Device;

/// Source of fresh addresses for RARP replies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressPool {
    /// First address handed out
    base: Ipv4Addr,
    /// Address an unconfigured client uses; never handed out
    placeholder: Ipv4Addr,
}

impl AddressPool {
    /// Highest host octet the scan will reach
    pub const LAST_HOST: u8 = 254;

    pub fn new(base: Ipv4Addr) -> Self {
        Self {
            base,
            placeholder: PLACEHOLDER_ADDRESS,
        }
    }

    /// Also skip `placeholder` when it differs from the unspecified address
    pub fn with_placeholder(mut self, placeholder: Ipv4Addr) -> Self {
        self.placeholder = placeholder;
        self
    }

    /// First free address given the current devices, or `None` when every
    /// address in the pool is taken
    pub fn next_free(&self, devices: &[Device]) -> Option<Ipv4Addr> {
        let [a, b, c, first] = self.base.octets();
        (first..=Self::LAST_HOST)
            .map(|host| Ipv4Addr::new(a, b, c, host))
            .find(|candidate| {
                !is_placeholder(*candidate)
                    && *candidate != self.placeholder
                    && !devices.iter().any(|d| d.address == *candidate)
            })
    }
}

impl Default for AddressPool {
    fn default() -> Self {
        Self::new(Ipv4Addr::new(192, 168, 1, 100))
    }
}
