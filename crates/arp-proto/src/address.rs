//! Logical and hardware addresses

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AddressError;

/// Address a RARP client uses before it has been assigned one
pub const PLACEHOLDER_ADDRESS: Ipv4Addr = Ipv4Addr::UNSPECIFIED;

/// Returns true if `addr` is the unassigned placeholder
pub fn is_placeholder(addr: Ipv4Addr) -> bool {
    addr == PLACEHOLDER_ADDRESS
}

/// A 48-bit hardware (MAC) address
///
/// Text form is six upper-case hex octets joined by `:`. Parsing also accepts
/// `-` as the separator and lower-case digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddr([u8; 6]);

impl MacAddr {
    /// The all-ones broadcast address
    pub const BROADCAST: MacAddr = MacAddr([0xFF; 6]);

    /// Create from raw octets
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// Get the raw octets
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Check if this is the broadcast address
    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            o[0], o[1], o[2], o[3], o[4], o[5]
        )
    }
}

impl FromStr for MacAddr {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AddressError::InvalidHardwareId(s.to_string());
        let trimmed = s.trim();

        // Mixed separators are rejected
        let sep = if trimmed.contains(':') { ':' } else { '-' };
        let mut octets = [0u8; 6];
        let mut count = 0;

        for part in trimmed.split(sep) {
            if count == 6 || part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            octets[count] = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
            count += 1;
        }

        if count != 6 {
            return Err(invalid());
        }
        Ok(Self(octets))
    }
}

impl TryFrom<String> for MacAddr {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MacAddr> for String {
    fn from(mac: MacAddr) -> Self {
        mac.to_string()
    }
}

/// A logical address with an optionally known hardware address
///
/// Activity records use this for both ends of an exchange; an ARP request
/// knows its target's IPv4 address but not yet its hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressPair {
    /// IPv4 address
    pub address: Ipv4Addr,
    /// Hardware address, if known
    pub hardware_id: Option<MacAddr>,
}

impl AddressPair {
    /// Pair with both halves known
    pub fn new(address: Ipv4Addr, hardware_id: MacAddr) -> Self {
        Self {
            address,
            hardware_id: Some(hardware_id),
        }
    }

    /// Pair with only the logical address known
    pub fn address_only(address: Ipv4Addr) -> Self {
        Self {
            address,
            hardware_id: None,
        }
    }
}

impl fmt::Display for AddressPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.hardware_id {
            Some(mac) => write!(f, "{} ({})", self.address, mac),
            None => write!(f, "{}", self.address),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_colon_separated() {
        let mac: MacAddr = "00:1a:2B:3c:4D:5e".parse().unwrap();
        assert_eq!(mac.octets(), [0x00, 0x1A, 0x2B, 0x3C, 0x4D, 0x5E]);
        assert_eq!(mac.to_string(), "00:1A:2B:3C:4D:5E");
    }

    #[test]
    fn test_parse_dash_separated() {
        let mac: MacAddr = "AA-BB-CC-DD-EE-FF".parse().unwrap();
        assert_eq!(mac.to_string(), "AA:BB:CC:DD:EE:FF");
    }

    #[test]
    fn test_reject_malformed_hardware_ids() {
        for bad in [
            "",
            "00:1A:2B:3C:4D",
            "00:1A:2B:3C:4D:5E:6F",
            "00:1A:2B:3C:4D:GG",
            "001A2B3C4D5E",
            "0:1A:2B:3C:4D:5E",
            "00:1A-2B:3C:4D:5E",
        ] {
            assert!(bad.parse::<MacAddr>().is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_broadcast() {
        assert!(MacAddr::BROADCAST.is_broadcast());
        assert_eq!(MacAddr::BROADCAST.to_string(), "FF:FF:FF:FF:FF:FF");
    }

    #[test]
    fn test_placeholder() {
        assert!(is_placeholder(Ipv4Addr::new(0, 0, 0, 0)));
        assert!(!is_placeholder(Ipv4Addr::new(192, 168, 1, 100)));
    }

    #[test]
    fn test_mac_serde_as_string() {
        let mac = MacAddr::new([0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);
        let json = serde_json::to_string(&mac).unwrap();
        assert_eq!(json, "\"11:22:33:44:55:66\"");

        let bad: Result<MacAddr, _> = serde_json::from_str("\"not-a-mac\"");
        assert!(bad.is_err());
    }

    proptest::proptest! {
        #[test]
        fn separator_and_case_do_not_change_value(octets in proptest::prelude::any::<[u8; 6]>()) {
            let mac = MacAddr::new(octets);
            let dashed = mac.to_string().replace(':', "-").to_lowercase();
            proptest::prop_assert_eq!(dashed.parse::<MacAddr>().unwrap(), mac);
        }
    }

    #[test]
    fn test_address_pair_display() {
        let mac = MacAddr::new([0, 0, 0, 0, 0, 1]);
        let pair = AddressPair::new(Ipv4Addr::new(10, 0, 0, 1), mac);
        assert_eq!(pair.to_string(), "10.0.0.1 (00:00:00:00:00:01)");
        assert_eq!(
            AddressPair::address_only(Ipv4Addr::new(10, 0, 0, 2)).to_string(),
            "10.0.0.2"
        );
    }
}
