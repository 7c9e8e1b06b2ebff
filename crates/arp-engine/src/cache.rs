//! Address resolution cache
//!
//! Maps IPv4 addresses to hardware addresses. Entries are keyed by address:
//! writing an address that is already present replaces the old entry and
//! moves it to the end, so iteration order is last-write order.

use std::net::Ipv4Addr;
use std::time::SystemTime;

use arp_proto::MacAddr;
use serde::Serialize;

/// One resolved mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheEntry {
    /// Resolved IPv4 address
    pub address: Ipv4Addr,
    /// Hardware address it resolves to
    pub hardware_id: MacAddr,
    /// When the mapping was last written
    pub last_updated: SystemTime,
    /// Name of the device that owns the address, if known
    pub display_name: Option<String>,
}

/// Unbounded address to hardware id mapping
#[derive(Debug, Clone, Default)]
pub struct AddressCache {
    entries: Vec<CacheEntry>,
}

impl AddressCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the mapping for `address`
    ///
    /// Returns the entry that was replaced, if any.
    pub fn upsert(
        &mut self,
        address: Ipv4Addr,
        hardware_id: MacAddr,
        display_name: Option<String>,
    ) -> Option<CacheEntry> {
        let previous = self
            .entries
            .iter()
            .position(|e| e.address == address)
            .map(|i| self.entries.remove(i));

        self.entries.push(CacheEntry {
            address,
            hardware_id,
            last_updated: SystemTime::now(),
            display_name,
        });

        previous
    }

    /// All entries in last-write order
    pub fn entries(&self) -> &[CacheEntry] {
        &self.entries
    }

    /// Most recently written entry
    pub fn latest(&self) -> Option<&CacheEntry> {
        self.entries.last()
    }

    /// Look up the mapping for `address`
    pub fn get(&self, address: Ipv4Addr) -> Option<&CacheEntry> {
        self.entries.iter().find(|e| e.address == address)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 20);
    const B: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 30);
    const M1: MacAddr = MacAddr::new([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0x01]);
    const M2: MacAddr = MacAddr::new([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0x02]);

    #[test]
    fn test_upsert_replaces_existing() {
        let mut cache = AddressCache::new();
        assert!(cache.upsert(A, M1, None).is_none());

        let previous = cache.upsert(A, M2, Some("Beta".into())).unwrap();
        assert_eq!(previous.hardware_id, M1);

        assert_eq!(cache.len(), 1);
        let entry = cache.get(A).unwrap();
        assert_eq!(entry.hardware_id, M2);
        assert_eq!(entry.display_name.as_deref(), Some("Beta"));
    }

    #[test]
    fn test_rewrite_moves_entry_to_end() {
        let mut cache = AddressCache::new();
        cache.upsert(A, M1, None);
        cache.upsert(B, M2, None);
        cache.upsert(A, M2, None);

        let order: Vec<_> = cache.entries().iter().map(|e| e.address).collect();
        assert_eq!(order, vec![B, A]);
        assert_eq!(cache.latest().unwrap().address, A);
    }

    #[test]
    fn test_clear() {
        let mut cache = AddressCache::new();
        cache.upsert(A, M1, None);
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get(A).is_none());
    }
}
