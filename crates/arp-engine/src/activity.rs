//! Activity log
//!
//! Append-only record of protocol events. Consumers normally look at a
//! bounded, most-recent-first view through [`ActivityRecorder::recent`].

use std::fmt;
use std::time::SystemTime;

use arp_proto::{AddressPair, PacketKind};
use serde::Serialize;

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    ArpRequest,
    ArpReply,
    RarpRequest,
    RarpReply,
    CacheUpdate,
    DeviceUpdate,
}

impl ActivityKind {
    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::ArpRequest => "ARP Request",
            Self::ArpReply => "ARP Reply",
            Self::RarpRequest => "RARP Request",
            Self::RarpReply => "RARP Reply",
            Self::CacheUpdate => "Cache Update",
            Self::DeviceUpdate => "Device Update",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<PacketKind> for ActivityKind {
    fn from(kind: PacketKind) -> Self {
        match kind {
            PacketKind::ArpRequest => Self::ArpRequest,
            PacketKind::ArpReply => Self::ArpReply,
            PacketKind::RarpRequest => Self::RarpRequest,
            PacketKind::RarpReply => Self::RarpReply,
        }
    }
}

/// Sequential id of an activity entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ActivityId(pub u64);

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "activity-{}", self.0)
    }
}

/// One immutable log record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityEntry {
    /// Sequential id, unique for the lifetime of the recorder
    pub id: ActivityId,
    /// Wall-clock time the entry was appended
    pub timestamp: SystemTime,
    /// Event kind
    pub kind: ActivityKind,
    /// Human-readable message
    pub message: String,
    /// Sending side of the exchange
    pub source: Option<AddressPair>,
    /// Receiving side of the exchange
    pub target: Option<AddressPair>,
}

/// Append-only activity log
#[derive(Debug, Clone, Default)]
pub struct ActivityRecorder {
    entries: Vec<ActivityEntry>,
    next_id: u64,
}

impl ActivityRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and return it
    pub fn append(
        &mut self,
        kind: ActivityKind,
        message: impl Into<String>,
        source: Option<AddressPair>,
        target: Option<AddressPair>,
    ) -> &ActivityEntry {
        self.next_id += 1;
        self.entries.push(ActivityEntry {
            id: ActivityId(self.next_id),
            timestamp: SystemTime::now(),
            kind,
            message: message.into(),
            source,
            target,
        });
        &self.entries[self.entries.len() - 1]
    }

    /// The last `n` entries, most recent first
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &ActivityEntry> + '_ {
        self.entries.iter().rev().take(n)
    }

    /// Most recent entry
    pub fn latest(&self) -> Option<&ActivityEntry> {
        self.entries.last()
    }

    /// Every entry, oldest first
    pub fn entries(&self) -> &[ActivityEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries; ids keep increasing
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
