//! Inbound inputs and outbound notifications
//!
//! Front ends drive the engine with [`SimInput`]s and observe it through a
//! single ordered stream of [`SimEvent`]s.

use std::fmt;

use arp_proto::{Packet, PacketId, ProtocolMode};
use arp_topology::{Device, DeviceId};
use serde::Serialize;

use crate::activity::ActivityEntry;
use crate::cache::CacheEntry;
use crate::state::SimulationSnapshot;

/// Everything a front end can ask the engine to do
#[derive(Debug, Clone)]
pub enum SimInput {
    /// Pick ARP or RARP
    ModeSelect(ProtocolMode),
    /// Pick the device that starts the exchange
    DeviceSelect(DeviceId),
    /// Schedule the phase script
    StartSimulation,
    /// Return to idle
    Reset,
    /// Replace the topology with random endpoints
    GenerateRandomTopology,
    /// Replace the topology with the given devices
    BulkUpdateDevices(Vec<Device>),
    /// The renderer finished animating a packet
    PacketAnimationComplete(PacketId),
}

/// How a guidance message should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A message explaining what just happened or what to do next
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Guidance {
    pub title: String,
    pub body: String,
    pub severity: Severity,
}

impl Guidance {
    pub fn new(title: impl Into<String>, body: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            severity,
        }
    }

    pub fn info(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(title, body, Severity::Info)
    }

    pub fn success(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(title, body, Severity::Success)
    }

    pub fn warning(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(title, body, Severity::Warning)
    }

    pub fn error(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(title, body, Severity::Error)
    }
}

/// Unified event enum for all engine activity
#[derive(Debug, Clone)]
pub enum SimEvent {
    /// Full presentation state after a transition
    StateChanged(Box<SimulationSnapshot>),

    // -------------------------------------------------------------------------
    // Packet events (for animation)
    // -------------------------------------------------------------------------
    /// A packet started travelling
    PacketLaunched(Packet),
    /// A packet was removed
    PacketRetired(PacketId),

    // -------------------------------------------------------------------------
    // Data events
    // -------------------------------------------------------------------------
    /// An entry was appended to the activity log
    ActivityRecorded(ActivityEntry),
    /// A cache mapping was written
    CacheUpdated(CacheEntry),
    /// The device list changed
    DevicesChanged(Vec<Device>),

    /// User-facing explanation
    Guidance(Guidance),
}

impl SimEvent {
    /// Get the guidance carried by this event, if any
    pub fn as_guidance(&self) -> Option<&Guidance> {
        match self {
            Self::Guidance(g) => Some(g),
            _ => None,
        }
    }
}
