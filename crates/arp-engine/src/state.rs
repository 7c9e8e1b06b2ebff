//! Simulation state and presentation snapshots

use arp_proto::{Packet, ProtocolMode};
use arp_topology::{Device, DeviceId};
use serde::Serialize;

use crate::activity::ActivityEntry;
use crate::cache::CacheEntry;

/// One step in a mode's walkthrough
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationStep {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub completed: bool,
}

impl SimulationStep {
    const fn new(id: &'static str, title: &'static str, description: &'static str) -> Self {
        Self {
            id,
            title,
            description,
            completed: false,
        }
    }

    /// The fixed four steps for a mode, none completed
    pub fn for_mode(mode: ProtocolMode) -> Vec<Self> {
        match mode {
            ProtocolMode::Arp => vec![
                Self::new(
                    "select-sender",
                    "Select Sender Device",
                    "Choose the device that will send the ARP request",
                ),
                Self::new(
                    "send-request",
                    "Send ARP Request",
                    "Broadcast ARP request to find MAC address",
                ),
                Self::new(
                    "receive-reply",
                    "Receive ARP Reply",
                    "Target device responds with its MAC address",
                ),
                Self::new(
                    "update-cache",
                    "Update ARP Cache",
                    "Store the IP-MAC mapping in cache",
                ),
            ],
            ProtocolMode::Rarp => vec![
                Self::new(
                    "select-device",
                    "Select Diskless Device",
                    "Choose a device that needs an IP address",
                ),
                Self::new(
                    "send-rarp-request",
                    "Send RARP Request",
                    "Request IP address from RARP server",
                ),
                Self::new(
                    "receive-rarp-reply",
                    "Receive RARP Reply",
                    "Server assigns IP address to device",
                ),
                Self::new(
                    "update-device",
                    "Update Device IP",
                    "Device now has assigned IP address",
                ),
            ],
        }
    }
}

/// Where the engine is in its lifecycle, derived from [`SimulationState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnginePhase {
    Idle,
    ModeSelected,
    DeviceSelected,
    Running,
    Complete,
}

impl EnginePhase {
    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::ModeSelected => "Mode Selected",
            Self::DeviceSelected => "Device Selected",
            Self::Running => "Running",
            Self::Complete => "Complete",
        }
    }
}

/// Engine-owned walkthrough state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SimulationState {
    /// Selected protocol, if any
    pub mode: Option<ProtocolMode>,
    /// Index of the first step not yet completed
    pub current_step: usize,
    /// A script is scheduled and has not finished
    pub running: bool,
    /// The last script finished
    pub complete: bool,
    /// Selected device, resolved through the registry at use time
    pub selected_device: Option<DeviceId>,
    /// Steps for the selected mode
    pub steps: Vec<SimulationStep>,
}

impl SimulationState {
    /// Fresh state for a newly selected mode
    pub fn for_mode(mode: ProtocolMode) -> Self {
        Self {
            mode: Some(mode),
            steps: SimulationStep::for_mode(mode),
            ..Self::default()
        }
    }

    /// Derive the lifecycle phase
    pub fn phase(&self) -> EnginePhase {
        if self.running {
            EnginePhase::Running
        } else if self.complete {
            EnginePhase::Complete
        } else if self.mode.is_none() {
            EnginePhase::Idle
        } else if self.selected_device.is_some() {
            EnginePhase::DeviceSelected
        } else {
            EnginePhase::ModeSelected
        }
    }

    /// The step waiting to be completed
    pub fn current(&self) -> Option<&SimulationStep> {
        self.steps.get(self.current_step)
    }

    /// Number of completed steps
    pub fn completed_steps(&self) -> usize {
        self.steps.iter().filter(|s| s.completed).count()
    }

    /// Complete the current step and move to the next one
    pub(crate) fn advance_step(&mut self) -> Option<&SimulationStep> {
        let index = self.current_step;
        let step = self.steps.get_mut(index)?;
        step.completed = true;
        self.current_step += 1;
        self.steps.get(index)
    }

    /// Undo everything after device selection
    pub(crate) fn rewind_to_selection(&mut self) {
        for step in self.steps.iter_mut().skip(1) {
            step.completed = false;
        }
        self.current_step = self.current_step.min(1);
        self.running = false;
        self.complete = false;
    }

    /// Drop the selection and reopen the first step
    pub(crate) fn reopen_selection(&mut self) {
        for step in &mut self.steps {
            step.completed = false;
        }
        self.current_step = 0;
        self.selected_device = None;
    }
}

/// Immutable view handed to presentation layers
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSnapshot {
    pub state: SimulationState,
    pub phase: EnginePhase,
    /// Live packets in launch order
    pub packets: Vec<Packet>,
    /// Most recent activity first
    pub recent_activity: Vec<ActivityEntry>,
    /// Cache in last-write order
    pub cache: Vec<CacheEntry>,
    pub devices: Vec<Device>,
}
