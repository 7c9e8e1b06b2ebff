//! Error types for the simulation engine

use arp_topology::{DeviceId, RegistryError};
use thiserror::Error;

/// Precondition violations reported by engine operations
///
/// A rejected operation leaves the engine state unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// No protocol mode has been picked yet
    #[error("no protocol mode selected")]
    NoModeSelected,

    /// Start requested before a device was picked
    #[error("no device selected")]
    NoDeviceSelected,

    /// Device selection is only allowed on the first step
    #[error("device selection is not open on the current step")]
    NotSelectingDevice,

    /// A run is in progress
    #[error("a simulation is already running")]
    SimulationRunning,

    /// The run finished; reset or pick a mode to run again
    #[error("the simulation is complete")]
    SimulationComplete,

    /// Device id not present in the registry
    #[error("unknown device: {0}")]
    UnknownDevice(DeviceId),

    /// Device exists but is offline
    #[error("device is offline: {0}")]
    DeviceOffline(DeviceId),

    /// No other device exists to resolve
    #[error("no device to resolve from {0}")]
    NoResolutionTarget(DeviceId),

    /// Replacement device list was rejected by the registry
    #[error("invalid topology: {0}")]
    InvalidTopology(#[from] RegistryError),
}
