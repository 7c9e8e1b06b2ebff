//! Error types for device storage and the registry

use thiserror::Error;

use crate::device::DeviceId;

/// Errors from a key-value store backend
#[derive(Debug, Error)]
pub enum StoreError {
    /// Key contains characters the backend cannot map to a location
    #[error("invalid store key: {0}")]
    InvalidKey(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur when mutating the device registry
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Device not found
    #[error("device not found: {0}")]
    UnknownDevice(DeviceId),

    /// Two devices in a replacement set share an id
    #[error("duplicate device id: {0}")]
    DuplicateId(DeviceId),
}
