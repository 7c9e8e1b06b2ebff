//! Error types for address parsing and validation

use thiserror::Error;

/// Errors that can occur while parsing addresses or protocol names
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// Hardware address is not six hex octets
    #[error("invalid hardware address: {0}")]
    InvalidHardwareId(String),

    /// Protocol name is neither ARP nor RARP
    #[error("unknown protocol mode: {0}")]
    UnknownMode(String),
}
