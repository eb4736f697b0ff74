//! Protocol error types

use crate::types::UsbError;
use thiserror::Error;

/// Errors raised while talking to a UPS
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpsError {
    /// The USB subsystem could not be initialized
    #[error("Failed to initialize USB context: {0}")]
    ContextInitFailed(UsbError),

    /// No matching device is attached, or access to it was denied
    #[error("UPS {vendor_id:04x}:{product_id:04x} not found or not accessible")]
    DeviceNotFound { vendor_id: u16, product_id: u16 },

    /// The control transfer failed
    #[error("USB transfer failed: {0}")]
    Transport(UsbError),

    /// Test duration outside 1..=99 minutes
    #[error("Test duration of {minutes} minutes is out of range (1-99)")]
    OutOfRange { minutes: u32 },

    /// A reply could not be interpreted
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl From<UsbError> for UpsError {
    fn from(err: UsbError) -> Self {
        UpsError::Transport(err)
    }
}

/// Type alias for protocol results
pub type Result<T> = std::result::Result<T, UpsError>;
