//! Core protocol types
//!
//! Defines the control request shape sent to the UPS, the decoded reply
//! returned to callers, and a serializable mirror of libusb error codes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// `bmRequestType` for a standard, device-recipient IN request
pub const REQUEST_TYPE_STANDARD_DEVICE_IN: u8 = 0x80;

/// `bRequest` value for GET_DESCRIPTOR
pub const REQUEST_GET_DESCRIPTOR: u8 = 0x06;

/// Descriptor type byte for string descriptors
pub const DESCRIPTOR_TYPE_STRING: u8 = 0x03;

/// Capacity of a decoded response, including room for a terminator
///
/// Decoded text never exceeds `RESPONSE_CAPACITY - 1` characters.
pub const RESPONSE_CAPACITY: usize = 256;

/// Transfers shorter than this carry no data, only an acknowledgement
pub const REQ_NO_RET_MAX: usize = 3;

/// A single USB control transfer request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControlRequest {
    /// `bmRequestType`
    pub request_type: u8,
    /// `bRequest`
    pub request: u8,
    /// `wValue`
    pub value: u16,
    /// `wIndex`
    pub index: u16,
    /// `wLength`, the size of the IN buffer
    pub length: u16,
}

impl ControlRequest {
    /// Build a GET_DESCRIPTOR(string) request for a descriptor index
    pub const fn string_descriptor(index: u8, length: u16) -> Self {
        Self {
            request_type: REQUEST_TYPE_STANDARD_DEVICE_IN,
            request: REQUEST_GET_DESCRIPTOR,
            value: ((DESCRIPTOR_TYPE_STRING as u16) << 8) | index as u16,
            index: 0,
            length,
        }
    }

    /// True if data flows from device to host
    pub fn is_in(&self) -> bool {
        (self.request_type & 0x80) != 0
    }

    /// The string descriptor index encoded in `wValue`
    pub fn descriptor_index(&self) -> u8 {
        (self.value & 0xff) as u8
    }
}

/// Decoded reply to a UPS operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reply {
    /// The device answered with printable text
    Text(String),
    /// The device accepted the request without returning data
    Acknowledged,
}

impl Reply {
    /// Borrow the reply text, if any
    pub fn text(&self) -> Option<&str> {
        match self {
            Reply::Text(text) => Some(text),
            Reply::Acknowledged => None,
        }
    }

    /// Consume the reply, returning its text if any
    pub fn into_text(self) -> Option<String> {
        match self {
            Reply::Text(text) => Some(text),
            Reply::Acknowledged => None,
        }
    }

    pub fn is_acknowledged(&self) -> bool {
        matches!(self, Reply::Acknowledged)
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Text(text) => f.write_str(text),
            Reply::Acknowledged => f.write_str("acknowledged (no data)"),
        }
    }
}

/// USB error types
///
/// Maps to libusb error codes. See rusb::Error for details.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum UsbError {
    /// Transfer timed out
    Timeout,
    /// Endpoint stalled (protocol error)
    Pipe,
    /// Device was disconnected
    NoDevice,
    /// Device or endpoint not found
    NotFound,
    /// Device is busy
    Busy,
    /// Buffer overflow
    Overflow,
    /// I/O error
    Io,
    /// Invalid parameter
    InvalidParam,
    /// Access denied (permissions)
    Access,
    /// Other error with message
    Other { message: String },
}

impl fmt::Display for UsbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsbError::Timeout => f.write_str("operation timed out"),
            UsbError::Pipe => f.write_str("pipe error"),
            UsbError::NoDevice => f.write_str("no such device (it may have been disconnected)"),
            UsbError::NotFound => f.write_str("entity not found"),
            UsbError::Busy => f.write_str("resource busy"),
            UsbError::Overflow => f.write_str("overflow"),
            UsbError::Io => f.write_str("input/output error"),
            UsbError::InvalidParam => f.write_str("invalid parameter"),
            UsbError::Access => f.write_str("access denied (insufficient permissions)"),
            UsbError::Other { message } => f.write_str(message),
        }
    }
}
