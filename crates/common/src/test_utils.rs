//! Test utilities for ups-control
//!
//! Provides a scripted control transport and helpers that build realistic
//! string descriptor replies.
//!
//! # Example
//!
//! ```
//! use common::ControlTransport;
//! use common::test_utils::{ScriptedTransport, string_descriptor_bytes};
//! use protocol::{Operation, Reply};
//!
//! let mut ups = ScriptedTransport::new()
//!     .with_reply(&string_descriptor_bytes("(230.0 230.0 229.0 012 50.0 13.7 28.0 00000001"));
//!
//! let reply = ups
//!     .send_and_decode(Operation::StatusNoAck.descriptor().unwrap())
//!     .unwrap();
//! assert_eq!(
//!     reply,
//!     Reply::Text("230.0 230.0 229.0 012 50.0 13.7 28.0 00000001".to_string())
//! );
//! ```

use crate::transport::ControlTransport;
use protocol::{ControlRequest, DESCRIPTOR_TYPE_STRING, UsbError};
use std::collections::VecDeque;

/// Sample Megatec status line as the device frames it
pub const SAMPLE_STATUS: &str = "(228.0 225.0 229.5 014 50.0 27.3 25.0 00001001";

/// Sample rating line as the device frames it
pub const SAMPLE_RATING: &str = "#230.0 004 12.00 50.0";

/// Sample model name
pub const SAMPLE_NAME: &str = "VIRTUAL UPS 1000VA";

/// Encode `text` as a USB string descriptor (UTF-16LE with a 2 byte header)
///
/// The length byte is zeroed when it falls in printable ASCII, so it never
/// leaks into decoded text. Use [`string_descriptor_bytes_verbatim`] for the
/// bytes a device actually sends.
pub fn string_descriptor_bytes(text: &str) -> Vec<u8> {
    let mut bytes = string_descriptor_bytes_verbatim(text);
    if (32..=126).contains(&bytes[0]) {
        bytes[0] = 0;
    }
    bytes
}

/// Encode `text` as a device sends it, length byte untouched
///
/// The length byte saturates at 255 for long strings. Between 15 and 62
/// UTF-16 units it is printable and survives decoding as a leading
/// character.
pub fn string_descriptor_bytes_verbatim(text: &str) -> Vec<u8> {
    let units = text.encode_utf16().count();
    let mut bytes = Vec::with_capacity(2 + units * 2);
    bytes.push((2 + units * 2).min(u8::MAX as usize) as u8);
    bytes.push(DESCRIPTOR_TYPE_STRING);
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    bytes
}

/// A control transport that replays a fixed script
///
/// Each call to `read_control` consumes the next scripted outcome and
/// records the request. An exhausted script reports `UsbError::NoDevice`.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: VecDeque<Result<Vec<u8>, UsbError>>,
    requests: Vec<ControlRequest>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful transfer returning `bytes`
    pub fn with_reply(mut self, bytes: &[u8]) -> Self {
        self.push_reply(bytes);
        self
    }

    /// Queue a failed transfer
    pub fn with_error(mut self, error: UsbError) -> Self {
        self.push_error(error);
        self
    }

    pub fn push_reply(&mut self, bytes: &[u8]) {
        self.script.push_back(Ok(bytes.to_vec()));
    }

    pub fn push_error(&mut self, error: UsbError) {
        self.script.push_back(Err(error));
    }

    /// Requests issued so far, in order
    pub fn requests(&self) -> &[ControlRequest] {
        &self.requests
    }

    /// Scripted outcomes not yet consumed
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl ControlTransport for ScriptedTransport {
    fn read_control(
        &mut self,
        request: &ControlRequest,
        buf: &mut [u8],
    ) -> Result<usize, UsbError> {
        self.requests.push(*request);

        let bytes = self.script.pop_front().ok_or(UsbError::NoDevice)??;
        let len = bytes.len().min(buf.len());
        buf[..len].copy_from_slice(&bytes[..len]);
        Ok(len)
    }
}
