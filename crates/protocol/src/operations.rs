//! UPS operation table
//!
//! Every UPS function is a GET_DESCRIPTOR(string) request with a fixed
//! descriptor index and buffer length. The timed self-test is the only
//! operation whose length is computed, from the requested minutes.

use crate::duration::encode_minutes;
use crate::error::Result;
use crate::types::ControlRequest;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Buffer length used by most operations
pub const DEFAULT_REPLY_LENGTH: u16 = 256;

/// Buffer length requested by the shutdown command
pub const SHUTDOWN_REPLY_LENGTH: u16 = 2460;

/// Descriptor index and expected reply length for one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationDescriptor {
    pub index: u8,
    pub length: u16,
}

impl OperationDescriptor {
    pub const fn new(index: u8, length: u16) -> Self {
        Self { index, length }
    }

    /// The control request that carries this operation
    pub fn request(&self) -> ControlRequest {
        ControlRequest::string_descriptor(self.index, self.length)
    }
}

pub const NAME: OperationDescriptor = OperationDescriptor::new(2, DEFAULT_REPLY_LENGTH);
pub const STATUS: OperationDescriptor = OperationDescriptor::new(3, DEFAULT_REPLY_LENGTH);
pub const TEST: OperationDescriptor = OperationDescriptor::new(4, DEFAULT_REPLY_LENGTH);
pub const TEST_UNTIL_BATTERY_LOW: OperationDescriptor =
    OperationDescriptor::new(5, DEFAULT_REPLY_LENGTH);
pub const TEST_FOR_MINUTES_INDEX: u8 = 6;
pub const TOGGLE_BEEP: OperationDescriptor = OperationDescriptor::new(7, DEFAULT_REPLY_LENGTH);
pub const ABORT_TEST: OperationDescriptor = OperationDescriptor::new(11, DEFAULT_REPLY_LENGTH);
pub const RATING: OperationDescriptor = OperationDescriptor::new(13, DEFAULT_REPLY_LENGTH);
pub const SHUTDOWN: OperationDescriptor = OperationDescriptor::new(105, SHUTDOWN_REPLY_LENGTH);

/// A named UPS operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// Read the UPS model name
    Name,
    /// Read status, waiting for the reply to settle
    Status,
    /// Read status once
    StatusNoAck,
    /// Run the 10 second self-test
    Test,
    /// Run a self-test until the battery reports low
    TestUntilBatteryLow,
    /// Run a self-test for the given number of minutes (1-99)
    TestForMinutes(u32),
    /// Toggle the audible alarm
    ToggleBeep,
    /// Schedule a shutdown
    Shutdown,
    /// Cancel a running self-test
    AbortTest,
    /// Read the nominal rating
    Rating,
}

impl Operation {
    /// Resolve the descriptor for this operation
    ///
    /// Fails only for `TestForMinutes` with a duration outside 1..=99.
    pub fn descriptor(&self) -> Result<OperationDescriptor> {
        Ok(match self {
            Operation::Name => NAME,
            Operation::Status | Operation::StatusNoAck => STATUS,
            Operation::Test => TEST,
            Operation::TestUntilBatteryLow => TEST_UNTIL_BATTERY_LOW,
            Operation::TestForMinutes(minutes) => {
                OperationDescriptor::new(TEST_FOR_MINUTES_INDEX, encode_minutes(*minutes)?)
            }
            Operation::ToggleBeep => TOGGLE_BEEP,
            Operation::Shutdown => SHUTDOWN,
            Operation::AbortTest => ABORT_TEST,
            Operation::Rating => RATING,
        })
    }

    /// Number of transfers the operation issues
    pub fn transfer_count(&self) -> usize {
        match self {
            Operation::Status => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Name => write!(f, "get name"),
            Operation::Status => write!(f, "get status"),
            Operation::StatusNoAck => write!(f, "get status (no ack)"),
            Operation::Test => write!(f, "run test"),
            Operation::TestUntilBatteryLow => write!(f, "run test until battery low"),
            Operation::TestForMinutes(m) => write!(f, "run test for {} minutes", m),
            Operation::ToggleBeep => write!(f, "toggle beep"),
            Operation::Shutdown => write!(f, "shutdown"),
            Operation::AbortTest => write!(f, "abort test"),
            Operation::Rating => write!(f, "get rating"),
        }
    }
}
