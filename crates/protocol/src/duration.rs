//! Self-test duration encoding

use crate::error::{Result, UpsError};

/// Shortest test the device accepts, in minutes
pub const MIN_TEST_MINUTES: u32 = 1;

/// Longest test the device accepts, in minutes
pub const MAX_TEST_MINUTES: u32 = 99;

/// Encode a test duration into the descriptor length the UPS expects
///
/// The device counts in a scale that skips six values at every ten minute
/// boundary.
pub fn encode_minutes(minutes: u32) -> Result<u16> {
    if !(MIN_TEST_MINUTES..=MAX_TEST_MINUTES).contains(&minutes) {
        return Err(UpsError::OutOfRange { minutes });
    }

    let level = (minutes - 1) / 10;
    let mut value = 100 + minutes + level * 6;
    if minutes % 10 == 0 {
        value += 6;
    }

    // At most 100 + 99 + 9 * 6 = 253.
    Ok(value as u16)
}
