//! Status and rating reply parsing
//!
//! Status replies are space-separated readings followed by an optional
//! 8-character bit field:
//!
//! ```text
//! 228.0 228.0 228.0 014 50.0 27.3 25.0 00001000
//! ```
//!
//! Rating replies carry four nominal values, usually prefixed with `#`:
//!
//! ```text
//! #230.0 004 12.00 50.0
//! ```

use crate::error::UpsError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Minimum number of numeric readings in a status reply
pub const STATUS_READINGS: usize = 7;

/// Number of fields in a rating reply
pub const RATING_FIELDS: usize = 4;

/// Live readings reported by the UPS
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsStatus {
    /// Input voltage (V)
    pub input_voltage: f32,
    /// Input voltage at the last fault (V)
    pub input_fault_voltage: f32,
    /// Output voltage (V)
    pub output_voltage: f32,
    /// Output load as a percentage of rated current
    pub output_current_percent: f32,
    /// Input frequency (Hz)
    pub input_frequency: f32,
    /// Battery voltage (V)
    pub battery_voltage: f32,
    /// Internal temperature (°C)
    pub temperature: f32,
    /// Status bits, when the UPS sends them
    pub flags: Option<StatusFlags>,
}

/// Status bits, most significant first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusFlags {
    pub utility_fail: bool,
    pub battery_low: bool,
    pub bypass_active: bool,
    pub ups_failed: bool,
    pub standby: bool,
    pub test_in_progress: bool,
    pub shutdown_active: bool,
    pub beeper_on: bool,
}

impl FromStr for StatusFlags {
    type Err = UpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bits: Vec<bool> = s
            .chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                _ => Err(UpsError::MalformedResponse(format!(
                    "invalid status bit '{}' in '{}'",
                    c, s
                ))),
            })
            .collect::<Result<_, _>>()?;

        let [b7, b6, b5, b4, b3, b2, b1, b0] = bits[..] else {
            return Err(UpsError::MalformedResponse(format!(
                "expected 8 status bits, got '{}'",
                s
            )));
        };

        Ok(Self {
            utility_fail: b7,
            battery_low: b6,
            bypass_active: b5,
            ups_failed: b4,
            standby: b3,
            test_in_progress: b2,
            shutdown_active: b1,
            beeper_on: b0,
        })
    }
}

impl FromStr for UpsStatus {
    type Err = UpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = strip_header(s).split_whitespace().collect();
        if fields.len() < STATUS_READINGS {
            return Err(UpsError::MalformedResponse(format!(
                "expected {} status readings, got {}: '{}'",
                STATUS_READINGS,
                fields.len(),
                s
            )));
        }

        let readings = parse_readings(&fields[..STATUS_READINGS])?;
        let flags = fields
            .get(STATUS_READINGS)
            .map(|bits| bits.parse())
            .transpose()?;

        Ok(Self {
            input_voltage: readings[0],
            input_fault_voltage: readings[1],
            output_voltage: readings[2],
            output_current_percent: readings[3],
            input_frequency: readings[4],
            battery_voltage: readings[5],
            temperature: readings[6],
            flags,
        })
    }
}

/// Nominal ratings of the UPS
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsRating {
    /// Rated voltage (V)
    pub voltage: f32,
    /// Rated current (A)
    pub current: f32,
    /// Nominal battery voltage (V)
    pub battery_voltage: f32,
    /// Rated frequency (Hz)
    pub frequency: f32,
}

impl FromStr for UpsRating {
    type Err = UpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = strip_header(s).split_whitespace().collect();
        if fields.len() < RATING_FIELDS {
            return Err(UpsError::MalformedResponse(format!(
                "expected {} rating fields, got {}: '{}'",
                RATING_FIELDS,
                fields.len(),
                s
            )));
        }

        let values = parse_readings(&fields[..RATING_FIELDS])?;
        Ok(Self {
            voltage: values[0],
            current: values[1],
            battery_voltage: values[2],
            frequency: values[3],
        })
    }
}

// The descriptor length byte and reply markers ('#') can survive filtering
// ahead of the first reading. A length byte of '0'..='8' (replies of 23 to 27
// UTF-16 units) is indistinguishable from a reading and is not stripped.
// Full status lines are longer than that; short rating lines are not.
fn strip_header(s: &str) -> &str {
    s.trim_start_matches(|c: char| !c.is_ascii_digit())
}

fn parse_readings(fields: &[&str]) -> Result<Vec<f32>, UpsError> {
    fields
        .iter()
        .map(|f| {
            f.parse::<f32>().map_err(|_| {
                UpsError::MalformedResponse(format!("invalid numeric reading '{}'", f))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_with_flags() {
        let status: UpsStatus = "228.0 225.0 229.5 014 50.0 27.3 25.0 10001001"
            .parse()
            .unwrap();
        assert_eq!(status.input_voltage, 228.0);
        assert_eq!(status.input_fault_voltage, 225.0);
        assert_eq!(status.output_voltage, 229.5);
        assert_eq!(status.output_current_percent, 14.0);
        assert_eq!(status.input_frequency, 50.0);
        assert_eq!(status.battery_voltage, 27.3);
        assert_eq!(status.temperature, 25.0);

        let flags = status.flags.unwrap();
        assert!(flags.utility_fail);
        assert!(!flags.battery_low);
        assert!(flags.standby);
        assert!(flags.beeper_on);
        assert!(!flags.test_in_progress);
    }

    #[test]
    fn test_parse_status_without_flags() {
        let status: UpsStatus = "230.1 230.1 230.1 000 49.9 13.6 30.0".parse().unwrap();
        assert_eq!(status.battery_voltage, 13.6);
        assert!(status.flags.is_none());
    }

    #[test]
    fn test_parse_status_skips_header_noise() {
        let status: UpsStatus = "^228.0 228.0 228.0 014 50.0 27.3 25.0".parse().unwrap();
        assert_eq!(status.input_voltage, 228.0);
    }

    #[test]
    fn test_parse_status_too_short() {
        let err = "228.0 228.0".parse::<UpsStatus>().unwrap_err();
        assert!(matches!(err, UpsError::MalformedResponse(_)));
    }

    #[test]
    fn test_parse_status_bad_reading() {
        assert!("228.0 x 228.0 014 50.0 27.3 25.0".parse::<UpsStatus>().is_err());
    }

    #[test]
    fn test_parse_flags_wrong_length() {
        assert!("0101".parse::<StatusFlags>().is_err());
        assert!("0101010a".parse::<StatusFlags>().is_err());
    }

    #[test]
    fn test_parse_rating() {
        let rating: UpsRating = "#230.0 004 12.00 50.0".parse().unwrap();
        assert_eq!(rating.voltage, 230.0);
        assert_eq!(rating.current, 4.0);
        assert_eq!(rating.battery_voltage, 12.0);
        assert_eq!(rating.frequency, 50.0);
    }

    #[test]
    fn test_parse_rating_too_short() {
        assert!("#230.0 004".parse::<UpsRating>().is_err());
    }
}
