//! USB device enumeration

use super::transfers::map_rusb_error;
use protocol::UpsError;
use rusb::{Context, UsbContext};
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Identity of an attached USB device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UsbDeviceSummary {
    pub bus_number: u8,
    pub device_address: u8,
    pub vendor_id: u16,
    pub product_id: u16,
}

impl UsbDeviceSummary {
    pub fn matches(&self, vendor_id: u16, product_id: u16) -> bool {
        self.vendor_id == vendor_id && self.product_id == product_id
    }
}

impl fmt::Display for UsbDeviceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Bus {:03} Device {:03}: ID {:04x}:{:04x}",
            self.bus_number, self.device_address, self.vendor_id, self.product_id
        )
    }
}

/// List every USB device visible to libusb
pub fn list_devices() -> Result<Vec<UsbDeviceSummary>, UpsError> {
    let context = Context::new().map_err(|e| UpsError::ContextInitFailed(map_rusb_error(e)))?;
    let devices = context
        .devices()
        .map_err(|e| UpsError::Transport(map_rusb_error(e)))?;

    let mut summaries = Vec::with_capacity(devices.len());
    for device in devices.iter() {
        let descriptor = match device.device_descriptor() {
            Ok(d) => d,
            Err(e) => {
                debug!(
                    "Skipping device {:03}/{:03}: {}",
                    device.bus_number(),
                    device.address(),
                    e
                );
                continue;
            }
        };

        summaries.push(UsbDeviceSummary {
            bus_number: device.bus_number(),
            device_address: device.address(),
            vendor_id: descriptor.vendor_id(),
            product_id: descriptor.product_id(),
        });
    }

    Ok(summaries)
}
