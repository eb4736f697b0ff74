//! UPS device session
//!
//! A `UsbSession` owns the libusb context and the open device handle. The
//! handle is declared first so it is dropped before the context.

use super::transfers::{self, NO_TIMEOUT, map_rusb_error};
use common::ControlTransport;
use protocol::{ControlRequest, UpsError, UsbError};
use rusb::{Context, DeviceHandle, UsbContext};
use std::time::Duration;
use tracing::{debug, info, warn};

/// An open connection to one UPS
pub struct UsbSession {
    handle: DeviceHandle<Context>,
    _context: Context,
    vendor_id: u16,
    product_id: u16,
    timeout: Duration,
}

impl UsbSession {
    /// Initialize libusb and open the device matching `vendor_id:product_id`
    ///
    /// Fails with `DeviceNotFound` when no such device is attached or the
    /// process lacks permission to open it. Nothing stays open on failure.
    pub fn open(vendor_id: u16, product_id: u16) -> Result<Self, UpsError> {
        let context = Context::new().map_err(|e| {
            warn!("Failed to initialize libusb: {}", e);
            UpsError::ContextInitFailed(map_rusb_error(e))
        })?;

        let handle = context
            .open_device_with_vid_pid(vendor_id, product_id)
            .ok_or_else(|| {
                warn!(
                    "No accessible UPS at {:04x}:{:04x}",
                    vendor_id, product_id
                );
                UpsError::DeviceNotFound {
                    vendor_id,
                    product_id,
                }
            })?;

        info!("Opened UPS {:04x}:{:04x}", vendor_id, product_id);

        Ok(Self {
            handle,
            _context: context,
            vendor_id,
            product_id,
            timeout: NO_TIMEOUT,
        })
    }

    /// Set the per-transfer timeout (zero waits forever)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn vendor_id(&self) -> u16 {
        self.vendor_id
    }

    pub fn product_id(&self) -> u16 {
        self.product_id
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Close the device and tear down the USB context
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for UsbSession {
    fn drop(&mut self) {
        debug!("Closed UPS {:04x}:{:04x}", self.vendor_id, self.product_id);
    }
}

impl ControlTransport for UsbSession {
    fn read_control(
        &mut self,
        request: &ControlRequest,
        buf: &mut [u8],
    ) -> Result<usize, UsbError> {
        transfers::read_control(&self.handle, request, buf, self.timeout)
    }
}

impl std::fmt::Debug for UsbSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsbSession")
            .field("vendor_id", &format_args!("{:04x}", self.vendor_id))
            .field("product_id", &format_args!("{:04x}", self.product_id))
            .field("timeout", &self.timeout)
            .finish()
    }
}
