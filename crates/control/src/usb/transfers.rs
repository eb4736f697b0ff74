//! USB transfer execution
//!
//! Executes descriptor control transfers with rusb and maps rusb errors to
//! protocol errors.

use protocol::{ControlRequest, UsbError};
use rusb::{Context, DeviceHandle};
use std::time::Duration;
use tracing::{debug, warn};

/// No timeout; libusb blocks until the device answers
pub const NO_TIMEOUT: Duration = Duration::ZERO;

/// Execute an IN control transfer into `buf`
///
/// Reads at most `min(request.length, buf.len())` bytes and returns the
/// number the device actually sent.
pub fn read_control(
    handle: &DeviceHandle<Context>,
    request: &ControlRequest,
    buf: &mut [u8],
    timeout: Duration,
) -> Result<usize, UsbError> {
    if !request.is_in() {
        return Err(UsbError::InvalidParam);
    }

    debug!(
        "Control transfer: request_type={:#x}, request={:#x}, descriptor={}, index={:#x}, length={}",
        request.request_type,
        request.request,
        request.descriptor_index(),
        request.index,
        request.length
    );

    let len = buf.len().min(usize::from(request.length));
    match handle.read_control(
        request.request_type,
        request.request,
        request.value,
        request.index,
        &mut buf[..len],
        timeout,
    ) {
        Ok(read) => {
            debug!("Control transfer succeeded: {} bytes", read);
            Ok(read)
        }
        Err(e) => {
            let error = map_rusb_error(e);
            warn!("Control transfer failed: {:?}", error);
            Err(error)
        }
    }
}

/// Map rusb::Error to protocol::UsbError
pub fn map_rusb_error(err: rusb::Error) -> UsbError {
    match err {
        rusb::Error::Timeout => UsbError::Timeout,
        rusb::Error::Pipe => UsbError::Pipe,
        rusb::Error::NoDevice => UsbError::NoDevice,
        rusb::Error::NotFound => UsbError::NotFound,
        rusb::Error::Busy => UsbError::Busy,
        rusb::Error::Overflow => UsbError::Overflow,
        rusb::Error::Io => UsbError::Io,
        rusb::Error::InvalidParam => UsbError::InvalidParam,
        rusb::Error::Access => UsbError::Access,
        _ => UsbError::Other {
            message: err.to_string(),
        },
    }
}
