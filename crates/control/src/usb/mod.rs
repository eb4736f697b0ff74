//! USB subsystem
//!
//! Owns the libusb context and device handle for a UPS session, executes
//! descriptor control transfers, and enumerates attached devices.

pub mod device;
pub mod session;
pub mod transfers;

pub use device::{UsbDeviceSummary, list_devices};
pub use session::UsbSession;
pub use transfers::map_rusb_error;
