//! ups-control
//!
//! Host-side control of Megatec-style USB UPS units: open the device, run
//! named operations (status, self-tests, beeper, shutdown) and decode the
//! replies.
//!
//! ```no_run
//! use control::Ups;
//!
//! let mut ups = Ups::open(0x0001, 0x0000)?;
//! println!("{}", ups.name()?);
//! let status = ups.status_report()?;
//! println!("battery at {} V", status.battery_voltage);
//! ups.close();
//! # Ok::<(), protocol::UpsError>(())
//! ```

pub mod config;
pub mod ups;
pub mod usb;

pub use config::ControlConfig;
pub use ups::{STATUS_SETTLE_DELAY, Ups};
pub use usb::UsbSession;
