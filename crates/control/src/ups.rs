//! UPS operation set
//!
//! `Ups` maps each named operation onto its descriptor request and decodes
//! the reply. It works over any `ControlTransport`; `Ups<UsbSession>` is the
//! real device.

use crate::usb::UsbSession;
use common::ControlTransport;
use protocol::{Operation, Reply, Result, UpsError, UpsRating, UpsStatus, encode_minutes};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Pause between the two status requests
///
/// The device returns a stale reading for the first request; the second one,
/// issued after this delay, reflects the current state.
pub const STATUS_SETTLE_DELAY: Duration = Duration::from_secs(1);

/// A UPS reachable through a control transport
#[derive(Debug)]
pub struct Ups<T: ControlTransport> {
    transport: T,
    settle_delay: Duration,
}

impl Ups<UsbSession> {
    /// Open the UPS at `vendor_id:product_id`
    pub fn open(vendor_id: u16, product_id: u16) -> Result<Self> {
        Ok(Self::new(UsbSession::open(vendor_id, product_id)?))
    }

    /// Close the device and release the USB context
    pub fn close(self) {
        self.transport.close();
    }
}

impl<T: ControlTransport> Ups<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            settle_delay: STATUS_SETTLE_DELAY,
        }
    }

    /// Override the delay `status` waits between its two requests
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Run one operation from the table
    ///
    /// Invalid parameters are rejected before any transfer is issued. Every
    /// transfer but the last is discarded whatever its outcome; the result of
    /// the last one is returned as is.
    pub fn execute(&mut self, operation: Operation) -> Result<Reply> {
        let descriptor = operation.descriptor()?;
        debug!("Executing {}", operation);

        for _ in 1..operation.transfer_count() {
            match self.transport.send_and_decode(descriptor) {
                Ok(reply) => debug!("Discarding unsettled reply: {:?}", reply),
                Err(e) => debug!("Ignoring unsettled request failure: {}", e),
            }
            // Blocking wait; the calling thread is suspended.
            thread::sleep(self.settle_delay);
        }

        self.transport.send_and_decode(descriptor)
    }

    /// Read the UPS model name
    pub fn name(&mut self) -> Result<Reply> {
        self.execute(Operation::Name)
    }

    /// Read the status line, waiting `STATUS_SETTLE_DELAY` for it to settle
    ///
    /// Issues two requests and returns the second reply. The outcome of the
    /// first request, error or not, is ignored.
    pub fn status(&mut self) -> Result<Reply> {
        self.execute(Operation::Status)
    }

    /// Read the status line with a single request
    pub fn status_no_ack(&mut self) -> Result<Reply> {
        self.execute(Operation::StatusNoAck)
    }

    /// Start the 10 second self-test
    pub fn run_test(&mut self) -> Result<Reply> {
        self.execute(Operation::Test)
    }

    pub fn run_test_until_battery_low(&mut self) -> Result<Reply> {
        self.execute(Operation::TestUntilBatteryLow)
    }

    /// Start a self-test lasting `minutes` (1-99)
    pub fn run_test_for_minutes(&mut self, minutes: u32) -> Result<Reply> {
        let encoded = encode_minutes(minutes)?;
        info!("Starting {} minute self-test (length {})", minutes, encoded);
        self.execute(Operation::TestForMinutes(minutes))
    }

    pub fn toggle_beep(&mut self) -> Result<Reply> {
        self.execute(Operation::ToggleBeep)
    }

    /// Schedule a UPS shutdown
    pub fn shutdown(&mut self) -> Result<Reply> {
        info!("Requesting UPS shutdown");
        self.execute(Operation::Shutdown)
    }

    pub fn abort_test(&mut self) -> Result<Reply> {
        self.execute(Operation::AbortTest)
    }

    /// Read the nominal rating line
    pub fn rating(&mut self) -> Result<Reply> {
        self.execute(Operation::Rating)
    }

    /// Read and parse the settled status
    pub fn status_report(&mut self) -> Result<UpsStatus> {
        parse_reply(self.status()?)
    }

    /// Read and parse the status with a single request
    pub fn status_report_no_ack(&mut self) -> Result<UpsStatus> {
        parse_reply(self.status_no_ack()?)
    }

    /// Read and parse the rating
    pub fn rating_report(&mut self) -> Result<UpsRating> {
        parse_reply(self.rating()?)
    }
}

fn parse_reply<R>(reply: Reply) -> Result<R>
where
    R: std::str::FromStr<Err = UpsError>,
{
    match reply {
        Reply::Text(text) => text.parse(),
        Reply::Acknowledged => Err(UpsError::MalformedResponse(
            "device returned no data".to_string(),
        )),
    }
}
