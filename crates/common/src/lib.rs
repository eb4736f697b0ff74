//! Common utilities for ups-control
//!
//! This crate provides functionality shared between the protocol layer and
//! the device session: the control transport abstraction, application error
//! handling, logging setup, and test utilities.

pub mod error;
pub mod logging;
pub mod test_utils;
pub mod transport;

pub use error::{Error, Result};
pub use logging::setup_logging;
pub use transport::ControlTransport;
