//! Protocol library for ups-control
//!
//! This crate describes the string-descriptor protocol spoken by
//! Megatec-style USB UPS units. It is free of I/O: it knows which control
//! request carries each operation, how to decode the reply bytes, how the
//! self-test duration is encoded, and how to read status and rating replies.
//!
//! # Example
//!
//! ```
//! use protocol::{Operation, Reply, decode_reply};
//!
//! let request = Operation::Status.descriptor().unwrap().request();
//! assert_eq!(request.value, 0x0303);
//!
//! let reply = decode_reply(Ok(&b"(230.0 \"ok\""[..])).unwrap();
//! assert_eq!(reply, Reply::Text("230.0 ok".to_string()));
//! ```

pub mod descriptor;
pub mod duration;
pub mod error;
pub mod operations;
pub mod status;
pub mod types;

pub use descriptor::{decode_reply, filter_printable, is_reply_char};
pub use duration::{MAX_TEST_MINUTES, MIN_TEST_MINUTES, encode_minutes};
pub use error::{Result, UpsError};
pub use operations::{Operation, OperationDescriptor};
pub use status::{StatusFlags, UpsRating, UpsStatus};
pub use types::{
    ControlRequest, DESCRIPTOR_TYPE_STRING, REQ_NO_RET_MAX, RESPONSE_CAPACITY, Reply, UsbError,
};
