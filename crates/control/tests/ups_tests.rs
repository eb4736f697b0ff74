//! Operation set tests over a scripted transport
//!
//! Run with: `cargo test -p control --test ups_tests`

use common::test_utils::{
    SAMPLE_NAME, SAMPLE_RATING, SAMPLE_STATUS, ScriptedTransport, string_descriptor_bytes,
    string_descriptor_bytes_verbatim,
};
use control::Ups;
use protocol::{ControlRequest, Operation, Reply, UpsError, UsbError};
use std::time::{Duration, Instant};

type TestUps = Ups<ScriptedTransport>;

fn ups_with(transport: ScriptedTransport) -> TestUps {
    Ups::new(transport).with_settle_delay(Duration::ZERO)
}

fn request(index: u8, length: u16) -> ControlRequest {
    ControlRequest::string_descriptor(index, length)
}

// ============================================================================
// Request Table Tests
// ============================================================================

#[test]
fn test_each_operation_issues_its_request() {
    let cases: [(fn(&mut TestUps) -> protocol::Result<Reply>, u8, u16); 8] = [
        (TestUps::name, 2, 256),
        (TestUps::status_no_ack, 3, 256),
        (TestUps::run_test, 4, 256),
        (TestUps::run_test_until_battery_low, 5, 256),
        (TestUps::toggle_beep, 7, 256),
        (TestUps::shutdown, 105, 2460),
        (TestUps::abort_test, 11, 256),
        (TestUps::rating, 13, 256),
    ];

    for (op, index, length) in cases {
        let mut ups = ups_with(ScriptedTransport::new().with_reply(&[0x02]));
        op(&mut ups).expect("operation failed");
        assert_eq!(ups.transport().requests(), &[request(index, length)]);
    }
}

#[test]
fn test_timed_test_uses_encoded_length() {
    let mut ups = ups_with(ScriptedTransport::new().with_reply(&[]));
    assert_eq!(ups.run_test_for_minutes(10).unwrap(), Reply::Acknowledged);
    assert_eq!(ups.transport().requests(), &[request(6, 116)]);

    let mut ups = ups_with(ScriptedTransport::new().with_reply(&[]));
    ups.run_test_for_minutes(99).unwrap();
    assert_eq!(ups.transport().requests(), &[request(6, 253)]);
}

#[test]
fn test_timed_test_out_of_range_issues_nothing() {
    let mut ups = ups_with(ScriptedTransport::new().with_reply(&[]));

    assert_eq!(
        ups.run_test_for_minutes(0),
        Err(UpsError::OutOfRange { minutes: 0 })
    );
    assert_eq!(
        ups.execute(Operation::TestForMinutes(100)),
        Err(UpsError::OutOfRange { minutes: 100 })
    );
    assert!(ups.transport().requests().is_empty());
    assert_eq!(ups.transport().remaining(), 1);
}

// ============================================================================
// Status Tests
// ============================================================================

#[test]
fn test_status_returns_second_reply() {
    let transport = ScriptedTransport::new()
        .with_reply(&string_descriptor_bytes("(000.0 000.0 000.0 000 00.0 00.0 00.0"))
        .with_reply(&string_descriptor_bytes(SAMPLE_STATUS));
    let mut ups = ups_with(transport);

    let reply = ups.status().unwrap();

    assert_eq!(
        reply,
        Reply::Text("228.0 225.0 229.5 014 50.0 27.3 25.0 00001001".to_string())
    );
    assert_eq!(
        ups.transport().requests(),
        &[request(3, 256), request(3, 256)]
    );
}

#[test]
fn test_status_waits_between_requests() {
    let transport = ScriptedTransport::new()
        .with_reply(b"first")
        .with_reply(b"second");
    let mut ups = Ups::new(transport).with_settle_delay(Duration::from_millis(50));

    let started = Instant::now();
    assert_eq!(ups.status().unwrap(), Reply::Text("second".to_string()));
    assert!(started.elapsed() >= Duration::from_millis(50));
}

#[test]
fn test_status_first_failure_is_ignored() {
    let transport = ScriptedTransport::new()
        .with_error(UsbError::Timeout)
        .with_reply(b"228.0 225.0");
    let mut ups = ups_with(transport);

    assert_eq!(ups.status(), Ok(Reply::Text("228.0 225.0".to_string())));
    assert_eq!(
        ups.transport().requests(),
        &[request(3, 256), request(3, 256)]
    );
}

#[test]
fn test_status_second_failure_surfaces() {
    let transport = ScriptedTransport::new()
        .with_reply(b"stale")
        .with_error(UsbError::Pipe);
    let mut ups = ups_with(transport);

    assert_eq!(ups.status(), Err(UpsError::Transport(UsbError::Pipe)));
    assert_eq!(ups.transport().requests().len(), 2);
}

#[test]
fn test_status_waits_after_first_failure() {
    let transport = ScriptedTransport::new()
        .with_error(UsbError::Timeout)
        .with_reply(b"settled");
    let mut ups = Ups::new(transport).with_settle_delay(Duration::from_millis(50));

    let started = Instant::now();
    assert_eq!(ups.status().unwrap(), Reply::Text("settled".to_string()));
    assert!(started.elapsed() >= Duration::from_millis(50));
}

#[test]
fn test_status_no_ack_single_request() {
    let mut ups = ups_with(
        ScriptedTransport::new().with_reply(&string_descriptor_bytes(SAMPLE_STATUS)),
    );
    let status = ups.status_report_no_ack().unwrap();

    assert_eq!(status.input_voltage, 228.0);
    assert_eq!(status.temperature, 25.0);
    assert_eq!(ups.transport().requests().len(), 1);
}

#[test]
fn test_status_report_parses_settled_reply() {
    let transport = ScriptedTransport::new()
        .with_reply(&[0x02])
        .with_reply(&string_descriptor_bytes(SAMPLE_STATUS));
    let mut ups = ups_with(transport);

    let status = ups.status_report().unwrap();
    assert_eq!(status.battery_voltage, 27.3);
    let flags = status.flags.expect("flags present");
    assert!(flags.standby);
    assert!(flags.beeper_on);
    assert!(!flags.utility_fail);
}

#[test]
fn test_status_report_with_device_header() {
    // 46 units, length byte 94 ('^') reaches the parser
    let transport = ScriptedTransport::new()
        .with_reply(&string_descriptor_bytes_verbatim(SAMPLE_STATUS))
        .with_reply(&string_descriptor_bytes_verbatim(SAMPLE_STATUS));
    let mut ups = ups_with(transport);

    let status = ups.status_report().unwrap();
    assert_eq!(status.input_voltage, 228.0);
    assert_eq!(status.temperature, 25.0);
    assert!(status.flags.expect("flags present").beeper_on);
}

#[test]
fn test_rating_report_with_device_header() {
    // 21 units, length byte 44 (',')
    let mut ups = ups_with(
        ScriptedTransport::new().with_reply(&string_descriptor_bytes_verbatim(SAMPLE_RATING)),
    );
    let rating = ups.rating_report().unwrap();
    assert_eq!(rating.voltage, 230.0);
    assert_eq!(rating.battery_voltage, 12.0);
}

#[test]
fn test_name_keeps_device_header() {
    let mut ups = ups_with(
        ScriptedTransport::new().with_reply(&string_descriptor_bytes_verbatim(SAMPLE_NAME)),
    );
    assert_eq!(
        ups.name().unwrap(),
        Reply::Text(format!("&{}", SAMPLE_NAME))
    );
}

#[test]
fn test_status_report_without_data() {
    let transport = ScriptedTransport::new().with_reply(&[]).with_reply(&[]);
    let mut ups = ups_with(transport);

    assert!(matches!(
        ups.status_report(),
        Err(UpsError::MalformedResponse(_))
    ));
}

// ============================================================================
// Reply Decoding Tests
// ============================================================================

#[test]
fn test_name_reply() {
    let mut ups = ups_with(
        ScriptedTransport::new().with_reply(&string_descriptor_bytes(SAMPLE_NAME)),
    );
    assert_eq!(ups.name().unwrap(), Reply::Text(SAMPLE_NAME.to_string()));
}

#[test]
fn test_rating_report() {
    let mut ups = ups_with(
        ScriptedTransport::new().with_reply(&string_descriptor_bytes(SAMPLE_RATING)),
    );
    let rating = ups.rating_report().unwrap();
    assert_eq!(rating.voltage, 230.0);
    assert_eq!(rating.frequency, 50.0);
}

#[test]
fn test_shutdown_long_reply_is_capped() {
    let long = "S".repeat(1200);
    let mut ups = ups_with(ScriptedTransport::new().with_reply(&string_descriptor_bytes(&long)));

    let text = ups.shutdown().unwrap().into_text().unwrap();
    assert_eq!(text.len(), protocol::RESPONSE_CAPACITY - 1);
}

#[test]
fn test_transport_error_is_not_retried() {
    let transport = ScriptedTransport::new()
        .with_error(UsbError::NoDevice)
        .with_reply(b"would succeed");
    let mut ups = ups_with(transport);

    assert_eq!(ups.toggle_beep(), Err(UpsError::Transport(UsbError::NoDevice)));
    assert_eq!(ups.transport().remaining(), 1);
}

#[test]
fn test_repeated_requests_decode_independently() {
    let transport = ScriptedTransport::new()
        .with_reply(&string_descriptor_bytes("(UPS A"))
        .with_reply(&string_descriptor_bytes("\"UPS B\""));
    let mut ups = ups_with(transport);

    let first = ups.name().unwrap();
    let second = ups.name().unwrap();
    assert_eq!(first, Reply::Text("UPS A".to_string()));
    assert_eq!(second, Reply::Text("UPS B".to_string()));
}
