//! Span and timing tests for connection operations.
//!
//! `tracing-test` only captures events emitted inside the test's own span, so
//! each test drives operations from the test task. Timing is enabled where a
//! test needs an event inside an operation span, because span names only show
//! up in output as the context prefix of an event.

use rstest::rstest;
use segwire_testing::{PeerStream, REFERENCE_FRAME, TestPeer};
use tracing::Level;
use tracing_test::traced_test;

use super::{Connection, TracingConfig};

async fn open_with(config: TracingConfig) -> (Connection, PeerStream, String) {
    let peer = TestPeer::bind().await.expect("bind peer");
    let address = peer.address();
    let builder = Connection::builder().tracing_config(config);
    let (connection, stream) = tokio::join!(builder.connect(&address), peer.accept());
    (
        connection.expect("connect"),
        stream.expect("accept"),
        address,
    )
}

fn find_line(lines: &[&str], needles: &[&str]) -> Result<(), String> {
    lines
        .iter()
        .find(|line| needles.iter().all(|needle| line.contains(needle)))
        .map(|_| ())
        .ok_or_else(|| format!("no line containing {needles:?} in:\n{}", lines.join("\n")))
}

#[rstest]
#[traced_test]
#[tokio::test]
async fn open_span_carries_peer_address() {
    let (_connection, _peer, address) =
        open_with(TracingConfig::default().with_open_timing(true)).await;

    logs_assert(|lines: &[&str]| {
        find_line(lines, &["connection.open", address.as_str(), "operation.timing"])
    });
}

#[rstest]
#[traced_test]
#[tokio::test]
async fn send_span_records_frame_size() {
    let (connection, _peer, _) = open_with(TracingConfig::default().with_send_timing(true)).await;
    connection.send(REFERENCE_FRAME.to_vec()).expect("send");

    logs_assert(|lines: &[&str]| {
        find_line(lines, &["connection.send", "frame.bytes=24", "operation.timing"])
    });
}

#[rstest]
#[traced_test]
#[tokio::test]
async fn receive_span_records_frame_size_and_result() {
    let (connection, mut peer, _) =
        open_with(TracingConfig::default().with_receive_timing(true)).await;

    let (frame, written) = tokio::join!(connection.receive(), peer.write(&REFERENCE_FRAME));
    written.expect("write frame");
    frame.expect("receive frame");

    logs_assert(|lines: &[&str]| {
        find_line(
            lines,
            &["connection.receive", "frame.bytes=24", "result=", "operation.timing"],
        )
    });
}

#[rstest]
#[traced_test]
#[tokio::test]
async fn close_span_wraps_the_end_event() {
    let (connection, _peer, _) = open_with(TracingConfig::default()).await;
    connection.close();

    logs_assert(|lines: &[&str]| find_line(lines, &["connection.close", "connection ended"]));
}

#[rstest]
#[traced_test]
#[tokio::test]
async fn timing_is_off_by_default() {
    let (connection, _peer, _) = open_with(TracingConfig::default()).await;
    connection.send(REFERENCE_FRAME.to_vec()).expect("send");
    connection.close();

    assert!(!logs_contain("operation.timing"));
}

#[test]
fn all_levels_and_timing_apply_to_every_operation() {
    let config = TracingConfig::default()
        .with_all_levels(Level::TRACE)
        .with_all_timing(true);
    assert_eq!(config.open_level, Level::TRACE);
    assert_eq!(config.close_level, Level::TRACE);
    assert!(config.open_timing && config.send_timing);
    assert!(config.receive_timing && config.close_timing);
}
