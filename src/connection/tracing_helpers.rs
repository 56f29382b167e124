//! Span constructors with a runtime-selected level.

use std::time::Instant;

use tracing::{Level, Span};

use super::tracing_config::TracingConfig;

/// Build a span whose level is only known at runtime.
///
/// Each arm expands a level-specific span macro so the callsite metadata stays
/// static.
macro_rules! dynamic_span {
    ($level:expr, $name:expr $(, $($field:tt)*)?) => {
        match $level {
            Level::ERROR => tracing::error_span!($name $(, $($field)*)?),
            Level::WARN  => tracing::warn_span!($name $(, $($field)*)?),
            Level::INFO  => tracing::info_span!($name $(, $($field)*)?),
            Level::DEBUG => tracing::debug_span!($name $(, $($field)*)?),
            Level::TRACE => tracing::trace_span!($name $(, $($field)*)?),
        }
    };
}

#[expect(
    clippy::cognitive_complexity,
    reason = "five match arms from dynamic_span!"
)]
pub(crate) fn open_span(config: &TracingConfig, address: &str) -> Span {
    dynamic_span!(
        config.open_level,
        "connection.open",
        peer.addr = address,
        result = tracing::field::Empty
    )
}

#[expect(
    clippy::cognitive_complexity,
    reason = "five match arms from dynamic_span!"
)]
pub(crate) fn send_span(config: &TracingConfig, frame_bytes: usize) -> Span {
    dynamic_span!(config.send_level, "connection.send", frame.bytes = frame_bytes)
}

/// `frame.bytes` and `result` are recorded once the receive settles.
#[expect(
    clippy::cognitive_complexity,
    reason = "five match arms from dynamic_span!"
)]
pub(crate) fn receive_span(config: &TracingConfig) -> Span {
    dynamic_span!(
        config.receive_level,
        "connection.receive",
        frame.bytes = tracing::field::Empty,
        result = tracing::field::Empty
    )
}

#[expect(
    clippy::cognitive_complexity,
    reason = "five match arms from dynamic_span!"
)]
pub(crate) fn close_span(config: &TracingConfig) -> Span {
    dynamic_span!(config.close_level, "connection.close")
}

/// Start a timer when timing is enabled for an operation.
pub(crate) fn start_timer(enabled: bool) -> Option<Instant> { enabled.then(Instant::now) }

/// Emit `elapsed_us` at `DEBUG` if a timer was started.
pub(crate) fn emit_timing_event(start: Option<Instant>) {
    if let Some(start) = start {
        tracing::debug!(elapsed_us = start.elapsed().as_micros(), "operation.timing");
    }
}
