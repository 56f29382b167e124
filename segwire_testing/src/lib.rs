//! Test support for `segwire`.
//!
//! - [`fixtures`] hand-assembles wire bytes independently of
//!   [`FrameBuilder`](segwire::FrameBuilder), so malformed frames can be
//!   expressed too.
//! - [`peer`] runs a loopback TCP peer that a test scripts byte by byte.
//! - [`metrics`] captures recorded metrics for assertions.
//!
//! ```rust
//! use segwire::reassembly::Reassembler;
//! use segwire_testing::word_frame;
//!
//! let wire = word_frame(&[2]);
//! let frames = Reassembler::default().feed(&wire).expect("valid frame");
//! assert_eq!(frames[0].len(), 24);
//! ```

pub mod fixtures;
pub mod metrics;
pub mod peer;

pub use fixtures::{REFERENCE_FRAME, header_bytes, segment_frame, word_frame};
pub use metrics::{CapturedMetrics, MetricsSnapshot, capture_metrics};
pub use peer::{PeerStream, TestPeer};
