//! Shared utilities for integration tests.

// Items in this shared module may not be used by all test binaries that import it.
#![allow(
    dead_code,
    reason = "shared test utilities are not used by all test binaries"
)]

use std::{future::Future, time::Duration};

use segwire::{Connection, ConnectionBuilder};
use segwire_testing::{PeerStream, TestPeer};

pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Upper bound on any single step so a broken connection fails the test
/// instead of hanging it.
pub const STEP_TIMEOUT: Duration = Duration::from_secs(5);

/// Await `future`, failing after [`STEP_TIMEOUT`].
pub async fn within<F: Future>(future: F) -> TestResult<F::Output> {
    Ok(tokio::time::timeout(STEP_TIMEOUT, future).await?)
}

/// Open a connection to a fresh loopback peer and accept it.
pub async fn connected_pair(builder: ConnectionBuilder) -> TestResult<(Connection, PeerStream)> {
    let peer = TestPeer::bind().await?;
    let address = peer.address();
    let (connection, stream) = tokio::join!(builder.connect(&address), peer.accept());
    Ok((connection?, stream?))
}
