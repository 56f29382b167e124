//! Tracing configuration for connection operations.

use tracing::Level;

/// Controls span levels and per-operation timing for a [`Connection`].
///
/// `open` and `close` spans default to `INFO`; `send` and `receive` run once
/// per frame and default to `DEBUG`. Timing is off for every operation. When
/// timing is enabled, an event carrying `elapsed_us` is emitted as the
/// operation completes.
///
/// # Examples
///
/// ```
/// use segwire::connection::TracingConfig;
/// use tracing::Level;
///
/// let config = TracingConfig::default()
///     .with_receive_level(Level::TRACE)
///     .with_receive_timing(true);
/// let _ = config;
/// ```
///
/// [`Connection`]: super::Connection
#[expect(
    clippy::struct_excessive_bools,
    reason = "one independent timing flag per operation"
)]
#[derive(Clone, Debug)]
pub struct TracingConfig {
    pub(crate) open_level: Level,
    pub(crate) send_level: Level,
    pub(crate) receive_level: Level,
    pub(crate) close_level: Level,
    pub(crate) open_timing: bool,
    pub(crate) send_timing: bool,
    pub(crate) receive_timing: bool,
    pub(crate) close_timing: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            open_level: Level::INFO,
            send_level: Level::DEBUG,
            receive_level: Level::DEBUG,
            close_level: Level::INFO,
            open_timing: false,
            send_timing: false,
            receive_timing: false,
            close_timing: false,
        }
    }
}

impl TracingConfig {
    /// Set the span level for opening a connection.
    #[must_use]
    pub fn with_open_level(mut self, level: Level) -> Self {
        self.open_level = level;
        self
    }

    /// Time how long opening a connection takes.
    #[must_use]
    pub fn with_open_timing(mut self, enabled: bool) -> Self {
        self.open_timing = enabled;
        self
    }

    /// Set the span level for `send`.
    #[must_use]
    pub fn with_send_level(mut self, level: Level) -> Self {
        self.send_level = level;
        self
    }

    /// Time each `send`.
    #[must_use]
    pub fn with_send_timing(mut self, enabled: bool) -> Self {
        self.send_timing = enabled;
        self
    }

    /// Set the span level for `receive`.
    #[must_use]
    pub fn with_receive_level(mut self, level: Level) -> Self {
        self.receive_level = level;
        self
    }

    /// Time each `receive`, including the wait for a frame.
    #[must_use]
    pub fn with_receive_timing(mut self, enabled: bool) -> Self {
        self.receive_timing = enabled;
        self
    }

    /// Set the span level for `close`.
    #[must_use]
    pub fn with_close_level(mut self, level: Level) -> Self {
        self.close_level = level;
        self
    }

    /// Time `close`.
    #[must_use]
    pub fn with_close_timing(mut self, enabled: bool) -> Self {
        self.close_timing = enabled;
        self
    }

    /// Apply `level` to every operation.
    #[must_use]
    pub fn with_all_levels(mut self, level: Level) -> Self {
        self.open_level = level;
        self.send_level = level;
        self.receive_level = level;
        self.close_level = level;
        self
    }

    /// Enable or disable timing for every operation.
    #[must_use]
    pub fn with_all_timing(mut self, enabled: bool) -> Self {
        self.open_timing = enabled;
        self.send_timing = enabled;
        self.receive_timing = enabled;
        self.close_timing = enabled;
        self
    }
}
