//! Socket options applied before a connection is established.

use std::{io, time::Duration};

use socket2::{SockRef, TcpKeepalive};
use tokio::net::TcpSocket;

/// Socket options for outbound connections.
///
/// `TCP_NODELAY` is enabled by default: RPC frames are small and latency
/// bound, and Nagle's algorithm would hold them back.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use segwire::connection::SocketOptions;
///
/// let options = SocketOptions::default().keepalive(Some(Duration::from_secs(30)));
/// assert_eq!(options.nodelay_value(), Some(true));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SocketOptions {
    nodelay: Option<bool>,
    keepalive: Option<Option<Duration>>,
    linger: Option<Option<Duration>>,
    send_buffer_size: Option<u32>,
    recv_buffer_size: Option<u32>,
}

impl Default for SocketOptions {
    fn default() -> Self {
        Self {
            nodelay: Some(true),
            keepalive: None,
            linger: None,
            send_buffer_size: None,
            recv_buffer_size: None,
        }
    }
}

impl SocketOptions {
    /// Configure `TCP_NODELAY`.
    #[must_use]
    pub fn nodelay(mut self, enabled: bool) -> Self {
        self.nodelay = Some(enabled);
        self
    }

    /// Configure TCP keepalive. `None` disables it explicitly.
    #[must_use]
    pub fn keepalive(mut self, idle: Option<Duration>) -> Self {
        self.keepalive = Some(idle);
        self
    }

    /// Configure `SO_LINGER`. `None` disables lingering explicitly.
    #[must_use]
    pub fn linger(mut self, duration: Option<Duration>) -> Self {
        self.linger = Some(duration);
        self
    }

    /// Configure the socket send buffer size.
    #[must_use]
    pub fn send_buffer_size(mut self, size: u32) -> Self {
        self.send_buffer_size = Some(size);
        self
    }

    /// Configure the socket receive buffer size.
    #[must_use]
    pub fn recv_buffer_size(mut self, size: u32) -> Self {
        self.recv_buffer_size = Some(size);
        self
    }

    /// Configured `TCP_NODELAY` value, if set.
    #[must_use]
    pub const fn nodelay_value(&self) -> Option<bool> { self.nodelay }

    pub(crate) fn apply(&self, socket: &TcpSocket) -> io::Result<()> {
        if let Some(enabled) = self.nodelay {
            socket.set_nodelay(enabled)?;
        }
        match self.keepalive {
            Some(Some(idle)) => {
                socket.set_keepalive(true)?;
                SockRef::from(socket).set_tcp_keepalive(&TcpKeepalive::new().with_time(idle))?;
            }
            Some(None) => socket.set_keepalive(false)?,
            None => {}
        }
        if let Some(linger) = self.linger {
            SockRef::from(socket).set_linger(linger)?;
        }
        if let Some(size) = self.send_buffer_size {
            socket.set_send_buffer_size(size)?;
        }
        if let Some(size) = self.recv_buffer_size {
            socket.set_recv_buffer_size(size)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rstest::rstest;
    use socket2::SockRef;
    use tokio::net::TcpSocket;

    use super::SocketOptions;

    #[rstest]
    #[case::lingering(Some(Duration::from_secs(3)))]
    #[case::reset_on_close(Some(Duration::ZERO))]
    #[case::disabled(None)]
    fn linger_is_applied_to_the_socket(#[case] linger: Option<Duration>) {
        let socket = TcpSocket::new_v4().expect("create socket");
        SocketOptions::default()
            .linger(linger)
            .apply(&socket)
            .expect("apply options");
        assert_eq!(SockRef::from(&socket).linger().expect("read SO_LINGER"), linger);
    }

    #[test]
    fn nodelay_is_on_by_default() {
        let socket = TcpSocket::new_v4().expect("create socket");
        SocketOptions::default().apply(&socket).expect("apply options");
        assert!(socket.nodelay().expect("read TCP_NODELAY"));
    }
}
