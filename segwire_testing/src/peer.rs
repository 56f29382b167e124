//! Loopback TCP peer driven step by step from a test.

use std::{io, net::SocketAddr, time::Duration};

use futures::StreamExt;
use segwire::{Frame, FrameLimits, SegmentFrameCodec};
use socket2::SockRef;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};
use tokio_util::codec::FramedRead;

/// Pause between chunks so each one tends to arrive in its own read.
const CHUNK_PAUSE: Duration = Duration::from_millis(2);

/// Listener bound to an ephemeral loopback port.
pub struct TestPeer {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl TestPeer {
    /// Bind to `127.0.0.1:0`.
    ///
    /// # Errors
    ///
    /// Returns any error from binding the listener.
    pub async fn bind() -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let local_addr = listener.local_addr()?;
        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// `host:port` string to pass to `Connection::open`.
    #[must_use]
    pub fn address(&self) -> String { self.local_addr.to_string() }

    /// Accept the next client.
    ///
    /// # Errors
    ///
    /// Returns any error from accepting the connection.
    pub async fn accept(&self) -> io::Result<PeerStream> {
        let (stream, _) = self.listener.accept().await?;
        Ok(PeerStream { stream })
    }
}

/// The server side of one accepted connection.
pub struct PeerStream {
    stream: TcpStream,
}

impl PeerStream {
    /// Write `bytes` in one call.
    ///
    /// # Errors
    ///
    /// Returns any socket write error.
    pub async fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.stream.write_all(bytes).await?;
        self.stream.flush().await
    }

    /// Write `bytes` split into chunks of at most `chunk_size` bytes, pausing
    /// between chunks.
    ///
    /// # Errors
    ///
    /// Returns any socket write error.
    pub async fn write_chunked(&mut self, bytes: &[u8], chunk_size: usize) -> io::Result<()> {
        for chunk in bytes.chunks(chunk_size.max(1)) {
            self.write(chunk).await?;
            tokio::time::sleep(CHUNK_PAUSE).await;
        }
        Ok(())
    }

    /// Read exactly `len` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`io::ErrorKind::UnexpectedEof`] if the client closes first.
    pub async fn read_exact(&mut self, len: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0; len];
        self.stream.read_exact(&mut buf).await?;
        Ok(buf)
    }

    /// Read until the client shuts down its write half.
    ///
    /// # Errors
    ///
    /// Returns any socket read error.
    pub async fn read_to_end(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.stream.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    /// Decode frames sent by the client until it shuts down its write half.
    ///
    /// # Errors
    ///
    /// Returns the first decoding error.
    pub async fn read_frames(self, limits: FrameLimits) -> io::Result<Vec<Frame>> {
        FramedRead::new(self.stream, SegmentFrameCodec::new(limits))
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .collect()
    }

    /// Close the write half so the client observes end of stream.
    ///
    /// # Errors
    ///
    /// Returns any socket error.
    pub async fn shutdown(&mut self) -> io::Result<()> { self.stream.shutdown().await }

    /// Drop the connection with a reset instead of a graceful shutdown.
    ///
    /// # Errors
    ///
    /// Returns any error from setting `SO_LINGER`.
    pub fn abort(self) -> io::Result<()> {
        SockRef::from(&self.stream).set_linger(Some(Duration::ZERO))
    }
}
