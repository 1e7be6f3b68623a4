use crate::core::ServerEndpoint;
use crate::error::Result;
use async_trait::async_trait;
use log::*;
use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadBuf};

/// A duplex byte stream to an ADB server that can be re-established.
///
/// Carries no protocol knowledge; framing lives in [`crate::adb::AdbSocket`].
pub trait Transport: Read + Write {
    /// Drop the current stream (if any) and connect again to the same endpoint.
    fn reconnect(&mut self) -> Result<()>;

    fn is_connected(&self) -> bool;

    /// Shut the stream down. Subsequent reads and writes fail.
    fn close(&mut self);
}

/// Asynchronous counterpart of [`Transport`].
#[async_trait]
pub trait AsyncTransport: AsyncRead + AsyncWrite + Unpin + Send {
    async fn reconnect(&mut self) -> Result<()>;

    fn is_connected(&self) -> bool;

    async fn close(&mut self);
}

/// Opens a fresh transport for each client operation.
pub trait Connector {
    type Transport: Transport;

    fn connect(&self) -> Result<Self::Transport>;
}

fn not_connected() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "transport is closed")
}

// =============================================================================
// Blocking TCP transport
// =============================================================================

pub struct TcpTransport {
    endpoint: ServerEndpoint,
    read_timeout: Option<Duration>,
    stream: Option<TcpStream>,
}

impl TcpTransport {
    /// Connect to the ADB server at `endpoint` with no read timeout.
    pub fn connect(endpoint: &ServerEndpoint) -> Result<Self> {
        Self::connect_with_timeout(endpoint, None)
    }

    pub fn connect_with_timeout(endpoint: &ServerEndpoint, read_timeout: Option<Duration>) -> Result<Self> {
        let mut transport = Self {
            endpoint: endpoint.clone(),
            read_timeout,
            stream: None,
        };
        transport.stream = Some(transport.open()?);
        Ok(transport)
    }

    pub fn endpoint(&self) -> &ServerEndpoint {
        &self.endpoint
    }

    fn open(&self) -> Result<TcpStream> {
        let address = self.endpoint.socket_addr()?;
        debug!("Connecting to ADB server at {}", address);

        let stream = TcpStream::connect(address)?;
        stream.set_nodelay(true)?;
        stream.set_read_timeout(self.read_timeout)?;
        debug!("Connection established");

        Ok(stream)
    }
}

impl Read for TcpTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.stream.as_mut() {
            Some(stream) => stream.read(buf),
            None => Err(not_connected()),
        }
    }
}

impl Write for TcpTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.stream.as_mut() {
            Some(stream) => stream.write(buf),
            None => Err(not_connected()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.stream.as_mut() {
            Some(stream) => stream.flush(),
            None => Ok(()),
        }
    }
}

impl Transport for TcpTransport {
    fn reconnect(&mut self) -> Result<()> {
        self.close();
        self.stream = Some(self.open()?);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            // The peer may already have closed its side.
            let _ = stream.shutdown(Shutdown::Both);
        }
    }
}

/// Connects [`TcpTransport`]s to a fixed endpoint.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    endpoint: ServerEndpoint,
    read_timeout: Option<Duration>,
}

impl TcpConnector {
    pub fn new(endpoint: ServerEndpoint) -> Self {
        Self {
            endpoint,
            read_timeout: None,
        }
    }

    pub fn with_read_timeout(mut self, read_timeout: Option<Duration>) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub fn endpoint(&self) -> &ServerEndpoint {
        &self.endpoint
    }
}

impl Connector for TcpConnector {
    type Transport = TcpTransport;

    fn connect(&self) -> Result<TcpTransport> {
        TcpTransport::connect_with_timeout(&self.endpoint, self.read_timeout)
    }
}

// =============================================================================
// Tokio TCP transport
// =============================================================================

pub struct TokioTcpTransport {
    endpoint: ServerEndpoint,
    stream: Option<tokio::net::TcpStream>,
}

impl TokioTcpTransport {
    pub async fn connect(endpoint: &ServerEndpoint) -> Result<Self> {
        let mut transport = Self {
            endpoint: endpoint.clone(),
            stream: None,
        };
        transport.stream = Some(transport.open().await?);
        Ok(transport)
    }

    pub fn endpoint(&self) -> &ServerEndpoint {
        &self.endpoint
    }

    async fn open(&self) -> Result<tokio::net::TcpStream> {
        let address = self.endpoint.socket_addr()?;
        debug!("Connecting to ADB server at {}", address);

        let stream = tokio::net::TcpStream::connect(address).await?;
        stream.set_nodelay(true)?;
        Ok(stream)
    }
}

impl AsyncRead for TokioTcpTransport {
    fn poll_read(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        match self.get_mut().stream.as_mut() {
            Some(stream) => Pin::new(stream).poll_read(cx, buf),
            None => Poll::Ready(Err(not_connected())),
        }
    }
}

impl AsyncWrite for TokioTcpTransport {
    fn poll_write(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        match self.get_mut().stream.as_mut() {
            Some(stream) => Pin::new(stream).poll_write(cx, buf),
            None => Poll::Ready(Err(not_connected())),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut().stream.as_mut() {
            Some(stream) => Pin::new(stream).poll_flush(cx),
            None => Poll::Ready(Ok(())),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut().stream.as_mut() {
            Some(stream) => Pin::new(stream).poll_shutdown(cx),
            None => Poll::Ready(Ok(())),
        }
    }
}

#[async_trait]
impl AsyncTransport for TokioTcpTransport {
    async fn reconnect(&mut self) -> Result<()> {
        self.close().await;
        self.stream = Some(self.open().await?);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.shutdown().await;
        }
    }
}
