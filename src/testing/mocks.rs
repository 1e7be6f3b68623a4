use crate::adb::transport::{AsyncTransport, Connector, Transport};
use crate::error::{AdbError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::io::{self, Cursor, Read, Write};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// What a [`MockTransport`] does once the scripted bytes of a session run out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndOfInput {
    /// Reads return 0
    Eof,
    /// Async reads never complete; blocking reads time out
    Hang,
    /// Reads fail with this error kind
    Fail(io::ErrorKind),
}

/// Bytes written to a transport, one entry per connection.
#[derive(Debug, Clone, Default)]
pub struct WriteLog(Arc<Mutex<Vec<Vec<u8>>>>);

impl WriteLog {
    fn start_session(&self) {
        self.0.lock().unwrap().push(Vec::new());
    }

    fn record(&self, data: &[u8]) {
        let mut sessions = self.0.lock().unwrap();
        if sessions.is_empty() {
            sessions.push(Vec::new());
        }
        sessions.last_mut().unwrap().extend_from_slice(data);
    }

    pub fn sessions(&self) -> Vec<Vec<u8>> {
        self.0.lock().unwrap().clone()
    }

    pub fn session(&self, index: usize) -> Vec<u8> {
        self.sessions().get(index).cloned().unwrap_or_default()
    }

    /// Everything written across all sessions.
    pub fn all(&self) -> Vec<u8> {
        self.sessions().concat()
    }
}

/// Scripted stand-in for a connection to the ADB server.
///
/// Each session is the byte stream the server would send on one connection.
/// `reconnect` moves on to the next session; with none left it fails as if
/// the server refused the connection.
pub struct MockTransport {
    pending: VecDeque<Vec<u8>>,
    input: Cursor<Vec<u8>>,
    connected: bool,
    end: EndOfInput,
    max_read: usize,
    writes: WriteLog,
}

impl MockTransport {
    pub fn new(response: impl Into<Vec<u8>>) -> Self {
        Self::with_sessions(vec![response.into()])
    }

    pub fn with_sessions(sessions: Vec<Vec<u8>>) -> Self {
        let mut pending: VecDeque<Vec<u8>> = sessions.into();
        let first = pending.pop_front().unwrap_or_default();
        let writes = WriteLog::default();
        writes.start_session();

        Self {
            pending,
            input: Cursor::new(first),
            connected: true,
            end: EndOfInput::Eof,
            max_read: usize::MAX,
            writes,
        }
    }

    pub fn at_end(mut self, end: EndOfInput) -> Self {
        self.end = end;
        self
    }

    /// Deliver at most `max_read` bytes per read call.
    pub fn with_max_read(mut self, max_read: usize) -> Self {
        self.max_read = max_read.max(1);
        self
    }

    pub fn writes(&self) -> WriteLog {
        self.writes.clone()
    }

    pub fn written(&self) -> Vec<u8> {
        self.writes.all()
    }

    /// Unread bytes left in the current session.
    pub fn remaining(&self) -> usize {
        self.input.get_ref().len() - self.input.position() as usize
    }

    fn advance_session(&mut self) -> Result<()> {
        match self.pending.pop_front() {
            Some(next) => {
                self.input = Cursor::new(next);
                self.connected = true;
                self.writes.start_session();
                Ok(())
            }
            None => Err(AdbError::Transport(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "no more scripted sessions",
            ))),
        }
    }

    fn read_scripted(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.connected {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "mock transport closed"));
        }
        let limit = buf.len().min(self.max_read);
        self.input.read(&mut buf[..limit])
    }

    fn write_scripted(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.connected {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "mock transport closed"));
        }
        self.writes.record(buf);
        Ok(buf.len())
    }
}

impl Read for MockTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.read_scripted(buf)?;
        if read > 0 || buf.is_empty() {
            return Ok(read);
        }
        match self.end {
            EndOfInput::Eof => Ok(0),
            EndOfInput::Hang => Err(io::Error::new(io::ErrorKind::TimedOut, "mock read timed out")),
            EndOfInput::Fail(kind) => Err(io::Error::new(kind, "mock read failed")),
        }
    }
}

impl Write for MockTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_scripted(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Transport for MockTransport {
    fn reconnect(&mut self) -> Result<()> {
        self.advance_session()
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn close(&mut self) {
        self.connected = false;
    }
}

impl AsyncRead for MockTransport {
    fn poll_read(self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let unfilled = buf.initialize_unfilled();
        if unfilled.is_empty() {
            return Poll::Ready(Ok(()));
        }

        match this.read_scripted(unfilled) {
            Ok(0) => match this.end {
                EndOfInput::Eof => Poll::Ready(Ok(())),
                EndOfInput::Hang => Poll::Pending,
                EndOfInput::Fail(kind) => Poll::Ready(Err(io::Error::new(kind, "mock read failed"))),
            },
            Ok(read) => {
                buf.advance(read);
                Poll::Ready(Ok(()))
            }
            Err(e) => Poll::Ready(Err(e)),
        }
    }
}

impl AsyncWrite for MockTransport {
    fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        Poll::Ready(self.get_mut().write_scripted(buf))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

#[async_trait]
impl AsyncTransport for MockTransport {
    async fn reconnect(&mut self) -> Result<()> {
        self.advance_session()
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn close(&mut self) {
        self.connected = false;
    }
}

/// Hands out one scripted [`MockTransport`] per connection.
pub struct MockConnector {
    transports: Mutex<VecDeque<MockTransport>>,
    logs: Vec<WriteLog>,
}

impl MockConnector {
    /// One connection per response, in order.
    pub fn new(responses: Vec<Vec<u8>>) -> Self {
        Self::with_transports(responses.into_iter().map(MockTransport::new).collect())
    }

    pub fn with_transports(transports: Vec<MockTransport>) -> Self {
        let logs = transports.iter().map(MockTransport::writes).collect();
        Self {
            transports: Mutex::new(transports.into()),
            logs,
        }
    }

    /// Bytes the client wrote on the `index`-th connection.
    pub fn written(&self, index: usize) -> Vec<u8> {
        self.logs.get(index).map(WriteLog::all).unwrap_or_default()
    }

    pub fn connections_left(&self) -> usize {
        self.transports.lock().unwrap().len()
    }
}

impl Connector for MockConnector {
    type Transport = MockTransport;

    fn connect(&self) -> Result<MockTransport> {
        self.transports.lock().unwrap().pop_front().ok_or_else(|| {
            AdbError::Transport(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "no more scripted connections",
            ))
        })
    }
}
