use crate::adb::protocol::{
    encode_sync_header, encode_sync_request, failure_to_error, AdbResponse, SyncCommand,
    DEFAULT_MAX_BUFFER_SIZE, DEFAULT_RECEIVE_BUFFER_SIZE, OKAY,
};
use crate::adb::request::{form_request, parse_hex_length};
use crate::adb::transport::{AsyncTransport, TokioTcpTransport};
use crate::core::ServerEndpoint;
use crate::error::{AdbError, Result};
use log::*;
use std::io;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

/// Asynchronous ADB connection with the same framing as [`crate::adb::AdbSocket`].
///
/// Every read and write races the socket's cancellation token. When the token
/// fires the transport is closed and the pending call returns
/// [`AdbError::Cancelled`].
pub struct AsyncAdbSocket<T: AsyncTransport = TokioTcpTransport> {
    transport: T,
    cancel: CancellationToken,
    receive_buffer_size: usize,
    max_string_size: usize,
}

impl AsyncAdbSocket<TokioTcpTransport> {
    pub async fn connect(endpoint: &ServerEndpoint) -> Result<Self> {
        Ok(Self::new(TokioTcpTransport::connect(endpoint).await?))
    }
}

impl<T: AsyncTransport> AsyncAdbSocket<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            cancel: CancellationToken::new(),
            receive_buffer_size: DEFAULT_RECEIVE_BUFFER_SIZE,
            max_string_size: DEFAULT_MAX_BUFFER_SIZE,
        }
    }

    pub fn with_receive_buffer_size(mut self, size: usize) -> Self {
        self.receive_buffer_size = size.max(1);
        self
    }

    pub fn set_max_string_size(&mut self, size: usize) {
        self.max_string_size = size;
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    pub async fn reconnect(&mut self, force: bool) -> Result<()> {
        if self.transport.is_connected() && !force {
            return Ok(());
        }
        debug!("Reconnecting ADB socket");
        self.transport.reconnect().await
    }

    pub async fn close(&mut self) {
        self.transport.close().await;
    }

    fn map_io_error(&self, error: io::Error) -> AdbError {
        if self.cancel.is_cancelled() {
            AdbError::Cancelled
        } else {
            AdbError::Transport(error)
        }
    }

    // =========================================================================
    // Raw I/O
    // =========================================================================

    /// Single read of at most `buf.len()` bytes; 0 means EOF.
    pub async fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize> {
        let Self { transport, cancel, .. } = self;
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = transport.read(buf) => Some(result),
        };

        match outcome {
            None => {
                self.transport.close().await;
                Err(AdbError::Cancelled)
            }
            Some(Ok(n)) => Ok(n),
            Some(Err(e)) => Err(self.map_io_error(e)),
        }
    }

    pub async fn send(&mut self, data: &[u8]) -> Result<()> {
        let Self { transport, cancel, .. } = self;
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = async {
                transport.write_all(data).await?;
                transport.flush().await
            } => Some(result),
        };

        match outcome {
            None => {
                self.transport.close().await;
                Err(AdbError::Cancelled)
            }
            Some(Ok(())) => Ok(()),
            Some(Err(e)) if e.kind() == io::ErrorKind::WriteZero => Err(AdbError::ChannelEof {
                expected: data.len(),
                received: 0,
            }),
            Some(Err(e)) => Err(self.map_io_error(e)),
        }
    }

    /// Read until `buf` is full or EOF; returns the count, short only on EOF.
    pub async fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut total = 0;
        while total < buf.len() {
            let end = (total + self.receive_buffer_size).min(buf.len());
            match self.read_chunk(&mut buf[total..end]).await? {
                0 => break,
                n => total += n,
            }
        }
        Ok(total)
    }

    pub async fn receive_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let received = self.receive(buf).await?;
        if received != buf.len() {
            return Err(AdbError::ChannelEof {
                expected: buf.len(),
                received,
            });
        }
        Ok(())
    }

    // =========================================================================
    // Host protocol
    // =========================================================================

    pub async fn send_adb_request(&mut self, command: &str) -> Result<()> {
        debug!("Sending command: {}", command);
        let request = form_request(command)?;
        self.send(&request).await
    }

    pub async fn read_response_status(&mut self) -> Result<AdbResponse> {
        let mut status = [0u8; 4];
        self.receive_exact(&mut status).await?;
        trace!("Response status: {:?}", String::from_utf8_lossy(&status));

        if &status == OKAY {
            return Ok(AdbResponse::Okay);
        }

        let message = String::from_utf8_lossy(&self.read_length_prefixed().await?).into_owned();
        Ok(AdbResponse::Fail(message))
    }

    /// Read the status of a host command, closing the socket on failure.
    pub async fn read_adb_response(&mut self) -> Result<()> {
        match self.read_response_status().await {
            Ok(AdbResponse::Okay) => Ok(()),
            Ok(AdbResponse::Fail(message)) => {
                debug!("Server replied FAIL: {}", message);
                self.close().await;
                Err(failure_to_error(message))
            }
            Err(e) => {
                self.close().await;
                Err(e)
            }
        }
    }

    pub async fn read_string(&mut self) -> Result<String> {
        Ok(String::from_utf8(self.read_length_prefixed().await?)?)
    }

    async fn read_length_prefixed(&mut self) -> Result<Vec<u8>> {
        let mut prefix = [0u8; 4];
        self.receive_exact(&mut prefix).await?;
        let length = parse_hex_length(&prefix)?;

        let mut payload = vec![0u8; length];
        if length > 0 {
            self.receive_exact(&mut payload).await?;
        }
        Ok(payload)
    }

    pub async fn set_device(&mut self, serial: &str) -> Result<()> {
        self.send_adb_request(&format!("host:transport:{}", serial))
            .await?;
        self.read_adb_response().await
    }

    // =========================================================================
    // SYNC protocol
    // =========================================================================

    pub async fn send_sync_request(&mut self, command: SyncCommand, path: &str) -> Result<()> {
        debug!("Sending sync command: {} {}", command, path);
        self.send(&encode_sync_request(command, path.as_bytes()))
            .await
    }

    pub async fn send_sync_header(&mut self, command: SyncCommand, value: u32) -> Result<()> {
        self.send(&encode_sync_header(command, value)).await
    }

    pub async fn read_sync_response(&mut self) -> Result<Option<SyncCommand>> {
        let mut code = [0u8; 4];
        match self.receive(&mut code).await? {
            0 => Ok(None),
            4 => SyncCommand::from_code(&code),
            received => Err(AdbError::ChannelEof { expected: 4, received }),
        }
    }

    pub async fn read_u32_le(&mut self) -> Result<u32> {
        let mut bytes = [0u8; 4];
        self.receive_exact(&mut bytes).await?;
        Ok(u32::from_le_bytes(bytes))
    }

    pub async fn read_sync_string(&mut self) -> Result<String> {
        let length = self.read_u32_le().await? as usize;
        if length > self.max_string_size {
            return Err(AdbError::Protocol(format!(
                "sync string of {} bytes exceeds {}",
                length, self.max_string_size
            )));
        }

        let mut payload = vec![0u8; length];
        self.receive_exact(&mut payload).await?;
        Ok(String::from_utf8_lossy(&payload).into_owned())
    }
}
