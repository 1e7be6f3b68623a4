use crate::adb::async_socket::AsyncAdbSocket;
use crate::adb::protocol::{
    FileStatistics, SyncCommand, DATA_HEADER_SIZE, DEFAULT_MAX_BUFFER_SIZE,
};
use crate::adb::sync::{check_remote_path, wire_mtime, ProgressCallback};
use crate::adb::transport::{AsyncTransport, TokioTcpTransport};
use crate::core::{TransferDirection, TransferProgress};
use crate::error::{AdbError, Result};
use bytes::BytesMut;
use chrono::{DateTime, Utc};
use log::*;
use std::io::SeekFrom;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt, AsyncWrite, AsyncWriteExt};

const LIST_DONE_TRAILER: usize = 16;

/// Asynchronous [`crate::adb::SyncService`].
pub struct AsyncSyncService<T: AsyncTransport = TokioTcpTransport> {
    socket: AsyncAdbSocket<T>,
    serial: Option<String>,
    max_buffer_size: usize,
}

impl<T: AsyncTransport> AsyncSyncService<T> {
    pub async fn open(socket: AsyncAdbSocket<T>, serial: Option<&str>) -> Result<Self> {
        let mut service = Self {
            socket,
            serial: serial.map(str::to_string),
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
        };
        service.handshake().await?;
        Ok(service)
    }

    pub fn with_max_buffer_size(mut self, size: usize) -> Self {
        self.max_buffer_size = size.max(DATA_HEADER_SIZE + 1);
        self.socket.set_max_string_size(self.max_buffer_size);
        self
    }

    pub fn max_data_size(&self) -> usize {
        self.max_buffer_size - DATA_HEADER_SIZE
    }

    pub fn socket(&self) -> &AsyncAdbSocket<T> {
        &self.socket
    }

    async fn handshake(&mut self) -> Result<()> {
        if let Some(serial) = self.serial.clone() {
            self.socket.set_device(&serial).await?;
        }
        self.socket.send_adb_request("sync:").await?;
        self.socket.read_adb_response().await
    }

    pub async fn reopen(&mut self) -> Result<()> {
        self.socket.reconnect(true).await?;
        self.handshake().await
    }

    pub async fn close(mut self) -> Result<()> {
        let result = self.socket.send_sync_header(SyncCommand::Quit, 0).await;
        self.socket.close().await;
        result
    }

    pub async fn stat(&mut self, remote_path: &str) -> Result<FileStatistics> {
        self.socket
            .send_sync_request(SyncCommand::Stat, remote_path)
            .await?;

        match self.socket.read_sync_response().await? {
            Some(SyncCommand::Stat) => {}
            other => {
                return Err(AdbError::Protocol(format!(
                    "expected STAT response, got {:?}",
                    other
                )))
            }
        }

        Ok(self.read_statistics().await?.with_path(remote_path))
    }

    async fn read_statistics(&mut self) -> Result<FileStatistics> {
        let mut bytes = [0u8; FileStatistics::WIRE_SIZE];
        self.socket.receive_exact(&mut bytes).await?;
        Ok(FileStatistics::from_le_bytes(&bytes))
    }

    pub async fn list(&mut self, remote_path: &str) -> Result<Vec<FileStatistics>> {
        let mut retried = false;
        self.socket
            .send_sync_request(SyncCommand::List, remote_path)
            .await?;

        let mut entries = Vec::new();
        loop {
            match self.socket.read_sync_response().await? {
                None if retried => {
                    return Err(AdbError::Protocol(format!(
                        "server returned an empty response listing {}",
                        remote_path
                    )))
                }
                None => {
                    warn!("Empty LIST response for {}, reopening sync session", remote_path);
                    retried = true;
                    self.reopen().await?;
                    self.socket
                        .send_sync_request(SyncCommand::List, remote_path)
                        .await?;
                }
                Some(SyncCommand::Done) => {
                    let mut trailer = [0u8; LIST_DONE_TRAILER];
                    self.socket.receive_exact(&mut trailer).await?;
                    break;
                }
                Some(SyncCommand::Dent) => {
                    retried = true;
                    let stats = self.read_statistics().await?;
                    let name = self.socket.read_sync_string().await?;
                    entries.push(stats.with_path(name));
                }
                Some(SyncCommand::Fail) => {
                    let message = self.socket.read_sync_string().await?;
                    return Err(AdbError::Protocol(message));
                }
                Some(other) => {
                    return Err(AdbError::Protocol(format!(
                        "unexpected {} while listing {}",
                        other, remote_path
                    )))
                }
            }
        }

        Ok(entries)
    }

    pub async fn push<R: AsyncRead + AsyncSeek + Unpin>(
        &mut self,
        source: &mut R,
        remote_path: &str,
        permissions: u32,
        mtime: DateTime<Utc>,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<()> {
        let position = source.stream_position().await?;
        let end = source.seek(SeekFrom::End(0)).await?;
        source.seek(SeekFrom::Start(position)).await?;

        self.push_inner(source, end.saturating_sub(position), remote_path, permissions, mtime, progress)
            .await
    }

    pub async fn push_stream<R: AsyncRead + Unpin>(
        &mut self,
        source: &mut R,
        remote_path: &str,
        permissions: u32,
        mtime: DateTime<Utc>,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<()> {
        self.push_inner(source, 0, remote_path, permissions, mtime, progress)
            .await
    }

    async fn push_inner<R: AsyncRead + Unpin>(
        &mut self,
        source: &mut R,
        total: u64,
        remote_path: &str,
        permissions: u32,
        mtime: DateTime<Utc>,
        mut progress: Option<ProgressCallback<'_>>,
    ) -> Result<()> {
        check_remote_path(remote_path)?;
        info!("Pushing {} bytes to {}", total, remote_path);

        self.socket
            .send_sync_request(SyncCommand::Send, &format!("{},{}", remote_path, permissions))
            .await?;

        let max_data_size = self.max_data_size();
        let mut buffer = BytesMut::zeroed(self.max_buffer_size);
        let mut report = TransferProgress::new(TransferDirection::Push, remote_path, total);

        loop {
            let chunk = &mut buffer[DATA_HEADER_SIZE..DATA_HEADER_SIZE + max_data_size];
            let mut read = 0;
            while read < chunk.len() {
                match source.read(&mut chunk[read..]).await? {
                    0 => break,
                    n => read += n,
                }
            }
            if read == 0 {
                break;
            }

            buffer[..4].copy_from_slice(SyncCommand::Data.code());
            buffer[4..DATA_HEADER_SIZE].copy_from_slice(&(read as u32).to_le_bytes());
            self.socket.send(&buffer[..DATA_HEADER_SIZE + read]).await?;

            report.bytes_transferred += read as u64;
            if let Some(callback) = progress.as_deref_mut() {
                callback(&report);
            }
        }

        self.socket
            .send_sync_header(SyncCommand::Done, wire_mtime(&mtime))
            .await?;

        match self.socket.read_sync_response().await? {
            Some(SyncCommand::Okay) => {
                self.socket.read_u32_le().await?;
                Ok(())
            }
            Some(SyncCommand::Fail) => {
                let message = self.socket.read_sync_string().await?;
                Err(AdbError::Protocol(message))
            }
            other => Err(AdbError::Protocol(format!(
                "expected OKAY after push, got {:?}",
                other
            ))),
        }
    }

    pub async fn pull<W: AsyncWrite + Unpin>(
        &mut self,
        remote_path: &str,
        destination: &mut W,
        mut progress: Option<ProgressCallback<'_>>,
    ) -> Result<()> {
        check_remote_path(remote_path)?;
        let total = self.stat(remote_path).await?.size as u64;

        self.socket
            .send_sync_request(SyncCommand::Recv, remote_path)
            .await?;

        let mut buffer = vec![0u8; self.max_buffer_size];
        let mut report = TransferProgress::new(TransferDirection::Pull, remote_path, total);

        loop {
            match self.socket.read_sync_response().await? {
                Some(SyncCommand::Done) => {
                    self.socket.read_u32_le().await?;
                    break;
                }
                Some(SyncCommand::Fail) => {
                    let message = self.socket.read_sync_string().await?;
                    return Err(AdbError::Protocol(message));
                }
                Some(SyncCommand::Data) => {
                    let size = self.socket.read_u32_le().await? as usize;
                    if size > self.max_buffer_size {
                        return Err(AdbError::Protocol(format!(
                            "DATA chunk of {} bytes exceeds the {} byte buffer",
                            size, self.max_buffer_size
                        )));
                    }

                    self.socket.receive_exact(&mut buffer[..size]).await?;
                    destination.write_all(&buffer[..size]).await?;

                    report.bytes_transferred += size as u64;
                    if let Some(callback) = progress.as_deref_mut() {
                        callback(&report);
                    }
                }
                other => {
                    return Err(AdbError::Protocol(format!(
                        "unexpected {:?} while pulling {}",
                        other, remote_path
                    )))
                }
            }
        }

        destination.flush().await?;
        Ok(())
    }
}
