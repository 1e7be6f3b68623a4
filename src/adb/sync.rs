use crate::adb::protocol::{
    FileStatistics, SyncCommand, DATA_HEADER_SIZE, DEFAULT_MAX_BUFFER_SIZE, MAX_PATH_LENGTH,
};
use crate::adb::socket::AdbSocket;
use crate::adb::transport::{TcpTransport, Transport};
use crate::core::{TransferDirection, TransferProgress};
use crate::error::{AdbError, Result};
use bytes::BytesMut;
use chrono::{DateTime, Utc};
use log::*;
use std::io::{self, Read, Seek, SeekFrom, Write};

/// Callback invoked after every transferred chunk.
pub type ProgressCallback<'a> = &'a mut (dyn FnMut(&TransferProgress) + Send);

/// Seconds since the epoch as sent in `DONE`, clamped to what a u32 holds.
pub fn wire_mtime(mtime: &DateTime<Utc>) -> u32 {
    mtime.timestamp().clamp(0, i64::from(u32::MAX)) as u32
}

/// Size of the zeroed stat fields that follow a `DONE` in a listing.
const LIST_DONE_TRAILER: usize = 16;

/// File transfer session over the SYNC sub-protocol.
///
/// Created by [`SyncService::open`], which switches the socket into sync mode.
/// A `FAIL` from the server aborts only the current call; the session stays usable.
pub struct SyncService<T: Transport = TcpTransport> {
    socket: AdbSocket<T>,
    serial: Option<String>,
    max_buffer_size: usize,
}

impl<T: Transport> SyncService<T> {
    /// Select the device (if any) and enter sync mode.
    pub fn open(socket: AdbSocket<T>, serial: Option<&str>) -> Result<Self> {
        let mut service = Self {
            socket,
            serial: serial.map(str::to_string),
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
        };
        service.handshake()?;
        Ok(service)
    }

    pub fn with_max_buffer_size(mut self, size: usize) -> Self {
        self.max_buffer_size = size.max(DATA_HEADER_SIZE + 1);
        self.socket.set_max_string_size(self.max_buffer_size);
        self
    }

    pub fn max_buffer_size(&self) -> usize {
        self.max_buffer_size
    }

    /// Largest payload of a single `DATA` chunk.
    pub fn max_data_size(&self) -> usize {
        self.max_buffer_size - DATA_HEADER_SIZE
    }

    pub fn socket(&self) -> &AdbSocket<T> {
        &self.socket
    }

    fn handshake(&mut self) -> Result<()> {
        if let Some(serial) = self.serial.clone() {
            self.socket.set_device(&serial)?;
        }
        self.socket.send_adb_request("sync:")?;
        self.socket.read_adb_response()
    }

    /// Reconnect and enter sync mode again.
    pub fn reopen(&mut self) -> Result<()> {
        self.socket.reconnect(true)?;
        self.handshake()
    }

    /// Leave sync mode and close the connection.
    pub fn close(mut self) -> Result<()> {
        let result = self.socket.send_sync_header(SyncCommand::Quit, 0);
        self.socket.close();
        result
    }

    // =========================================================================
    // STAT
    // =========================================================================

    pub fn stat(&mut self, remote_path: &str) -> Result<FileStatistics> {
        self.socket.send_sync_request(SyncCommand::Stat, remote_path)?;

        match self.socket.read_sync_response()? {
            Some(SyncCommand::Stat) => {}
            other => {
                return Err(AdbError::Protocol(format!(
                    "expected STAT response, got {:?}",
                    other
                )))
            }
        }

        Ok(self.read_statistics()?.with_path(remote_path))
    }

    fn read_statistics(&mut self) -> Result<FileStatistics> {
        let mut bytes = [0u8; FileStatistics::WIRE_SIZE];
        self.socket.receive_exact(&mut bytes)?;
        Ok(FileStatistics::from_le_bytes(&bytes))
    }

    // =========================================================================
    // LIST
    // =========================================================================

    /// List a remote directory.
    ///
    /// If the very first reply is empty the session is reopened and the
    /// request repeated once. A second empty reply is an error.
    pub fn list(&mut self, remote_path: &str) -> Result<Vec<FileStatistics>> {
        let mut retried = false;
        self.socket.send_sync_request(SyncCommand::List, remote_path)?;

        let mut entries = Vec::new();
        loop {
            match self.socket.read_sync_response()? {
                None if retried => {
                    return Err(AdbError::Protocol(format!(
                        "server returned an empty response listing {}",
                        remote_path
                    )))
                }
                None => {
                    warn!("Empty LIST response for {}, reopening sync session", remote_path);
                    retried = true;
                    self.reopen()?;
                    self.socket.send_sync_request(SyncCommand::List, remote_path)?;
                }
                Some(SyncCommand::Done) => {
                    let mut trailer = [0u8; LIST_DONE_TRAILER];
                    self.socket.receive_exact(&mut trailer)?;
                    break;
                }
                Some(SyncCommand::Dent) => {
                    retried = true;
                    let stats = self.read_statistics()?;
                    let name = self.socket.read_sync_string()?;
                    entries.push(stats.with_path(name));
                }
                Some(SyncCommand::Fail) => {
                    let message = self.socket.read_sync_string()?;
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

        debug!("Listed {} entries in {}", entries.len(), remote_path);
        Ok(entries)
    }

    // =========================================================================
    // SEND
    // =========================================================================

    /// Upload a seekable source, reporting progress against its length.
    pub fn push<R: Read + Seek>(
        &mut self,
        source: &mut R,
        remote_path: &str,
        permissions: u32,
        mtime: DateTime<Utc>,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<()> {
        let total = stream_length(source)?;
        self.push_inner(source, total, remote_path, permissions, mtime, progress)
    }

    /// Upload a source of unknown length. Progress totals are reported as 0.
    pub fn push_stream<R: Read>(
        &mut self,
        source: &mut R,
        remote_path: &str,
        permissions: u32,
        mtime: DateTime<Utc>,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<()> {
        self.push_inner(source, 0, remote_path, permissions, mtime, progress)
    }

    fn push_inner<R: Read>(
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
            .send_sync_request(SyncCommand::Send, &format!("{},{}", remote_path, permissions))?;

        let max_data_size = self.max_data_size();
        let mut buffer = BytesMut::zeroed(self.max_buffer_size);
        let mut report = TransferProgress::new(TransferDirection::Push, remote_path, total);

        loop {
            let read = fill_chunk(source, &mut buffer[DATA_HEADER_SIZE..DATA_HEADER_SIZE + max_data_size])?;
            if read == 0 {
                break;
            }

            buffer[..4].copy_from_slice(SyncCommand::Data.code());
            buffer[4..DATA_HEADER_SIZE].copy_from_slice(&(read as u32).to_le_bytes());
            self.socket.send(&buffer[..DATA_HEADER_SIZE + read])?;

            report.bytes_transferred += read as u64;
            if let Some(callback) = progress.as_deref_mut() {
                callback(&report);
            }
        }

        self.socket
            .send_sync_header(SyncCommand::Done, wire_mtime(&mtime))?;

        self.read_transfer_status(remote_path)
    }

    fn read_transfer_status(&mut self, remote_path: &str) -> Result<()> {
        match self.socket.read_sync_response()? {
            Some(SyncCommand::Okay) => {
                // OKAY carries a zero length
                self.socket.read_u32_le()?;
                info!("Successfully pushed {}", remote_path);
                Ok(())
            }
            Some(SyncCommand::Fail) => {
                let message = self.socket.read_sync_string()?;
                Err(AdbError::Protocol(message))
            }
            other => Err(AdbError::Protocol(format!(
                "expected OKAY after push, got {:?}",
                other
            ))),
        }
    }

    // =========================================================================
    // RECV
    // =========================================================================

    /// Download a remote file into `destination`.
    pub fn pull<W: Write>(
        &mut self,
        remote_path: &str,
        destination: &mut W,
        mut progress: Option<ProgressCallback<'_>>,
    ) -> Result<()> {
        check_remote_path(remote_path)?;
        let total = self.stat(remote_path)?.size as u64;
        info!("Pulling {} ({} bytes)", remote_path, total);

        self.socket.send_sync_request(SyncCommand::Recv, remote_path)?;

        let mut buffer = vec![0u8; self.max_buffer_size];
        let mut report = TransferProgress::new(TransferDirection::Pull, remote_path, total);

        loop {
            match self.socket.read_sync_response()? {
                Some(SyncCommand::Done) => {
                    self.socket.read_u32_le()?;
                    break;
                }
                Some(SyncCommand::Fail) => {
                    let message = self.socket.read_sync_string()?;
                    return Err(AdbError::Protocol(message));
                }
                Some(SyncCommand::Data) => {
                    let size = self.socket.read_u32_le()? as usize;
                    if size > self.max_buffer_size {
                        return Err(AdbError::Protocol(format!(
                            "DATA chunk of {} bytes exceeds the {} byte buffer",
                            size, self.max_buffer_size
                        )));
                    }

                    self.socket.receive_exact(&mut buffer[..size])?;
                    destination.write_all(&buffer[..size])?;

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

        destination.flush()?;
        info!("Successfully pulled {}", remote_path);
        Ok(())
    }
}

pub(crate) fn check_remote_path(remote_path: &str) -> Result<()> {
    if remote_path.is_empty() {
        return Err(AdbError::InvalidArgument("remote path must not be empty".into()));
    }
    if remote_path.len() > MAX_PATH_LENGTH {
        return Err(AdbError::PathTooLong {
            length: remote_path.len(),
            max: MAX_PATH_LENGTH,
        });
    }
    Ok(())
}

/// Remaining bytes in a seekable stream, leaving its position unchanged.
pub(crate) fn stream_length<R: Seek>(source: &mut R) -> io::Result<u64> {
    let position = source.stream_position()?;
    let end = source.seek(SeekFrom::End(0))?;
    source.seek(SeekFrom::Start(position))?;
    Ok(end.saturating_sub(position))
}

/// Read until `chunk` is full or the source is exhausted.
pub(crate) fn fill_chunk<R: Read>(source: &mut R, chunk: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < chunk.len() {
        match source.read(&mut chunk[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
