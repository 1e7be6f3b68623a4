use crate::adb::protocol::{
    encode_sync_header, encode_sync_request, failure_to_error, AdbResponse, SyncCommand,
    DEFAULT_MAX_BUFFER_SIZE, DEFAULT_RECEIVE_BUFFER_SIZE, OKAY,
};
use crate::adb::request::{form_request, parse_hex_length};
use crate::adb::transport::{TcpTransport, Transport};
use crate::core::ServerEndpoint;
use crate::error::{AdbError, Result};
use log::*;
use std::io::{self, Read, Write};

/// Blocking ADB connection: raw byte I/O plus host-protocol framing.
///
/// A socket is used by one caller at a time. Open another socket for
/// concurrent work.
pub struct AdbSocket<T: Transport = TcpTransport> {
    transport: T,
    receive_buffer_size: usize,
    max_string_size: usize,
}

impl AdbSocket<TcpTransport> {
    /// Connect to the ADB server at `endpoint`.
    pub fn connect(endpoint: &ServerEndpoint) -> Result<Self> {
        Ok(Self::new(TcpTransport::connect(endpoint)?))
    }
}

impl<T: Transport> AdbSocket<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            receive_buffer_size: DEFAULT_RECEIVE_BUFFER_SIZE,
            max_string_size: DEFAULT_MAX_BUFFER_SIZE,
        }
    }

    pub fn with_receive_buffer_size(mut self, size: usize) -> Self {
        self.receive_buffer_size = size.max(1);
        self
    }

    /// Upper bound for strings read by [`read_sync_string`](Self::read_sync_string).
    pub fn set_max_string_size(&mut self, size: usize) {
        self.max_string_size = size;
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Re-establish the connection. A live connection is kept unless `force` is set.
    pub fn reconnect(&mut self, force: bool) -> Result<()> {
        if self.transport.is_connected() && !force {
            return Ok(());
        }
        debug!("Reconnecting ADB socket");
        self.transport.reconnect()
    }

    pub fn close(&mut self) {
        self.transport.close();
    }

    // =========================================================================
    // Raw I/O
    // =========================================================================

    /// Write every byte of `data` or fail.
    pub fn send(&mut self, data: &[u8]) -> Result<()> {
        let mut written = 0;
        while written < data.len() {
            match self.transport.write(&data[written..]) {
                Ok(0) => {
                    return Err(AdbError::ChannelEof {
                        expected: data.len(),
                        received: written,
                    })
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        self.transport.flush()?;
        Ok(())
    }

    /// Read until `buf` is full or the peer closes the stream.
    ///
    /// Returns the number of bytes read, which is short only on EOF.
    pub fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut total = 0;
        while total < buf.len() {
            let end = (total + self.receive_buffer_size).min(buf.len());
            match self.transport.read(&mut buf[total..end]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(total)
    }

    /// Like [`receive`](Self::receive) but a short read is an error.
    pub fn receive_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let received = self.receive(buf)?;
        if received != buf.len() {
            return Err(AdbError::ChannelEof {
                expected: buf.len(),
                received,
            });
        }
        Ok(())
    }

    /// Read until the peer closes the stream.
    pub fn read_to_end(&mut self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        let mut chunk = vec![0u8; self.receive_buffer_size];
        loop {
            let n = self.receive(&mut chunk)?;
            data.extend_from_slice(&chunk[..n]);
            if n < chunk.len() {
                return Ok(data);
            }
        }
    }

    /// Read the rest of the stream as UTF-8 text.
    pub fn read_to_end_string(&mut self) -> Result<String> {
        Ok(String::from_utf8(self.read_to_end()?)?)
    }

    // =========================================================================
    // Host protocol
    // =========================================================================

    /// Send a framed host command such as `host:version`.
    pub fn send_adb_request(&mut self, command: &str) -> Result<()> {
        debug!("Sending command: {}", command);
        let request = form_request(command)?;
        self.send(&request)
    }

    /// Read `OKAY`, or `FAIL` and its message.
    pub fn read_response_status(&mut self) -> Result<AdbResponse> {
        let mut status = [0u8; 4];
        self.receive_exact(&mut status)?;
        trace!("Response status: {:?}", String::from_utf8_lossy(&status));

        if &status == OKAY {
            return Ok(AdbResponse::Okay);
        }

        let message = String::from_utf8_lossy(&self.read_length_prefixed()?).into_owned();
        Ok(AdbResponse::Fail(message))
    }

    /// Read the status of a host command, closing the socket on failure.
    ///
    /// The socket must not be reused after this returns an error.
    pub fn read_adb_response(&mut self) -> Result<()> {
        match self.read_response_status() {
            Ok(AdbResponse::Okay) => Ok(()),
            Ok(AdbResponse::Fail(message)) => {
                debug!("Server replied FAIL: {}", message);
                self.close();
                Err(failure_to_error(message))
            }
            Err(e) => {
                self.close();
                Err(e)
            }
        }
    }

    /// Read a string with a 4 hex digit length prefix.
    pub fn read_string(&mut self) -> Result<String> {
        Ok(String::from_utf8(self.read_length_prefixed()?)?)
    }

    /// Read a hex-prefixed string, or `None` if the peer closed first.
    pub fn try_read_string(&mut self) -> Result<Option<String>> {
        let mut prefix = [0u8; 4];
        match self.receive(&mut prefix)? {
            0 => Ok(None),
            4 => {
                let length = parse_hex_length(&prefix)?;
                let mut payload = vec![0u8; length];
                self.receive_exact(&mut payload)?;
                Ok(Some(String::from_utf8(payload)?))
            }
            received => Err(AdbError::ChannelEof { expected: 4, received }),
        }
    }

    fn read_length_prefixed(&mut self) -> Result<Vec<u8>> {
        let mut prefix = [0u8; 4];
        self.receive_exact(&mut prefix)?;
        let length = parse_hex_length(&prefix)?;

        let mut payload = vec![0u8; length];
        if length > 0 {
            self.receive_exact(&mut payload)?;
        }
        Ok(payload)
    }

    /// Route the rest of this connection to the device with `serial`.
    pub fn set_device(&mut self, serial: &str) -> Result<()> {
        self.send_adb_request(&format!("host:transport:{}", serial))?;
        self.read_adb_response()
    }

    // =========================================================================
    // SYNC protocol
    // =========================================================================

    /// Send `{tag}{LE length}{path}`.
    pub fn send_sync_request(&mut self, command: SyncCommand, path: &str) -> Result<()> {
        debug!("Sending sync command: {} {}", command, path);
        self.send(&encode_sync_request(command, path.as_bytes()))
    }

    /// Send `{tag}{LE value}` with no payload.
    pub fn send_sync_header(&mut self, command: SyncCommand, value: u32) -> Result<()> {
        self.send(&encode_sync_header(command, value))
    }

    /// Read a SYNC tag. `None` is the empty response: four zero bytes or EOF.
    pub fn read_sync_response(&mut self) -> Result<Option<SyncCommand>> {
        let mut code = [0u8; 4];
        match self.receive(&mut code)? {
            0 => Ok(None),
            4 => {
                let command = SyncCommand::from_code(&code)?;
                trace!("Sync response: {:?}", command);
                Ok(command)
            }
            received => Err(AdbError::ChannelEof { expected: 4, received }),
        }
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        let mut bytes = [0u8; 4];
        self.receive_exact(&mut bytes)?;
        Ok(u32::from_le_bytes(bytes))
    }

    /// Read a string with a little-endian u32 length prefix.
    pub fn read_sync_string(&mut self) -> Result<String> {
        let length = self.read_u32_le()? as usize;
        if length > self.max_string_size {
            return Err(AdbError::Protocol(format!(
                "sync string of {} bytes exceeds {}",
                length, self.max_string_size
            )));
        }

        let mut payload = vec![0u8; length];
        self.receive_exact(&mut payload)?;
        Ok(String::from_utf8_lossy(&payload).into_owned())
    }
}
