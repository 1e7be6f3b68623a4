use crate::adb::async_socket::AsyncAdbSocket;
use crate::adb::receiver::{CollectingReceiver, ShellOutputReceiver};
use crate::adb::transport::AsyncTransport;
use crate::core::{DeviceSerial, ServerEndpoint};
use crate::error::{AdbError, Result};
use log::*;
use tokio_util::sync::CancellationToken;

const READ_CHUNK_SIZE: usize = 4096;

/// Shell command streamed over the asynchronous socket.
///
/// Output is delivered line by line while the command runs. Firing the
/// cancellation token closes the connection and the call returns
/// [`AdbError::Cancelled`]; any other read failure is reported as
/// [`AdbError::Unresponsive`].
pub struct ShellCommand {
    command: String,
    serial: Option<DeviceSerial>,
    cancel: CancellationToken,
}

impl ShellCommand {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            serial: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Target a specific device
    pub fn with_device(mut self, serial: DeviceSerial) -> Self {
        self.serial = Some(serial);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the command and collect its output.
    pub async fn execute(&self, endpoint: &ServerEndpoint) -> Result<String> {
        let mut receiver = CollectingReceiver::new();
        self.stream(endpoint, &mut receiver).await?;
        Ok(receiver.output())
    }

    /// Connect to `endpoint` and stream the output into `receiver`.
    pub async fn stream(
        &self,
        endpoint: &ServerEndpoint,
        receiver: &mut dyn ShellOutputReceiver,
    ) -> Result<()> {
        let socket = AsyncAdbSocket::connect(endpoint).await?;
        self.run(socket, receiver).await
    }

    /// Run over an already connected socket.
    pub async fn run<T: AsyncTransport>(
        &self,
        socket: AsyncAdbSocket<T>,
        receiver: &mut dyn ShellOutputReceiver,
    ) -> Result<()> {
        let mut socket = socket.with_cancellation(self.cancel.clone());

        if let Some(serial) = &self.serial {
            socket.set_device(serial.as_str()).await?;
        }
        socket
            .send_adb_request(&format!("shell:{}", self.command))
            .await?;
        socket.read_adb_response().await?;

        let mut chunk = vec![0u8; READ_CHUNK_SIZE];
        let mut pending = Vec::new();

        loop {
            let read = match socket.read_chunk(&mut chunk).await {
                Ok(read) => read,
                Err(AdbError::Transport(e)) => {
                    warn!("Shell output stopped: {}", e);
                    return Err(AdbError::Unresponsive(e));
                }
                Err(e) => return Err(e),
            };

            if read == 0 {
                if !pending.is_empty() {
                    deliver(receiver, &pending);
                }
                break;
            }

            pending.extend_from_slice(&chunk[..read]);
            while let Some(end) = pending.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = pending.drain(..=end).collect();
                if !deliver(receiver, &line) {
                    debug!("Receiver stopped reading, closing shell");
                    socket.close().await;
                    receiver.flush();
                    return Ok(());
                }
            }
        }

        receiver.flush();
        socket.close().await;
        Ok(())
    }
}

fn deliver(receiver: &mut dyn ShellOutputReceiver, raw: &[u8]) -> bool {
    let line = String::from_utf8_lossy(raw);
    receiver.add_output(line.trim_end_matches(['\r', '\n']))
}
