use crate::adb::async_socket::AsyncAdbSocket;
use crate::adb::transport::{AsyncTransport, TokioTcpTransport};
use crate::core::ServerEndpoint;
use crate::error::{AdbError, Result};
use log::*;
use serde::Serialize;
use std::io;
use std::time::Duration;

const SERVER_CHECK_TIMEOUT: Duration = Duration::from_millis(500);

/// Result of probing an ADB server
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdbServerStatus {
    pub running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
}

impl AdbServerStatus {
    pub fn not_running() -> Self {
        Self {
            running: false,
            version: None,
        }
    }
}

pub struct AdbServer;

impl AdbServer {
    /// Probe the server at `endpoint`.
    ///
    /// A refused connection means no server is listening and is reported as
    /// `running: false`. Every other failure is returned as an error.
    pub async fn status(endpoint: &ServerEndpoint) -> Result<AdbServerStatus> {
        let connect = tokio::time::timeout(SERVER_CHECK_TIMEOUT, TokioTcpTransport::connect(endpoint));

        match connect.await {
            Ok(Ok(transport)) => Self::query(AsyncAdbSocket::new(transport)).await,
            Ok(Err(e)) if e.is_connection_refused() => {
                debug!("ADB server is not running at {}", endpoint);
                Ok(AdbServerStatus::not_running())
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(AdbError::Transport(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("no answer from {} within {:?}", endpoint, SERVER_CHECK_TIMEOUT),
            ))),
        }
    }

    /// Ask a connected server for its version.
    pub async fn query<T: AsyncTransport>(mut socket: AsyncAdbSocket<T>) -> Result<AdbServerStatus> {
        socket.send_adb_request("host:version").await?;
        socket.read_adb_response().await?;
        let version = socket.read_string().await?;
        socket.close().await;

        let version = u32::from_str_radix(version.trim(), 16)
            .map_err(|_| AdbError::Protocol(format!("invalid server version {:?}", version)))?;
        debug!("ADB server is running, version {}", version);

        Ok(AdbServerStatus {
            running: true,
            version: Some(version),
        })
    }
}
