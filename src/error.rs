use std::io;
use std::string::FromUtf8Error;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdbError>;

#[derive(Debug, Error)]
pub enum AdbError {
    /// Socket-level failure: refused, reset, or any other I/O error
    #[error("ADB transport error: {0}")]
    Transport(#[from] io::Error),

    #[error("channel EOF: expected {expected} bytes, received {received}")]
    ChannelEof { expected: usize, received: usize },

    /// `FAIL` reply, malformed SYNC tag, or a framing violation
    #[error("ADB protocol error: {0}")]
    Protocol(String),

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Shell command became unresponsive: {0}")]
    Unresponsive(io::Error),

    #[error("Operation was cancelled")]
    Cancelled,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Remote path is {length} bytes long, the maximum is {max}")]
    PathTooLong { length: usize, max: usize },

    #[error("Request is {0} bytes long and does not fit a 4 digit hex length")]
    RequestTooLong(usize),

    #[error("Unsupported endpoint '{0}': only TCP endpoints are supported")]
    UnsupportedEndpoint(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("Invalid UTF-8 in response: {0}")]
    Utf8(#[from] FromUtf8Error),
}

impl AdbError {
    /// True when the server refused the TCP connection, i.e. it is not running.
    pub fn is_connection_refused(&self) -> bool {
        matches!(self, AdbError::Transport(e) if e.kind() == io::ErrorKind::ConnectionRefused)
    }

    /// True for errors reported by the server or caused by bad framing.
    pub fn is_protocol(&self) -> bool {
        matches!(self, AdbError::Protocol(_) | AdbError::DeviceNotFound(_))
    }
}
