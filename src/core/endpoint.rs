use crate::error::{AdbError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{SocketAddr, ToSocketAddrs};
use std::str::FromStr;

pub const DEFAULT_ADB_HOST: &str = "127.0.0.1";
pub const DEFAULT_ADB_PORT: u16 = 5037;

/// Socket families the server can listen on that this client cannot speak.
const NON_TCP_SCHEMES: &[&str] = &[
    "unix",
    "local",
    "localabstract",
    "localreserved",
    "localfilesystem",
    "vsock",
    "acceptfd",
    "usb",
];

/// TCP address of an ADB server
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServerEndpoint {
    pub host: String,
    pub port: u16,
}

impl ServerEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Resolve to the first socket address for this endpoint.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let host = if self.host == "localhost" {
            DEFAULT_ADB_HOST
        } else {
            self.host.trim_start_matches('[').trim_end_matches(']')
        };

        (host, self.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| AdbError::InvalidArgument(format!("could not resolve {}", self)))
    }
}

impl Default for ServerEndpoint {
    fn default() -> Self {
        Self::new(DEFAULT_ADB_HOST, DEFAULT_ADB_PORT)
    }
}

impl fmt::Display for ServerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl From<SocketAddr> for ServerEndpoint {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr.ip().to_string(), addr.port())
    }
}

impl FromStr for ServerEndpoint {
    type Err = AdbError;

    /// Accepts `host`, `host:port`, `[v6]:port` and `tcp:host:port`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AdbError::InvalidArgument("endpoint must not be empty".into()));
        }

        if let Some((scheme, _)) = s.split_once(':') {
            if NON_TCP_SCHEMES.contains(&scheme.to_lowercase().as_str()) {
                return Err(AdbError::UnsupportedEndpoint(s.to_string()));
            }
        }

        let address = s.strip_prefix("tcp:").unwrap_or(s);

        if address.starts_with('[') {
            return match address.rsplit_once("]:") {
                Some((host, port)) => Ok(Self::new(format!("{}]", host), parse_port(s, port)?)),
                None => Ok(Self::new(address, DEFAULT_ADB_PORT)),
            };
        }

        match address.split_once(':') {
            Some((host, port)) if !port.contains(':') => Ok(Self::new(host, parse_port(s, port)?)),
            Some(_) => Err(AdbError::UnsupportedEndpoint(s.to_string())),
            None => Ok(Self::new(address, DEFAULT_ADB_PORT)),
        }
    }
}

fn parse_port(endpoint: &str, port: &str) -> Result<u16> {
    port.parse()
        .map_err(|_| AdbError::InvalidArgument(format!("invalid port in endpoint '{}'", endpoint)))
}
