use crate::error::{AdbError, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// One side of a port-forwarding rule, e.g. `tcp:8080` or `jdwp:1234`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ForwardSpec {
    Tcp(u16),
    Local(String),
    LocalAbstract(String),
    LocalReserved(String),
    LocalFilesystem(String),
    Device(String),
    Jdwp(u32),
}

impl ForwardSpec {
    pub fn protocol(&self) -> &'static str {
        match self {
            ForwardSpec::Tcp(_) => "tcp",
            ForwardSpec::Local(_) => "local",
            ForwardSpec::LocalAbstract(_) => "localabstract",
            ForwardSpec::LocalReserved(_) => "localreserved",
            ForwardSpec::LocalFilesystem(_) => "localfilesystem",
            ForwardSpec::Device(_) => "dev",
            ForwardSpec::Jdwp(_) => "jdwp",
        }
    }
}

impl FromStr for ForwardSpec {
    type Err = AdbError;

    fn from_str(s: &str) -> Result<Self> {
        let (protocol, target) = s
            .split_once(':')
            .ok_or_else(|| AdbError::InvalidArgument(format!("invalid forward spec '{}'", s)))?;

        if target.is_empty() {
            return Err(AdbError::InvalidArgument(format!("forward spec '{}' has no target", s)));
        }

        let number_error = || AdbError::InvalidArgument(format!("forward spec '{}' needs a number", s));

        match protocol {
            "tcp" => target.parse().map(ForwardSpec::Tcp).map_err(|_| number_error()),
            "jdwp" => target.parse().map(ForwardSpec::Jdwp).map_err(|_| number_error()),
            "local" => Ok(ForwardSpec::Local(target.to_string())),
            "localabstract" => Ok(ForwardSpec::LocalAbstract(target.to_string())),
            "localreserved" => Ok(ForwardSpec::LocalReserved(target.to_string())),
            "localfilesystem" => Ok(ForwardSpec::LocalFilesystem(target.to_string())),
            "dev" => Ok(ForwardSpec::Device(target.to_string())),
            _ => Err(AdbError::InvalidArgument(format!(
                "unknown forward protocol '{}'",
                protocol
            ))),
        }
    }
}

impl fmt::Display for ForwardSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForwardSpec::Tcp(port) => write!(f, "tcp:{}", port),
            ForwardSpec::Jdwp(pid) => write!(f, "jdwp:{}", pid),
            ForwardSpec::Local(t)
            | ForwardSpec::LocalAbstract(t)
            | ForwardSpec::LocalReserved(t)
            | ForwardSpec::LocalFilesystem(t)
            | ForwardSpec::Device(t) => write!(f, "{}:{}", self.protocol(), t),
        }
    }
}

/// A row of `list-forward` output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForwardData {
    pub serial: String,
    pub local: String,
    pub remote: String,
}

impl ForwardData {
    /// Parse a `"<serial> <local> <remote>"` line.
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let (serial, local, remote) = (parts.next()?, parts.next()?, parts.next()?);
        Some(Self {
            serial: serial.to_string(),
            local: local.to_string(),
            remote: remote.to_string(),
        })
    }

    pub fn parse_list(payload: &str) -> Vec<Self> {
        payload.lines().filter_map(Self::parse_line).collect()
    }

    pub fn local_spec(&self) -> Result<ForwardSpec> {
        self.local.parse()
    }

    pub fn remote_spec(&self) -> Result<ForwardSpec> {
        self.remote.parse()
    }
}

impl fmt::Display for ForwardData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.serial, self.local, self.remote)
    }
}
