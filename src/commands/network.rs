use crate::commands::SubCommand;
use crate::core::context::CommandContext;
use crate::error::{AdbError, Result};
use async_trait::async_trait;

/// Port adbd listens on for TCP/IP connections
pub const DEFAULT_DEVICE_PORT: u16 = 5555;

#[derive(Debug, Clone, clap::Args)]
pub struct ConnectArgs {
    /// Device address as host[:port]
    pub address: String,
}

#[derive(Debug, Clone, clap::Args)]
pub struct PairArgs {
    /// Pairing address shown by the device, as host:port
    pub address: String,

    /// Six digit pairing code
    pub code: String,
}

/// Split `host[:port]`, accepting bracketed IPv6 hosts.
pub fn split_address(address: &str, default_port: Option<u16>) -> Result<(String, u16)> {
    let invalid = || AdbError::InvalidArgument(format!("invalid address '{}'", address));

    let (host, port) = if let Some(rest) = address.strip_prefix('[') {
        let (host, tail) = rest.split_once(']').ok_or_else(invalid)?;
        (host, tail.strip_prefix(':'))
    } else {
        match address.rsplit_once(':') {
            Some((host, port)) if !host.contains(':') => (host, Some(port)),
            Some(_) => return Err(invalid()),
            None => (address, None),
        }
    };

    if host.is_empty() {
        return Err(invalid());
    }
    let port = match port {
        Some(port) => port.parse().map_err(|_| invalid())?,
        None => default_port.ok_or_else(|| {
            AdbError::InvalidArgument(format!("'{}' needs a port", address))
        })?,
    };
    Ok((host.to_string(), port))
}

/// Handles both `connect` and `disconnect`.
pub struct ConnectCommand {
    disconnect: bool,
}

impl ConnectCommand {
    pub fn connect() -> Self {
        Self { disconnect: false }
    }

    pub fn disconnect() -> Self {
        Self { disconnect: true }
    }
}

#[async_trait]
impl SubCommand for ConnectCommand {
    type Args = ConnectArgs;

    async fn run(&self, ctx: &CommandContext, args: Self::Args) -> Result<()> {
        let (host, port) = split_address(&args.address, Some(DEFAULT_DEVICE_PORT))?;
        let client = ctx.client();
        let message = if self.disconnect {
            client.disconnect(&host, port)?
        } else {
            client.connect(&host, port)?
        };

        // The server answers OKAY even when the connection failed
        if message.starts_with("failed") || message.starts_with("cannot") {
            return Err(AdbError::Protocol(message));
        }
        ctx.formatter().message(&message)
    }
}

pub struct PairCommand;

impl PairCommand {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SubCommand for PairCommand {
    type Args = PairArgs;

    async fn run(&self, ctx: &CommandContext, args: Self::Args) -> Result<()> {
        let (host, port) = split_address(&args.address, None)?;
        let message = ctx.client().pair(&args.code, &host, port)?;
        if message.starts_with("Failed") {
            return Err(AdbError::Protocol(message));
        }
        ctx.formatter().message(&message)
    }
}
