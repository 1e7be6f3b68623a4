use crate::commands::device::{FeaturesArgs, RebootArgs, RootArgs};
use crate::commands::devices::DevicesArgs;
use crate::commands::files::{LsArgs, PullArgs, PushArgs, StatArgs};
use crate::commands::forward::{ForwardArgs, ReverseArgs};
use crate::commands::framebuffer::FramebufferArgs;
use crate::commands::network::{ConnectArgs, PairArgs};
use crate::commands::package::{InstallArgs, UninstallArgs};
use crate::commands::shell::ShellArgs;
use crate::core::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputType {
    Table,
    Json,
    Plain,
}

impl From<OutputType> for OutputFormat {
    fn from(output: OutputType) -> Self {
        match output {
            OutputType::Table => OutputFormat::Table,
            OutputType::Json => OutputFormat::Json,
            OutputType::Plain => OutputFormat::Plain,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[command(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Option<Commands>,

    /// ADB server hostname (overrides the config file)
    #[arg(long, short = 'H', global = true)]
    pub host: Option<String>,

    /// ADB server port (overrides the config file)
    #[arg(long, short = 'P', global = true)]
    pub port: Option<u16>,

    /// Config file to use instead of ~/.adb-bridge.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Device serial, or a unique part of one
    #[arg(long = "serial", short = 's', global = true)]
    pub serial: Option<String>,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value_t = OutputType::Table)]
    pub output: OutputType,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Lists connected devices
    Devices(DevicesArgs),

    /// Prints the server's protocol version
    Version,

    /// Asks the ADB server to exit
    KillServer,

    /// Checks whether an ADB server is listening
    ServerStatus,

    /// Connects the server to a device over TCP/IP
    Connect(ConnectArgs),

    /// Disconnects a TCP/IP device
    Disconnect(ConnectArgs),

    /// Pairs with a device using a wireless debugging code
    Pair(PairArgs),

    /// Lists the features a device supports
    Features(FeaturesArgs),

    /// Runs a shell command on a device
    Shell(ShellArgs),

    /// Lists a remote directory
    Ls(LsArgs),

    /// Shows the metadata of a remote path
    Stat(StatArgs),

    /// Copies local files to a device
    Push(PushArgs),

    /// Copies a remote file from a device
    Pull(PullArgs),

    /// Manages host-to-device port forwards
    Forward(ForwardArgs),

    /// Manages device-to-host port forwards
    Reverse(ReverseArgs),

    /// Reboots a device
    Reboot(RebootArgs),

    /// Restarts adbd with root permissions
    Root(RootArgs),

    /// Restarts adbd without root permissions
    Unroot(RootArgs),

    /// Installs an APK
    Install(InstallArgs),

    /// Removes a package
    Uninstall(UninstallArgs),

    /// Captures the raw framebuffer of a device
    Framebuffer(FramebufferArgs),
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or(Commands::Devices(DevicesArgs::default()))
    }
}
