use crate::cli::{Cli, Commands};
use crate::commands::{
    device::{FeaturesCommand, RebootCommand, RootCommand},
    devices::DevicesCommand,
    files::{LsCommand, PullCommand, PushCommand, StatCommand},
    forward::{ForwardCommand, ReverseCommand},
    framebuffer::FramebufferCommand,
    network::{ConnectCommand, PairCommand},
    package::{InstallCommand, UninstallCommand},
    server::{KillServerCommand, ServerStatusCommand, VersionCommand},
    shell::ShellCommand,
    SubCommand,
};
use crate::config::Config;
use crate::core::context::{CommandContext, CommandContextBuilder};
use crate::error::Result;
use log::debug;

/// Apply the global command-line overrides on top of the loaded config.
pub fn build_context(cli: &Cli, mut config: Config) -> CommandContext {
    if let Some(host) = &cli.host {
        config.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    CommandContextBuilder::new(config)
        .device(cli.serial.clone())
        .output_format(cli.output.into())
        .quiet(cli.verbose.log_level().is_none())
        .build()
}

/// Command runner that handles routing and execution
pub struct CommandRunner {
    ctx: CommandContext,
}

impl CommandRunner {
    pub fn new(ctx: CommandContext) -> Self {
        Self { ctx }
    }

    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config = match &cli.config {
            Some(path) => Config::load_from_path(path)?,
            None => Config::load()?,
        };
        debug!("Using config: {:?}", config);
        Ok(Self::new(build_context(cli, config)))
    }

    pub fn context(&self) -> &CommandContext {
        &self.ctx
    }

    pub async fn run(&self, command: Commands) -> Result<()> {
        debug!("Running command: {:?}", command);
        let ctx = &self.ctx;

        match command {
            Commands::Devices(args) => DevicesCommand::new().run(ctx, args).await,
            Commands::Version => VersionCommand::new().run(ctx, ()).await,
            Commands::KillServer => KillServerCommand::new().run(ctx, ()).await,
            Commands::ServerStatus => ServerStatusCommand::new().run(ctx, ()).await,
            Commands::Connect(args) => ConnectCommand::connect().run(ctx, args).await,
            Commands::Disconnect(args) => ConnectCommand::disconnect().run(ctx, args).await,
            Commands::Pair(args) => PairCommand::new().run(ctx, args).await,
            Commands::Features(args) => FeaturesCommand::new().run(ctx, args).await,
            Commands::Shell(args) => ShellCommand::new().run(ctx, args).await,
            Commands::Ls(args) => LsCommand::new().run(ctx, args).await,
            Commands::Stat(args) => StatCommand::new().run(ctx, args).await,
            Commands::Push(args) => PushCommand::new().run(ctx, args).await,
            Commands::Pull(args) => PullCommand::new().run(ctx, args).await,
            Commands::Forward(args) => ForwardCommand::new().run(ctx, args).await,
            Commands::Reverse(args) => ReverseCommand::new().run(ctx, args).await,
            Commands::Reboot(args) => RebootCommand::new().run(ctx, args).await,
            Commands::Root(args) => RootCommand::root().run(ctx, args).await,
            Commands::Unroot(args) => RootCommand::unroot().run(ctx, args).await,
            Commands::Install(args) => InstallCommand::new().run(ctx, args).await,
            Commands::Uninstall(args) => UninstallCommand::new().run(ctx, args).await,
            Commands::Framebuffer(args) => FramebufferCommand::new().run(ctx, args).await,
        }
    }
}
