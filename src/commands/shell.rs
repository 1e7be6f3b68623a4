use crate::adb::shell::ShellCommand as RemoteShell;
use crate::commands::SubCommand;
use crate::core::context::CommandContext;
use crate::error::{AdbError, Result};
use async_trait::async_trait;
use log::debug;
use std::io::{self, Write};

pub struct ShellCommand;

#[derive(Debug, Clone, clap::Args)]
pub struct ShellArgs {
    /// Command to execute on the device
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

impl ShellCommand {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SubCommand for ShellCommand {
    type Args = ShellArgs;

    async fn run(&self, ctx: &CommandContext, args: Self::Args) -> Result<()> {
        let serial = ctx.target_serial()?;
        let shell = RemoteShell::new(args.command.join(" ")).with_device(serial);

        let token = shell.cancellation_token();
        let watcher = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                debug!("Interrupted, cancelling shell command");
                token.cancel();
            }
        });

        let mut stdout = io::stdout();
        let mut print_line = |line: &str| writeln!(stdout, "{}", line).is_ok();
        let result = shell.stream(&ctx.config.endpoint(), &mut print_line).await;
        watcher.abort();

        match result {
            // Ctrl-C ends the command quietly
            Err(AdbError::Cancelled) => Ok(()),
            other => other,
        }
    }
}
