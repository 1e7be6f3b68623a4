use crate::commands::SubCommand;
use crate::core::context::CommandContext;
use crate::error::Result;
use async_trait::async_trait;

pub struct DevicesCommand;

#[derive(Debug, Clone, Default, clap::Args)]
pub struct DevicesArgs {
    /// Only list devices that are ready for commands
    #[arg(long)]
    pub available: bool,
}

impl DevicesCommand {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SubCommand for DevicesCommand {
    type Args = DevicesArgs;

    async fn run(&self, ctx: &CommandContext, args: Self::Args) -> Result<()> {
        let mut devices = ctx.device_manager().list_devices()?;
        if args.available {
            devices.retain(|d| d.is_available());
        }
        ctx.formatter().list(&devices)
    }
}
