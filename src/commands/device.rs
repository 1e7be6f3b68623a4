use crate::commands::SubCommand;
use crate::core::context::CommandContext;
use crate::core::OutputFormat;
use crate::error::Result;
use async_trait::async_trait;
use log::info;

#[derive(Debug, Clone, Default, clap::Args)]
pub struct FeaturesArgs {}

pub struct FeaturesCommand;

impl FeaturesCommand {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SubCommand for FeaturesCommand {
    type Args = FeaturesArgs;

    async fn run(&self, ctx: &CommandContext, _args: Self::Args) -> Result<()> {
        let serial = ctx.target_serial()?;
        let features = ctx.client().get_features(&serial)?;
        let formatter = ctx.formatter();
        match ctx.output_format {
            OutputFormat::Json => formatter.json(&features),
            _ => formatter.plain(&features),
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RebootTarget {
    System,
    Bootloader,
    Recovery,
    Sideload,
    SideloadAutoReboot,
    Fastboot,
}

impl RebootTarget {
    /// Argument of the `reboot:` service; empty for a normal boot.
    pub fn service_arg(&self) -> &'static str {
        match self {
            RebootTarget::System => "",
            RebootTarget::Bootloader => "bootloader",
            RebootTarget::Recovery => "recovery",
            RebootTarget::Sideload => "sideload",
            RebootTarget::SideloadAutoReboot => "sideload-auto-reboot",
            RebootTarget::Fastboot => "fastboot",
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub struct RebootArgs {
    /// Where to boot into
    #[arg(value_enum, default_value_t = RebootTarget::System)]
    pub target: RebootTarget,
}

pub struct RebootCommand;

impl RebootCommand {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SubCommand for RebootCommand {
    type Args = RebootArgs;

    async fn run(&self, ctx: &CommandContext, args: Self::Args) -> Result<()> {
        let serial = ctx.target_serial()?;
        ctx.client().reboot(args.target.service_arg(), &serial)?;
        ctx.formatter().success(&format!("Rebooting {}", serial))
    }
}

#[derive(Debug, Clone, Default, clap::Args)]
pub struct RootArgs {}

/// Handles both `root` and `unroot`.
pub struct RootCommand {
    unroot: bool,
}

impl RootCommand {
    pub fn root() -> Self {
        Self { unroot: false }
    }

    pub fn unroot() -> Self {
        Self { unroot: true }
    }
}

#[async_trait]
impl SubCommand for RootCommand {
    type Args = RootArgs;

    async fn run(&self, ctx: &CommandContext, _args: Self::Args) -> Result<()> {
        let serial = ctx.target_serial()?;
        let client = ctx.client();
        let message = if self.unroot {
            client.unroot(&serial)?
        } else {
            client.root(&serial)?
        };
        info!("adbd on {} answered: {}", serial, message);
        ctx.formatter().message(&message)
    }
}
