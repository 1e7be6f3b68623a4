use crate::commands::SubCommand;
use crate::core::context::CommandContext;
use crate::core::ForwardSpec;
use crate::error::Result;
use async_trait::async_trait;
use clap::Subcommand;
use log::debug;

#[derive(Subcommand, Clone, Debug)]
pub enum ForwardAction {
    /// Create a forward, e.g. `add tcp:0 tcp:8080`
    Add {
        /// Listening side (`tcp:0` asks the server to pick a port)
        listen: ForwardSpec,

        /// Side the connection is forwarded to
        connect: ForwardSpec,

        /// Fail if the listening side is already forwarded
        #[arg(long)]
        no_rebind: bool,
    },

    /// List active forwards
    List,

    /// Remove one forward
    Remove {
        /// Listening side of the forward to remove
        listen: ForwardSpec,
    },

    /// Remove every forward of the device
    RemoveAll,
}

#[derive(Debug, Clone, clap::Args)]
pub struct ForwardArgs {
    #[command(subcommand)]
    pub action: ForwardAction,
}

#[derive(Debug, Clone, clap::Args)]
pub struct ReverseArgs {
    #[command(subcommand)]
    pub action: ForwardAction,
}

fn report_created(ctx: &CommandContext, listen: &ForwardSpec, connect: &ForwardSpec, port: Option<u16>) -> Result<()> {
    let formatter = ctx.formatter();
    match port {
        Some(port) => {
            debug!("Server allocated port {}", port);
            formatter.message(&port.to_string())
        }
        None => formatter.success(&format!("{} -> {}", listen, connect)),
    }
}

/// Host-to-device forwards
pub struct ForwardCommand;

impl ForwardCommand {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SubCommand for ForwardCommand {
    type Args = ForwardArgs;

    async fn run(&self, ctx: &CommandContext, args: Self::Args) -> Result<()> {
        let serial = ctx.target_serial()?;
        let client = ctx.client();

        match args.action {
            ForwardAction::Add {
                listen,
                connect,
                no_rebind,
            } => {
                let port = client.create_forward(&serial, &listen, &connect, !no_rebind)?;
                report_created(ctx, &listen, &connect, port)
            }
            ForwardAction::List => ctx.formatter().list(&client.list_forward(&serial)?),
            ForwardAction::Remove { listen } => {
                client.remove_forward(&serial, &listen)?;
                ctx.formatter().success(&format!("Removed forward {}", listen))
            }
            ForwardAction::RemoveAll => {
                client.remove_all_forwards(&serial)?;
                ctx.formatter().success("Removed all forwards")
            }
        }
    }
}

/// Device-to-host forwards. `listen` is on the device, `connect` on the host.
pub struct ReverseCommand;

impl ReverseCommand {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SubCommand for ReverseCommand {
    type Args = ReverseArgs;

    async fn run(&self, ctx: &CommandContext, args: Self::Args) -> Result<()> {
        let serial = ctx.target_serial()?;
        let client = ctx.client();

        match args.action {
            ForwardAction::Add {
                listen,
                connect,
                no_rebind,
            } => {
                let port = client.create_reverse_forward(&serial, &listen, &connect, !no_rebind)?;
                report_created(ctx, &listen, &connect, port)
            }
            ForwardAction::List => ctx.formatter().list(&client.list_reverse_forward(&serial)?),
            ForwardAction::Remove { listen } => {
                client.remove_reverse_forward(&serial, &listen)?;
                ctx.formatter().success(&format!("Removed reverse forward {}", listen))
            }
            ForwardAction::RemoveAll => {
                client.remove_all_reverse_forwards(&serial)?;
                ctx.formatter().success("Removed all reverse forwards")
            }
        }
    }
}
