use crate::core::context::CommandContext;
use crate::error::Result;
use async_trait::async_trait;

/// Base trait for all subcommands
#[async_trait]
pub trait SubCommand {
    type Args: Send + 'static;

    async fn run(&self, ctx: &CommandContext, args: Self::Args) -> Result<()>;
}

pub mod device;
pub mod devices;
pub mod files;
pub mod forward;
pub mod framebuffer;
pub mod network;
pub mod package;
pub mod runner;
pub mod server;
pub mod shell;

#[cfg(test)]
mod files_test;
