use crate::adb::FramebufferHeader;
use crate::commands::SubCommand;
use crate::core::context::CommandContext;
use crate::core::OutputFormat;
use crate::error::Result;
use crate::utils::expand_path;
use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, clap::Args)]
pub struct FramebufferArgs {
    /// Write the raw pixel data to this file
    #[arg(short = 'O', long = "out")]
    pub output: Option<PathBuf>,
}

/// One-line summary of a framebuffer header.
pub fn describe(header: &FramebufferHeader) -> String {
    format!(
        "{}x{} {} bpp, {} bytes (v{}, rgba offsets {}/{}/{}/{})",
        header.width,
        header.height,
        header.bpp,
        header.size,
        header.version,
        header.red.offset,
        header.green.offset,
        header.blue.offset,
        header.alpha.offset
    )
}

pub struct FramebufferCommand;

impl FramebufferCommand {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SubCommand for FramebufferCommand {
    type Args = FramebufferArgs;

    async fn run(&self, ctx: &CommandContext, args: Self::Args) -> Result<()> {
        let serial = ctx.target_serial()?;
        let framebuffer = ctx.client().get_framebuffer(&serial)?;
        if let Some(output) = &args.output {
            let path = PathBuf::from(expand_path(&output.to_string_lossy()));
            fs::write(&path, &framebuffer.data)?;
            ctx.formatter()
                .success(&format!("Wrote {} bytes to {}", framebuffer.data.len(), path.display()))?;
        }

        let formatter = ctx.formatter();
        match ctx.output_format {
            OutputFormat::Json => formatter.json(&framebuffer.header),
            _ => formatter.message(&describe(&framebuffer.header)),
        }
    }
}
