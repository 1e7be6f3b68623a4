use crate::adb::AdbServer;
use crate::commands::SubCommand;
use crate::core::context::CommandContext;
use crate::core::OutputFormat;
use crate::error::Result;
use async_trait::async_trait;
use colored::*;
use serde_json::json;

pub struct VersionCommand;

impl VersionCommand {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SubCommand for VersionCommand {
    type Args = ();

    async fn run(&self, ctx: &CommandContext, _args: ()) -> Result<()> {
        let version = ctx.client().get_adb_version()?;
        let formatter = ctx.formatter();
        match ctx.output_format {
            OutputFormat::Json => formatter.json(&json!({
                "client": env!("CARGO_PKG_VERSION"),
                "server": version,
            })),
            _ => formatter.message(&format!(
                "adb-bridge {}\nAndroid Debug Bridge protocol version {}",
                env!("CARGO_PKG_VERSION"),
                version
            )),
        }
    }
}

pub struct KillServerCommand;

impl KillServerCommand {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SubCommand for KillServerCommand {
    type Args = ();

    async fn run(&self, ctx: &CommandContext, _args: ()) -> Result<()> {
        ctx.client().kill_adb()?;
        ctx.formatter().success("ADB server stopped")
    }
}

pub struct ServerStatusCommand;

impl ServerStatusCommand {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SubCommand for ServerStatusCommand {
    type Args = ();

    async fn run(&self, ctx: &CommandContext, _args: ()) -> Result<()> {
        let endpoint = ctx.config.endpoint();
        let status = AdbServer::status(&endpoint).await?;

        if ctx.output_format == OutputFormat::Json {
            return ctx.formatter().json(&status);
        }

        let line = match status.version {
            Some(version) if status.running => format!(
                "{} ADB server is running on {} (version {})",
                "●".green(),
                endpoint,
                version
            ),
            _ => format!("{} ADB server is not running on {}", "●".red(), endpoint),
        };
        ctx.formatter().message(&line)
    }
}
