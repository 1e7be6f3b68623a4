use crate::commands::SubCommand;
use crate::core::context::CommandContext;
use crate::error::{AdbError, Result};
use crate::utils::expand_path;
use async_trait::async_trait;
use log::info;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Debug, Clone, clap::Args)]
pub struct InstallArgs {
    /// Path to the APK
    pub apk: String,

    /// Replace an existing application
    #[arg(short = 'r', long)]
    pub replace: bool,

    /// Grant all runtime permissions
    #[arg(short = 'g', long)]
    pub grant: bool,

    /// Allow a version code downgrade
    #[arg(short = 'd', long)]
    pub downgrade: bool,

    /// Allow test packages
    #[arg(short = 't', long)]
    pub test: bool,
}

impl InstallArgs {
    /// Options passed through to the package manager.
    pub fn pm_arguments(&self) -> Vec<&'static str> {
        [
            (self.replace, "-r"),
            (self.grant, "-g"),
            (self.downgrade, "-d"),
            (self.test, "-t"),
        ]
        .into_iter()
        .filter_map(|(set, flag)| set.then_some(flag))
        .collect()
    }
}

pub struct InstallCommand;

impl InstallCommand {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SubCommand for InstallCommand {
    type Args = InstallArgs;

    async fn run(&self, ctx: &CommandContext, args: Self::Args) -> Result<()> {
        let path = PathBuf::from(expand_path(&args.apk));
        if !path.is_file() {
            return Err(AdbError::InvalidArgument(format!(
                "'{}' is not a file",
                path.display()
            )));
        }

        let serial = ctx.target_serial()?;
        let mut apk = BufReader::new(File::open(&path)?);
        ctx.client().install(&serial, &mut apk, &args.pm_arguments())?;

        info!("Installed {} on {}", path.display(), serial);
        ctx.formatter().success(&format!("Installed {}", path.display()))
    }
}

#[derive(Debug, Clone, clap::Args)]
pub struct UninstallArgs {
    /// Package name, e.g. com.example.app
    pub package: String,

    /// Keep the data and cache directories
    #[arg(short = 'k', long)]
    pub keep_data: bool,
}

pub struct UninstallCommand;

impl UninstallCommand {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SubCommand for UninstallCommand {
    type Args = UninstallArgs;

    async fn run(&self, ctx: &CommandContext, args: Self::Args) -> Result<()> {
        let serial = ctx.target_serial()?;
        let arguments: &[&str] = if args.keep_data { &["-k"] } else { &[] };
        ctx.client().uninstall(&serial, &args.package, arguments)?;
        ctx.formatter().success(&format!("Uninstalled {}", args.package))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pm_arguments_keep_flag_order() {
        let args = InstallArgs {
            apk: "app.apk".to_string(),
            replace: true,
            grant: false,
            downgrade: true,
            test: true,
        };
        assert_eq!(args.pm_arguments(), vec!["-r", "-d", "-t"]);
    }
}
