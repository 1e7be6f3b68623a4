use crate::adb::client::AdbClient;
use crate::config::Config;
use crate::core::types::{DeviceSerial, OutputFormat};
use crate::device::DeviceManager;
use crate::error::Result;
use crate::output::OutputFormatter;
use crate::progress::ProgressFactory;

/// Shared context for all commands
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: Config,
    /// Serial (or part of one) given on the command line
    pub device: Option<String>,
    pub output_format: OutputFormat,
    pub quiet: bool,
}

impl CommandContext {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            device: None,
            output_format: OutputFormat::Table,
            quiet: false,
        }
    }

    pub fn client(&self) -> AdbClient {
        self.config.client()
    }

    pub fn device_manager(&self) -> DeviceManager {
        DeviceManager::new(self.client())
    }

    /// Resolve the device a command should run on.
    ///
    /// A `--serial` argument may be partial; without one exactly one device
    /// must be connected.
    pub fn target_serial(&self) -> Result<DeviceSerial> {
        let device = self
            .device_manager()
            .get_target_device(self.device.as_deref())?;
        Ok(device.serial)
    }

    pub fn formatter(&self) -> OutputFormatter {
        OutputFormatter::new(self.output_format).with_quiet(self.quiet)
    }

    /// Check if progress/status messages should be shown
    /// Returns false if quiet mode is enabled or output format is JSON
    pub fn should_show_progress(&self) -> bool {
        !self.quiet && self.output_format != OutputFormat::Json
    }

    pub fn progress(&self) -> ProgressFactory {
        ProgressFactory::new(self.should_show_progress())
    }
}

impl Default for CommandContext {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Builder for creating command contexts
pub struct CommandContextBuilder {
    ctx: CommandContext,
}

impl CommandContextBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            ctx: CommandContext::new(config),
        }
    }

    pub fn device(mut self, device: Option<String>) -> Self {
        self.ctx.device = device;
        self
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.ctx.output_format = format;
        self
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.ctx.quiet = quiet;
        self
    }

    pub fn build(self) -> CommandContext {
        self.ctx
    }
}
