use crate::core::OutputFormat;
use crate::error::Result;
use colored::*;
use comfy_table::Table;
use serde::Serialize;

/// Prints command results as a table, JSON or plain text.
pub struct OutputFormatter {
    format: OutputFormat,
    color_enabled: bool,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            color_enabled: true,
            quiet: false,
        }
    }

    pub fn with_color(mut self, enabled: bool) -> Self {
        self.color_enabled = enabled;
        self
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Print `items` in the selected format.
    pub fn list<T>(&self, items: &[T]) -> Result<()>
    where
        T: TableFormat + PlainFormat + Serialize,
    {
        match self.format {
            OutputFormat::Table => self.table(items),
            OutputFormat::Json => self.json(items),
            OutputFormat::Plain => self.plain(items),
        }
    }

    pub fn table<T: TableFormat>(&self, items: &[T]) -> Result<()> {
        if self.quiet {
            return Ok(());
        }
        println!("{}", render_table(items));
        Ok(())
    }

    pub fn json<T: Serialize + ?Sized>(&self, items: &T) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if self.color_enabled {
            crate::utils::print_colored_json(items)?;
        } else {
            println!("{}", serde_json::to_string_pretty(items)?);
        }
        Ok(())
    }

    pub fn plain<T: PlainFormat>(&self, items: &[T]) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        for item in items {
            println!("{}", item.plain());
        }
        Ok(())
    }

    /// A server or device message: JSON wraps it as `{"message": ...}`.
    pub fn message(&self, msg: &str) -> Result<()> {
        if self.format == OutputFormat::Json {
            return self.json(&serde_json::json!({ "message": msg }));
        }
        if !self.quiet {
            println!("{}", msg);
        }
        Ok(())
    }

    pub fn success(&self, msg: &str) -> Result<()> {
        if self.quiet || self.format == OutputFormat::Json {
            return Ok(());
        }
        if self.color_enabled {
            println!("{} {}", "✓".green(), msg);
        } else {
            println!("{}", msg);
        }
        Ok(())
    }

    pub fn warning(&self, msg: &str) {
        if self.quiet {
            return;
        }
        if self.color_enabled {
            eprintln!("{}", msg.bright_yellow());
        } else {
            eprintln!("WARNING: {}", msg);
        }
    }

    pub fn error(&self, msg: &str) {
        if self.color_enabled {
            eprintln!("{} {}", "error:".bright_red().bold(), msg);
        } else {
            eprintln!("error: {}", msg);
        }
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Table)
    }
}

/// Trait for types that can be formatted as a table
pub trait TableFormat {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

/// Trait for types that can be formatted as plain text
pub trait PlainFormat {
    fn plain(&self) -> String;
}

impl<T: ToString> PlainFormat for T {
    fn plain(&self) -> String {
        self.to_string()
    }
}

pub fn render_table<T: TableFormat>(items: &[T]) -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::NOTHING);
    table.set_header(T::headers());
    for item in items {
        table.add_row(item.row());
    }
    table
}

pub mod device;
pub mod file;
pub mod forward;

pub use file::format_size;

#[cfg(test)]
mod output_test;
