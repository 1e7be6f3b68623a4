use crate::error::{AdbError, Result};
use log::*;
use std::io::{self, BufRead, BufReader, Read, Write};

/// Consumes shell output one line at a time.
pub trait ShellOutputReceiver: Send {
    /// Handle one line without its terminator. Return `false` to stop reading.
    fn add_output(&mut self, line: &str) -> bool;

    /// Called once after the last line.
    fn flush(&mut self) {}
}

impl<F> ShellOutputReceiver for F
where
    F: FnMut(&str) -> bool + Send,
{
    fn add_output(&mut self, line: &str) -> bool {
        self(line)
    }
}

/// Keeps every line it receives.
#[derive(Debug, Default, Clone)]
pub struct CollectingReceiver {
    lines: Vec<String>,
    flushed: bool,
}

impl CollectingReceiver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_flushed(&self) -> bool {
        self.flushed
    }

    /// All lines joined with `\n`.
    pub fn output(&self) -> String {
        self.lines.join("\n")
    }
}

impl ShellOutputReceiver for CollectingReceiver {
    fn add_output(&mut self, line: &str) -> bool {
        self.lines.push(line.to_string());
        true
    }

    fn flush(&mut self) {
        self.flushed = true;
    }
}

/// How the raw stream of a `shell:` or `exec:` command is consumed
/// once the server has acknowledged it.
pub trait CommandExecutor {
    fn execute(&mut self, stream: &mut dyn Read) -> Result<()>;
}

/// Splits output into lines for a [`ShellOutputReceiver`].
///
/// Any read error ends the command with [`AdbError::Unresponsive`].
pub struct LineExecutor<'a> {
    receiver: &'a mut dyn ShellOutputReceiver,
}

impl<'a> LineExecutor<'a> {
    pub fn new(receiver: &'a mut dyn ShellOutputReceiver) -> Self {
        Self { receiver }
    }
}

impl CommandExecutor for LineExecutor<'_> {
    fn execute(&mut self, stream: &mut dyn Read) -> Result<()> {
        let mut reader = BufReader::new(stream);
        let mut raw = Vec::new();

        loop {
            raw.clear();
            let read = reader
                .read_until(b'\n', &mut raw)
                .map_err(AdbError::Unresponsive)?;
            if read == 0 {
                break;
            }

            let line = String::from_utf8_lossy(&raw);
            if !self.receiver.add_output(line.trim_end_matches(['\r', '\n'])) {
                debug!("Receiver stopped reading shell output");
                break;
            }
        }

        self.receiver.flush();
        Ok(())
    }
}

/// Copies the output bytes unchanged into a writer.
pub struct StreamExecutor<W: Write> {
    destination: W,
    copied: u64,
}

impl<W: Write> StreamExecutor<W> {
    pub fn new(destination: W) -> Self {
        Self {
            destination,
            copied: 0,
        }
    }

    pub fn bytes_copied(&self) -> u64 {
        self.copied
    }

    pub fn into_inner(self) -> W {
        self.destination
    }
}

impl<W: Write> CommandExecutor for StreamExecutor<W> {
    fn execute(&mut self, stream: &mut dyn Read) -> Result<()> {
        self.copied += io::copy(stream, &mut self.destination)?;
        self.destination.flush()?;
        Ok(())
    }
}
