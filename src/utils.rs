use crate::error::Result;
use colored::*;
use serde::Serialize;

/// Pretty-print `data` as JSON with the keys highlighted.
pub fn print_colored_json<T: Serialize + ?Sized>(data: &T) -> Result<()> {
    println!("{}", colorize_json(&serde_json::to_string_pretty(data)?));
    Ok(())
}

fn colorize_json(json: &str) -> String {
    json.lines()
        .map(|line| {
            let indent = line.len() - line.trim_start().len();
            let body = line.trim_start();
            // Only `"key": value` lines are coloured; string values may contain ':'
            match body.strip_prefix('"').and_then(|rest| rest.split_once("\": ")) {
                Some((key, value)) => {
                    format!("{}{}: {}", " ".repeat(indent), format!("\"{}\"", key).cyan(), value)
                }
                None => line.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Expand `~` and environment variables in a local path argument.
pub fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .map(|expanded| expanded.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
