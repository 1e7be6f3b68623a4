use crate::adb::FileStatistics;
use crate::output::{PlainFormat, TableFormat};

/// Format size in human-readable format
pub fn format_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "K", "M", "G", "T"];

    let mut value = size as f64;
    let mut unit_index = 0;
    while value >= 1024.0 && unit_index < UNITS.len() - 1 {
        value /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{}{}", size, UNITS[0])
    } else {
        format!("{:.1}{}", value, UNITS[unit_index])
    }
}

fn modified(stats: &FileStatistics) -> String {
    stats.time.format("%Y-%m-%d %H:%M").to_string()
}

impl TableFormat for FileStatistics {
    fn headers() -> Vec<&'static str> {
        vec!["MODE", "SIZE", "MODIFIED", "NAME"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.file_mode.to_mode_string(),
            format_size(self.size as u64),
            modified(self),
            self.path.clone(),
        ]
    }
}

impl PlainFormat for FileStatistics {
    fn plain(&self) -> String {
        format!(
            "{} {:>10} {} {}",
            self.file_mode.to_mode_string(),
            self.size,
            modified(self),
            self.path
        )
    }
}
