use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Strongly typed device serial number
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceSerial(String);

impl DeviceSerial {
    pub fn new(serial: impl Into<String>) -> Self {
        Self(serial.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceSerial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for DeviceSerial {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DeviceSerial {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Connection state reported by the server for a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceState {
    Offline,
    Bootloader,
    /// Reported as `device` on the wire
    #[serde(rename = "device")]
    Online,
    Host,
    Recovery,
    #[serde(rename = "no permissions")]
    NoPermissions,
    Sideload,
    Unauthorized,
    Authorizing,
    Connecting,
    Unknown,
}

impl DeviceState {
    pub fn as_str(&self) -> &str {
        match self {
            DeviceState::Offline => "offline",
            DeviceState::Bootloader => "bootloader",
            DeviceState::Online => "device",
            DeviceState::Host => "host",
            DeviceState::Recovery => "recovery",
            DeviceState::NoPermissions => "no permissions",
            DeviceState::Sideload => "sideload",
            DeviceState::Unauthorized => "unauthorized",
            DeviceState::Authorizing => "authorizing",
            DeviceState::Connecting => "connecting",
            DeviceState::Unknown => "unknown",
        }
    }
}

impl From<&str> for DeviceState {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "offline" => DeviceState::Offline,
            "bootloader" => DeviceState::Bootloader,
            "device" | "online" => DeviceState::Online,
            "host" => DeviceState::Host,
            "recovery" => DeviceState::Recovery,
            "no permissions" => DeviceState::NoPermissions,
            "sideload" => DeviceState::Sideload,
            "unauthorized" => DeviceState::Unauthorized,
            "authorizing" => DeviceState::Authorizing,
            "connecting" => DeviceState::Connecting,
            _ => DeviceState::Unknown,
        }
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

lazy_static! {
    static ref DEVICE_LINE: Regex =
        Regex::new(r"^(?P<serial>\S+)\s+(?P<state>no permissions|\S+)(?P<rest>.*)$").unwrap();
}

/// A device as reported by `host:devices-l` or `host:track-devices`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceData {
    pub serial: DeviceSerial,
    pub state: DeviceState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    /// The `device:` field of the listing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usb: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_id: Option<u32>,
    /// Free text the server appended to the state, e.g. for `no permissions`
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl DeviceData {
    pub fn new(serial: impl Into<DeviceSerial>, state: DeviceState) -> Self {
        Self {
            serial: serial.into(),
            state,
            model: None,
            product: None,
            name: None,
            features: None,
            usb: None,
            transport_id: None,
            message: String::new(),
        }
    }

    /// Parse one record of either device-list format.
    ///
    /// Returns `None` for blank or unrecognisable lines.
    pub fn parse_line(line: &str) -> Option<Self> {
        let caps = DEVICE_LINE.captures(line.trim())?;
        let mut device = DeviceData::new(&caps["serial"], DeviceState::from(&caps["state"]));

        let mut message = Vec::new();
        for token in caps["rest"].split_whitespace() {
            match token.split_once(':') {
                Some(("usb", v)) => device.usb = Some(v.to_string()),
                Some(("product", v)) => device.product = Some(v.to_string()),
                Some(("model", v)) => device.model = Some(v.to_string()),
                Some(("device", v)) => device.name = Some(v.to_string()),
                Some(("features", v)) => device.features = Some(v.to_string()),
                Some(("transport_id", v)) => device.transport_id = v.parse().ok(),
                _ => message.push(token),
            }
        }
        device.message = message.join(" ");

        Some(device)
    }

    /// Parse a whole device-list payload.
    pub fn parse_list(payload: &str) -> Vec<Self> {
        payload.lines().filter_map(Self::parse_line).collect()
    }

    /// Check if device is available for commands
    pub fn is_available(&self) -> bool {
        self.state == DeviceState::Online
    }

    pub fn display_name(&self) -> String {
        if let Some(model) = &self.model {
            format!("{} ({})", model, self.serial)
        } else {
            self.serial.to_string()
        }
    }
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Plain,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Plain => write!(f, "plain"),
        }
    }
}

/// File transfer direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferDirection {
    Push,
    Pull,
}

/// Progress information for file transfers
#[derive(Debug, Clone)]
pub struct TransferProgress {
    pub direction: TransferDirection,
    pub bytes_transferred: u64,
    /// Zero when the size of the source is unknown
    pub total_bytes: u64,
    pub file_path: String,
}

impl TransferProgress {
    pub fn new(direction: TransferDirection, file_path: impl Into<String>, total_bytes: u64) -> Self {
        Self {
            direction,
            bytes_transferred: 0,
            total_bytes,
            file_path: file_path.into(),
        }
    }

    /// Percentage complete, or `None` when the total is unknown.
    pub fn percentage(&self) -> Option<f64> {
        if self.total_bytes == 0 {
            None
        } else {
            Some((self.bytes_transferred as f64 / self.total_bytes as f64) * 100.0)
        }
    }
}
