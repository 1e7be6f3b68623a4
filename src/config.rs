use crate::adb::client::AdbClient;
use crate::adb::protocol::{DATA_HEADER_SIZE, DEFAULT_MAX_BUFFER_SIZE, DEFAULT_RECEIVE_BUFFER_SIZE};
use crate::core::{ServerEndpoint, DEFAULT_ADB_HOST, DEFAULT_ADB_PORT};
use crate::error::{AdbError, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE_NAME: &str = ".adb-bridge.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub sync: SyncConfig,
}

/// `[server]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_ADB_HOST.to_string(),
            port: DEFAULT_ADB_PORT,
            read_timeout_secs: None,
        }
    }
}

/// `[sync]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub max_buffer_size: usize,
    pub receive_buffer_size: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
            receive_buffer_size: DEFAULT_RECEIVE_BUFFER_SIZE,
        }
    }
}

impl Config {
    /// Load `~/.adb-bridge.toml`, falling back to defaults when it is absent.
    pub fn load() -> Result<Self> {
        match Self::get_config_path() {
            Some(path) => Self::load_from_path(&path),
            None => {
                debug!("No home directory, using default config");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        debug!("Loading config from: {:?}", path);

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        debug!("Parsed config: {:?}", config);
        Ok(config)
    }

    pub fn get_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
    }

    fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(AdbError::Config("server.host must not be empty".into()));
        }
        if self.sync.max_buffer_size <= DATA_HEADER_SIZE {
            return Err(AdbError::Config(format!(
                "sync.max_buffer_size must be larger than {} bytes",
                DATA_HEADER_SIZE
            )));
        }
        if self.sync.receive_buffer_size == 0 {
            return Err(AdbError::Config("sync.receive_buffer_size must not be zero".into()));
        }
        Ok(())
    }

    pub fn endpoint(&self) -> ServerEndpoint {
        ServerEndpoint::new(self.server.host.clone(), self.server.port)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.server.read_timeout_secs.map(Duration::from_secs)
    }

    /// Blocking client for the configured server.
    pub fn client(&self) -> AdbClient {
        AdbClient::new(self.endpoint())
            .with_read_timeout(self.read_timeout())
            .with_receive_buffer_size(self.sync.receive_buffer_size)
            .with_max_buffer_size(self.sync.max_buffer_size)
    }
}
