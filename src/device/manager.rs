use crate::adb::client::AdbClient;
use crate::adb::transport::{Connector, TcpConnector};
use crate::core::DeviceData;
use crate::error::{AdbError, Result};
use log::debug;

/// Device discovery and selection on top of an [`AdbClient`].
#[derive(Clone)]
pub struct DeviceManager<C: Connector = TcpConnector> {
    client: AdbClient<C>,
}

impl Default for DeviceManager {
    fn default() -> Self {
        Self::new(AdbClient::default())
    }
}

impl<C: Connector> DeviceManager<C> {
    pub fn new(client: AdbClient<C>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &AdbClient<C> {
        &self.client
    }

    /// List all devices the server knows about, in any state.
    pub fn list_devices(&self) -> Result<Vec<DeviceData>> {
        let devices = self.client.get_devices()?;
        debug!("Found {} devices", devices.len());
        Ok(devices)
    }

    /// Find a device by partial, case-insensitive serial match
    pub fn find_device(&self, partial_id: &str) -> Result<DeviceData> {
        let needle = partial_id.to_lowercase();
        let mut matches: Vec<DeviceData> = self
            .list_devices()?
            .into_iter()
            .filter(|d| d.serial.as_str().to_lowercase().contains(&needle))
            .collect();

        match matches.len() {
            0 => Err(AdbError::DeviceNotFound(partial_id.to_string())),
            1 => Ok(matches.remove(0)),
            n => Err(AdbError::InvalidArgument(format!(
                "'{}' matches {} devices: {}",
                partial_id,
                n,
                matches
                    .iter()
                    .map(|d| d.serial.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }

    /// The only connected device; an error if there are none or several.
    pub fn get_single_device(&self) -> Result<DeviceData> {
        let mut devices = self.list_devices()?;

        match devices.len() {
            0 => Err(AdbError::DeviceNotFound("no devices/emulators found".to_string())),
            1 => Ok(devices.remove(0)),
            _ => Err(AdbError::InvalidArgument(
                "more than one device connected, pass a device serial".to_string(),
            )),
        }
    }

    /// Get target device - uses device_id if provided, otherwise requires single device
    pub fn get_target_device(&self, device_id: Option<&str>) -> Result<DeviceData> {
        match device_id {
            Some(id) => self.find_device(id),
            None => self.get_single_device(),
        }
    }
}
