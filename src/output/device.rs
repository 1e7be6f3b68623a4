use crate::core::DeviceData;
use crate::output::{PlainFormat, TableFormat};

impl TableFormat for DeviceData {
    fn headers() -> Vec<&'static str> {
        vec!["SERIAL", "STATE", "MODEL", "PRODUCT", "TRANSPORT"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.serial.to_string(),
            self.state.to_string(),
            self.model.clone().unwrap_or_default(),
            self.product.clone().unwrap_or_default(),
            self.transport_id.map(|id| id.to_string()).unwrap_or_default(),
        ]
    }
}

/// Same layout as `adb devices`
impl PlainFormat for DeviceData {
    fn plain(&self) -> String {
        format!("{}\t{}", self.serial, self.state)
    }
}
