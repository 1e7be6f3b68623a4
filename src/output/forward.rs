use crate::core::ForwardData;
use crate::output::TableFormat;

impl TableFormat for ForwardData {
    fn headers() -> Vec<&'static str> {
        vec!["SERIAL", "LOCAL", "REMOTE"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.serial.clone(), self.local.clone(), self.remote.clone()]
    }
}
