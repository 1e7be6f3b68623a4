pub mod context;
pub mod endpoint;
pub mod forward;
pub mod types;

pub use endpoint::{ServerEndpoint, DEFAULT_ADB_HOST, DEFAULT_ADB_PORT};
pub use forward::{ForwardData, ForwardSpec};
pub use types::{
    DeviceData, DeviceSerial, DeviceState, OutputFormat, TransferDirection, TransferProgress,
};
