pub mod async_socket;
pub mod async_sync;
pub mod client;
pub mod framebuffer;
pub mod protocol;
pub mod receiver;
pub mod request;
pub mod server;
pub mod shell;
pub mod socket;
pub mod sync;
pub mod transport;

pub use async_socket::AsyncAdbSocket;
pub use async_sync::AsyncSyncService;
pub use client::AdbClient;
pub use framebuffer::{ColorChannel, Framebuffer, FramebufferHeader};
pub use protocol::{AdbResponse, FileStatistics, SyncCommand, UnixFileMode, UnixFileType};
pub use receiver::{
    CollectingReceiver, CommandExecutor, LineExecutor, ShellOutputReceiver, StreamExecutor,
};
pub use request::{form_forward_request, form_request};
pub use server::{AdbServer, AdbServerStatus};
pub use shell::ShellCommand;
pub use socket::AdbSocket;
pub use sync::{ProgressCallback, SyncService};
pub use transport::{
    AsyncTransport, Connector, TcpConnector, TcpTransport, TokioTcpTransport, Transport,
};

#[cfg(test)]
mod async_socket_test;
#[cfg(test)]
mod framebuffer_test;
#[cfg(test)]
mod shell_test;
