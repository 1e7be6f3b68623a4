use crate::adb::framebuffer::{Framebuffer, FramebufferHeader};
use crate::adb::protocol::{DEFAULT_MAX_BUFFER_SIZE, DEFAULT_RECEIVE_BUFFER_SIZE};
use crate::adb::receiver::CommandExecutor;
use crate::adb::socket::AdbSocket;
use crate::adb::sync::{fill_chunk, stream_length, SyncService};
use crate::adb::transport::{Connector, TcpConnector, Transport};
use crate::core::{DeviceData, DeviceSerial, ForwardData, ForwardSpec, ServerEndpoint};
use crate::error::{AdbError, Result};
use log::*;
use std::io::{Read, Seek};
use std::time::Duration;

/// High level client for the ADB server.
///
/// Every operation opens its own connection, so a client can be shared
/// freely between sequential calls.
#[derive(Debug, Clone)]
pub struct AdbClient<C: Connector = TcpConnector> {
    connector: C,
    receive_buffer_size: usize,
    max_buffer_size: usize,
}

impl AdbClient<TcpConnector> {
    pub fn new(endpoint: ServerEndpoint) -> Self {
        Self::with_connector(TcpConnector::new(endpoint))
    }

    pub fn with_read_timeout(mut self, read_timeout: Option<Duration>) -> Self {
        self.connector = self.connector.with_read_timeout(read_timeout);
        self
    }

    pub fn endpoint(&self) -> &ServerEndpoint {
        self.connector.endpoint()
    }
}

impl Default for AdbClient<TcpConnector> {
    fn default() -> Self {
        Self::new(ServerEndpoint::default())
    }
}

impl<C: Connector> AdbClient<C> {
    pub fn with_connector(connector: C) -> Self {
        Self {
            connector,
            receive_buffer_size: DEFAULT_RECEIVE_BUFFER_SIZE,
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
        }
    }

    pub fn with_receive_buffer_size(mut self, size: usize) -> Self {
        self.receive_buffer_size = size;
        self
    }

    pub fn with_max_buffer_size(mut self, size: usize) -> Self {
        self.max_buffer_size = size;
        self
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Open a new connection to the server.
    pub fn open_socket(&self) -> Result<AdbSocket<C::Transport>> {
        let transport = self.connector.connect()?;
        Ok(AdbSocket::new(transport).with_receive_buffer_size(self.receive_buffer_size))
    }

    /// Open a connection and issue one host command, leaving the socket
    /// positioned after the `OKAY`.
    fn host_request(&self, command: &str) -> Result<AdbSocket<C::Transport>> {
        let mut socket = self.open_socket()?;
        socket.send_adb_request(command)?;
        socket.read_adb_response()?;
        Ok(socket)
    }

    /// Open a connection routed to `serial` and issue one device command.
    fn device_request(&self, serial: &DeviceSerial, command: &str) -> Result<AdbSocket<C::Transport>> {
        let mut socket = self.open_socket()?;
        socket.set_device(serial.as_str())?;
        socket.send_adb_request(command)?;
        socket.read_adb_response()?;
        Ok(socket)
    }

    // =========================================================================
    // Server
    // =========================================================================

    /// Protocol version of the running server.
    pub fn get_adb_version(&self) -> Result<u32> {
        let version = self.host_request("host:version")?.read_string()?;
        u32::from_str_radix(version.trim(), 16)
            .map_err(|_| AdbError::Protocol(format!("invalid server version {:?}", version)))
    }

    /// Ask the server to exit.
    pub fn kill_adb(&self) -> Result<()> {
        self.host_request("host:kill")?;
        info!("ADB server asked to exit");
        Ok(())
    }

    pub fn get_devices(&self) -> Result<Vec<DeviceData>> {
        let payload = self.host_request("host:devices-l")?.read_string()?;
        let devices = DeviceData::parse_list(&payload);
        debug!("Server reported {} devices", devices.len());
        Ok(devices)
    }

    /// Connect the server to a device over TCP/IP; returns the server's message.
    pub fn connect(&self, host: &str, port: u16) -> Result<String> {
        self.host_request(&format!("host:connect:{}:{}", host, port))?
            .read_string()
    }

    pub fn disconnect(&self, host: &str, port: u16) -> Result<String> {
        self.host_request(&format!("host:disconnect:{}:{}", host, port))?
            .read_string()
    }

    /// Pair with a device using a wireless debugging pairing code.
    pub fn pair(&self, code: &str, host: &str, port: u16) -> Result<String> {
        self.host_request(&format!("host:pair:{}:{}:{}", code, host, port))?
            .read_string()
    }

    // =========================================================================
    // Forwarding
    // =========================================================================

    /// Forward `local` on the host to `remote` on the device.
    ///
    /// Returns the port the server allocated when `local` is `tcp:0`.
    pub fn create_forward(
        &self,
        serial: &DeviceSerial,
        local: &ForwardSpec,
        remote: &ForwardSpec,
        allow_rebind: bool,
    ) -> Result<Option<u16>> {
        let rebind = if allow_rebind { "" } else { "norebind:" };
        let mut socket = self.host_request(&format!(
            "host-serial:{}:forward:{}{};{}",
            serial, rebind, local, remote
        ))?;
        // The server acknowledges the request and then the forward itself.
        socket.read_adb_response()?;
        read_allocated_port(&mut socket)
    }

    /// Forward `remote` on the device back to `local` on the host.
    pub fn create_reverse_forward(
        &self,
        serial: &DeviceSerial,
        remote: &ForwardSpec,
        local: &ForwardSpec,
        allow_rebind: bool,
    ) -> Result<Option<u16>> {
        let rebind = if allow_rebind { "" } else { "norebind:" };
        let mut socket = self.device_request(
            serial,
            &format!("reverse:forward:{}{};{}", rebind, remote, local),
        )?;
        socket.read_adb_response()?;
        read_allocated_port(&mut socket)
    }

    pub fn remove_forward(&self, serial: &DeviceSerial, local: &ForwardSpec) -> Result<()> {
        self.host_request(&format!("host-serial:{}:killforward:{}", serial, local))?;
        Ok(())
    }

    pub fn remove_all_forwards(&self, serial: &DeviceSerial) -> Result<()> {
        self.host_request(&format!("host-serial:{}:killforward-all", serial))?;
        Ok(())
    }

    pub fn remove_reverse_forward(&self, serial: &DeviceSerial, remote: &ForwardSpec) -> Result<()> {
        self.device_request(serial, &format!("reverse:killforward:{}", remote))?;
        Ok(())
    }

    pub fn remove_all_reverse_forwards(&self, serial: &DeviceSerial) -> Result<()> {
        self.device_request(serial, "reverse:killforward-all")?;
        Ok(())
    }

    pub fn list_forward(&self, serial: &DeviceSerial) -> Result<Vec<ForwardData>> {
        let payload = self
            .host_request(&format!("host-serial:{}:list-forward", serial))?
            .read_string()?;
        Ok(ForwardData::parse_list(&payload))
    }

    pub fn list_reverse_forward(&self, serial: &DeviceSerial) -> Result<Vec<ForwardData>> {
        let payload = self
            .device_request(serial, "reverse:list-forward")?
            .read_string()?;
        Ok(ForwardData::parse_list(&payload))
    }

    // =========================================================================
    // Device services
    // =========================================================================

    pub fn get_features(&self, serial: &DeviceSerial) -> Result<Vec<String>> {
        let payload = self
            .host_request(&format!("host-serial:{}:features", serial))?
            .read_string()?;
        Ok(payload
            .trim()
            .split(',')
            .filter(|feature| !feature.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Run `command` through the device shell, handing the output to `executor`.
    pub fn execute_remote_command(
        &self,
        command: &str,
        serial: &DeviceSerial,
        executor: &mut dyn CommandExecutor,
    ) -> Result<()> {
        let mut socket = self.device_request(serial, &format!("shell:{}", command))?;
        executor.execute(socket.transport_mut())
    }

    /// Like [`execute_remote_command`](Self::execute_remote_command) but via
    /// `exec:`, which keeps binary output intact.
    pub fn execute_exec_command(
        &self,
        command: &str,
        serial: &DeviceSerial,
        executor: &mut dyn CommandExecutor,
    ) -> Result<()> {
        let mut socket = self.device_request(serial, &format!("exec:{}", command))?;
        executor.execute(socket.transport_mut())
    }

    /// Reboot into `target`, e.g. `bootloader` or `recovery`; empty for a normal reboot.
    pub fn reboot(&self, target: &str, serial: &DeviceSerial) -> Result<()> {
        info!("Rebooting {} into {:?}", serial, target);
        self.device_request(serial, &format!("reboot:{}", target))?;
        Ok(())
    }

    /// Restart adbd as root. Returns the daemon's message.
    pub fn root(&self, serial: &DeviceSerial) -> Result<String> {
        self.restart_daemon(serial, "root:")
    }

    pub fn unroot(&self, serial: &DeviceSerial) -> Result<String> {
        self.restart_daemon(serial, "unroot:")
    }

    fn restart_daemon(&self, serial: &DeviceSerial, request: &str) -> Result<String> {
        let message = self.device_request(serial, request)?.read_to_end_string()?;
        let message = message.trim().to_string();
        if message.contains("cannot run as root") || message.contains("cannot unroot") {
            return Err(AdbError::Protocol(message));
        }
        Ok(message)
    }

    /// Stream an APK to the package manager.
    ///
    /// `arguments` are passed to `pm install` ahead of the size option.
    pub fn install<R: Read + Seek>(
        &self,
        serial: &DeviceSerial,
        apk: &mut R,
        arguments: &[&str],
    ) -> Result<()> {
        let size = stream_length(apk)?;
        let mut command = String::from("exec:cmd package 'install'");
        for argument in arguments {
            command.push(' ');
            command.push_str(argument);
        }
        command.push_str(&format!(" -S {}", size));

        info!("Installing {} byte package on {}", size, serial);
        let mut socket = self.device_request(serial, &command)?;

        let mut buffer = vec![0u8; self.max_buffer_size.max(1)];
        loop {
            let read = fill_chunk(apk, &mut buffer)?;
            if read == 0 {
                break;
            }
            socket.send(&buffer[..read])?;
        }

        check_package_result(socket.read_to_end_string()?)
    }

    pub fn uninstall(&self, serial: &DeviceSerial, package: &str, arguments: &[&str]) -> Result<()> {
        let mut command = String::from("exec:cmd package 'uninstall'");
        for argument in arguments {
            command.push(' ');
            command.push_str(argument);
        }
        command.push(' ');
        command.push_str(package);

        let mut socket = self.device_request(serial, &command)?;
        check_package_result(socket.read_to_end_string()?)
    }

    /// Capture the screen. The pixel data is returned undecoded.
    pub fn get_framebuffer(&self, serial: &DeviceSerial) -> Result<Framebuffer> {
        let mut socket = self.device_request(serial, "framebuffer:")?;

        let mut header = vec![0u8; 4];
        socket.receive_exact(&mut header)?;
        let version = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        header.resize(4 + FramebufferHeader::body_size(version)?, 0);
        socket.receive_exact(&mut header[4..])?;
        let header = FramebufferHeader::parse(&header)?;
        debug!(
            "Framebuffer v{} {}x{} {} bpp, {} bytes",
            header.version, header.width, header.height, header.bpp, header.size
        );

        let mut data = vec![0u8; header.data_size()?];
        socket.receive_exact(&mut data)?;

        Ok(Framebuffer { header, data })
    }

    /// Start a file transfer session on the device.
    pub fn sync_service(&self, serial: &DeviceSerial) -> Result<SyncService<C::Transport>> {
        let socket = self.open_socket()?;
        Ok(SyncService::open(socket, Some(serial.as_str()))?.with_max_buffer_size(self.max_buffer_size))
    }
}

/// Read the optional port string that follows a successful forward.
fn read_allocated_port<T: Transport>(socket: &mut AdbSocket<T>) -> Result<Option<u16>> {
    match socket.try_read_string()? {
        Some(port) if !port.trim().is_empty() => port
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AdbError::Protocol(format!("invalid forward port {:?}", port))),
        _ => Ok(None),
    }
}

fn check_package_result(output: String) -> Result<()> {
    let output = output.trim();
    if output.contains("Success") {
        Ok(())
    } else {
        Err(AdbError::Protocol(output.to_string()))
    }
}
