use crate::adb::request::decode_request;

/// Builder for the bytes a server sends on one connection.
#[derive(Debug, Clone, Default)]
pub struct Wire(Vec<u8>);

impl Wire {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn okay(mut self) -> Self {
        self.0.extend_from_slice(b"OKAY");
        self
    }

    /// `FAIL` followed by a hex-prefixed message
    pub fn fail(self, message: &str) -> Self {
        self.raw(b"FAIL").hex_string(message)
    }

    pub fn hex_string(mut self, value: &str) -> Self {
        self.0.extend_from_slice(format!("{:04X}", value.len()).as_bytes());
        self.0.extend_from_slice(value.as_bytes());
        self
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.0.extend_from_slice(bytes);
        self
    }

    pub fn u32_le(mut self, value: u32) -> Self {
        self.0.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// SYNC `STAT` reply
    pub fn stat(self, mode: u32, size: u32, time: u32) -> Self {
        self.raw(b"STAT").u32_le(mode).u32_le(size).u32_le(time)
    }

    /// One `DENT` record of a listing
    pub fn dent(self, mode: u32, size: u32, time: u32, name: &str) -> Self {
        self.raw(b"DENT")
            .u32_le(mode)
            .u32_le(size)
            .u32_le(time)
            .u32_le(name.len() as u32)
            .raw(name.as_bytes())
    }

    /// `DONE` that ends a listing, with its zeroed stat fields
    pub fn list_done(self) -> Self {
        self.raw(b"DONE").raw(&[0u8; 16])
    }

    pub fn data(self, payload: &[u8]) -> Self {
        self.raw(b"DATA").u32_le(payload.len() as u32).raw(payload)
    }

    /// `DONE` that ends a `RECV`
    pub fn recv_done(self) -> Self {
        self.raw(b"DONE").u32_le(0)
    }

    /// `OKAY` that acknowledges a completed `SEND`
    pub fn sync_okay(self) -> Self {
        self.raw(b"OKAY").u32_le(0)
    }

    pub fn sync_fail(self, message: &str) -> Self {
        self.raw(b"FAIL")
            .u32_le(message.len() as u32)
            .raw(message.as_bytes())
    }

    /// The four zero bytes of an empty SYNC response
    pub fn empty_tag(self) -> Self {
        self.raw(&[0u8; 4])
    }

    pub fn build(self) -> Vec<u8> {
        self.0
    }
}

impl From<Wire> for Vec<u8> {
    fn from(wire: Wire) -> Self {
        wire.0
    }
}

/// Split bytes written by the client into its host requests.
///
/// Stops at the first bytes that are not a complete request frame, such as
/// the start of SYNC traffic or a raw upload.
pub fn host_requests(mut written: &[u8]) -> Vec<String> {
    let mut requests = Vec::new();
    while written.len() >= 4 {
        let Ok(length) = crate::adb::request::parse_hex_length(&written[..4]) else {
            break;
        };
        if written.len() < 4 + length {
            break;
        }
        match decode_request(&written[..4 + length]) {
            Ok(request) => requests.push(request),
            Err(_) => break,
        }
        written = &written[4 + length..];
    }
    requests
}

/// Length in bytes of the host request frames at the start of `written`.
pub fn host_request_len(written: &[u8]) -> usize {
    host_requests(written).iter().map(|r| 4 + r.len()).sum()
}

pub const DEVICES_L: &str = "emulator-5554          device product:sdk_gphone64_x86_64 model:sdk_gphone64_x86_64 device:emu64xa transport_id:1\n\
R58M123ABC             unauthorized usb:1-1 transport_id:2\n\
192.168.1.20:5555      offline transport_id:3\n";

/// A version 2 framebuffer header with the layout of an RGBA_8888 screen.
pub fn framebuffer_v2(width: u32, height: u32) -> Vec<u8> {
    let size = width * height * 4;
    Wire::new()
        .u32_le(2)
        .u32_le(32)
        .u32_le(0)
        .u32_le(size)
        .u32_le(width)
        .u32_le(height)
        .u32_le(0)
        .u32_le(8)
        .u32_le(16)
        .u32_le(8)
        .u32_le(8)
        .u32_le(8)
        .u32_le(24)
        .u32_le(8)
        .build()
}
