use crate::adb::protocol::le_u32;
use crate::error::{AdbError, Result};
use serde::Serialize;

/// Bit layout of one colour channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ColorChannel {
    pub offset: u32,
    pub length: u32,
}

/// Header sent by the `framebuffer:` service ahead of the pixel data.
///
/// All fields are little-endian u32. The version comes first and decides how
/// many bytes follow it: 48 for version 1, 52 for version 2, which adds a
/// colour space after `bpp`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FramebufferHeader {
    pub version: u32,
    pub bpp: u32,
    pub color_space: u32,
    pub size: u32,
    pub width: u32,
    pub height: u32,
    pub red: ColorChannel,
    pub blue: ColorChannel,
    pub green: ColorChannel,
    pub alpha: ColorChannel,
}

impl FramebufferHeader {
    pub const V1_SIZE: usize = 48;
    pub const V2_SIZE: usize = 52;
    /// Largest pixel payload accepted from a server (an 8K RGBA screen fits).
    pub const MAX_DATA_SIZE: u64 = 256 * 1024 * 1024;

    /// Number of pixel bytes to read after the header.
    ///
    /// The announced size may not exceed what the geometry needs, nor
    /// [`MAX_DATA_SIZE`](Self::MAX_DATA_SIZE).
    pub fn data_size(&self) -> Result<usize> {
        let geometry = u64::from(self.width) * u64::from(self.height) * u64::from(self.bpp) / 8;
        let size = u64::from(self.size);
        if size > geometry {
            return Err(AdbError::Protocol(format!(
                "framebuffer of {} bytes does not fit {}x{} at {} bpp",
                size, self.width, self.height, self.bpp
            )));
        }
        if size > Self::MAX_DATA_SIZE {
            return Err(AdbError::Protocol(format!(
                "framebuffer of {} bytes exceeds {}",
                size,
                Self::MAX_DATA_SIZE
            )));
        }
        Ok(size as usize)
    }

    /// Number of header bytes that follow the version field.
    pub fn body_size(version: u32) -> Result<usize> {
        match version {
            1 => Ok(Self::V1_SIZE),
            2 => Ok(Self::V2_SIZE),
            other => Err(AdbError::Protocol(format!(
                "unsupported framebuffer version {}",
                other
            ))),
        }
    }

    /// Parse a complete header; `bytes` must start with the version field.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 4 {
            return Err(AdbError::ChannelEof {
                expected: 4,
                received: bytes.len(),
            });
        }

        let version = le_u32(bytes, 0);
        let expected = 4 + Self::body_size(version)?;
        if bytes.len() < expected {
            return Err(AdbError::ChannelEof {
                expected,
                received: bytes.len(),
            });
        }

        let mut fields = (4..expected).step_by(4).map(|offset| le_u32(bytes, offset));
        let mut next = || fields.next().unwrap_or_default();

        let bpp = next();
        let color_space = if version == 2 { next() } else { 0 };
        let size = next();
        let width = next();
        let height = next();
        let mut channel = || ColorChannel {
            offset: next(),
            length: next(),
        };
        let red = channel();
        let blue = channel();
        let green = channel();
        let alpha = channel();

        Ok(Self {
            version,
            bpp,
            color_space,
            size,
            width,
            height,
            red,
            blue,
            green,
            alpha,
        })
    }
}

/// A captured screen: the header and the undecoded pixel bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    pub header: FramebufferHeader,
    pub data: Vec<u8>,
}
