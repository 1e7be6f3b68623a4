use crate::error::{AdbError, Result};
use bytes::{BufMut, Bytes, BytesMut};
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::fmt;

// =============================================================================
// Host protocol status tokens
// =============================================================================

pub const OKAY: &[u8; 4] = b"OKAY";
pub const FAIL: &[u8; 4] = b"FAIL";

/// Outcome of a host command as reported by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdbResponse {
    Okay,
    Fail(String),
}

impl AdbResponse {
    pub fn is_okay(&self) -> bool {
        matches!(self, AdbResponse::Okay)
    }
}

lazy_static! {
    /// Server failure messages that map to a dedicated error kind.
    /// Anything not listed here becomes `AdbError::Protocol`.
    static ref FAILURE_TABLE: Vec<(Regex, fn(String) -> AdbError)> = vec![(
        Regex::new(r"(?i)^device (?:'[^']*' )?not found$").unwrap(),
        AdbError::DeviceNotFound as fn(String) -> AdbError,
    )];
}

/// Turn a `FAIL` message from the server into the matching error.
pub fn failure_to_error(message: String) -> AdbError {
    for (pattern, make) in FAILURE_TABLE.iter() {
        if pattern.is_match(message.trim()) {
            return make(message);
        }
    }
    AdbError::Protocol(message)
}

// =============================================================================
// SYNC sub-protocol
// =============================================================================

/// Longest remote path the SYNC service accepts.
pub const MAX_PATH_LENGTH: usize = 1024;

/// Default largest SYNC packet, header included.
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 64 * 1024;

/// Size of the `DATA` tag plus its little-endian length.
pub const DATA_HEADER_SIZE: usize = 8;

/// Default chunk size for blocking socket reads.
pub const DEFAULT_RECEIVE_BUFFER_SIZE: usize = 40960;

/// Four-byte command tags of the SYNC protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncCommand {
    Stat,
    List,
    Dent,
    Done,
    Data,
    Recv,
    Send,
    Okay,
    Fail,
    Quit,
}

impl SyncCommand {
    pub const ALL: [SyncCommand; 10] = [
        SyncCommand::Stat,
        SyncCommand::List,
        SyncCommand::Dent,
        SyncCommand::Done,
        SyncCommand::Data,
        SyncCommand::Recv,
        SyncCommand::Send,
        SyncCommand::Okay,
        SyncCommand::Fail,
        SyncCommand::Quit,
    ];

    pub fn code(&self) -> &'static [u8; 4] {
        match self {
            SyncCommand::Stat => b"STAT",
            SyncCommand::List => b"LIST",
            SyncCommand::Dent => b"DENT",
            SyncCommand::Done => b"DONE",
            SyncCommand::Data => b"DATA",
            SyncCommand::Recv => b"RECV",
            SyncCommand::Send => b"SEND",
            SyncCommand::Okay => b"OKAY",
            SyncCommand::Fail => b"FAIL",
            SyncCommand::Quit => b"QUIT",
        }
    }

    /// Look up a tag read from the wire.
    ///
    /// Four zero bytes are the server's empty response and yield `Ok(None)`;
    /// any other unknown tag is a protocol error.
    pub fn from_code(code: &[u8; 4]) -> Result<Option<Self>> {
        if code == &[0u8; 4] {
            return Ok(None);
        }

        Self::ALL
            .iter()
            .find(|command| command.code() == code)
            .copied()
            .map(Some)
            .ok_or_else(|| {
                AdbError::Protocol(format!(
                    "unknown sync command {:?}",
                    String::from_utf8_lossy(code)
                ))
            })
    }
}

impl fmt::Display for SyncCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(self.code()))
    }
}

/// Encode `{tag}{payload length as LE u32}{payload}` as a single packet.
pub fn encode_sync_request(command: SyncCommand, payload: &[u8]) -> Bytes {
    let mut packet = BytesMut::with_capacity(DATA_HEADER_SIZE + payload.len());
    packet.put_slice(command.code());
    packet.put_u32_le(payload.len() as u32);
    packet.put_slice(payload);
    packet.freeze()
}

/// Encode a tag followed by a bare LE u32, e.g. `DONE{mtime}` or a `DATA` header.
pub fn encode_sync_header(command: SyncCommand, value: u32) -> [u8; DATA_HEADER_SIZE] {
    let mut header = [0u8; DATA_HEADER_SIZE];
    header[..4].copy_from_slice(command.code());
    header[4..].copy_from_slice(&value.to_le_bytes());
    header
}

/// Decode a little-endian u32 at `offset`, independent of host byte order.
pub fn le_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

// =============================================================================
// File metadata
// =============================================================================

const S_IFMT: u32 = 0o170000; // bit mask for the file type bit field
const S_IFSOCK: u32 = 0o140000; // socket
const S_IFLNK: u32 = 0o120000; // symbolic link
const S_IFREG: u32 = 0o100000; // regular file
const S_IFBLK: u32 = 0o060000; // block device
const S_IFDIR: u32 = 0o040000; // directory
const S_IFCHR: u32 = 0o020000; // character device
const S_IFIFO: u32 = 0o010000; // FIFO

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnixFileType {
    Socket,
    Symlink,
    Regular,
    Block,
    Directory,
    Character,
    Fifo,
    Unknown,
}

impl UnixFileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnixFileType::Socket => "socket",
            UnixFileType::Symlink => "symlink",
            UnixFileType::Regular => "file",
            UnixFileType::Block => "block",
            UnixFileType::Directory => "directory",
            UnixFileType::Character => "char",
            UnixFileType::Fifo => "fifo",
            UnixFileType::Unknown => "unknown",
        }
    }
}

/// The raw `st_mode` of a remote file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UnixFileMode(pub u32);

impl UnixFileMode {
    pub fn file_type(&self) -> UnixFileType {
        match self.0 & S_IFMT {
            S_IFSOCK => UnixFileType::Socket,
            S_IFLNK => UnixFileType::Symlink,
            S_IFREG => UnixFileType::Regular,
            S_IFBLK => UnixFileType::Block,
            S_IFDIR => UnixFileType::Directory,
            S_IFCHR => UnixFileType::Character,
            S_IFIFO => UnixFileType::Fifo,
            _ => UnixFileType::Unknown,
        }
    }

    pub fn permissions(&self) -> u32 {
        self.0 & 0o7777
    }

    /// `ls -l` style string, e.g. `drwxr-xr-x`
    pub fn to_mode_string(&self) -> String {
        let kind = match self.file_type() {
            UnixFileType::Directory => 'd',
            UnixFileType::Symlink => 'l',
            UnixFileType::Socket => 's',
            UnixFileType::Block => 'b',
            UnixFileType::Character => 'c',
            UnixFileType::Fifo => 'p',
            UnixFileType::Regular | UnixFileType::Unknown => '-',
        };

        let mut out = String::with_capacity(10);
        out.push(kind);
        for shift in [6, 3, 0] {
            let bits = (self.0 >> shift) & 0o7;
            out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
            out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
            out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
        }
        out
    }
}

/// Metadata returned by `STAT` and by each `DENT` of a `LIST`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileStatistics {
    pub path: String,
    pub file_mode: UnixFileMode,
    pub size: u32,
    pub time: DateTime<Utc>,
}

impl FileStatistics {
    /// mode, size and mtime, each a little-endian u32
    pub const WIRE_SIZE: usize = 12;

    /// Decode the 12-byte stat triplet. The wire format carries no path.
    pub fn from_le_bytes(bytes: &[u8; Self::WIRE_SIZE]) -> Self {
        let time = DateTime::from_timestamp(le_u32(bytes, 8) as i64, 0).unwrap_or_default();

        Self {
            path: String::new(),
            file_mode: UnixFileMode(le_u32(bytes, 0)),
            size: le_u32(bytes, 4),
            time,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn file_type(&self) -> UnixFileType {
        self.file_mode.file_type()
    }

    pub fn is_directory(&self) -> bool {
        self.file_type() == UnixFileType::Directory
    }

    pub fn is_file(&self) -> bool {
        self.file_type() == UnixFileType::Regular
    }

    /// A zeroed triplet means the remote path does not exist.
    pub fn exists(&self) -> bool {
        self.file_mode.0 != 0 || self.size != 0 || self.time.timestamp() != 0
    }
}
