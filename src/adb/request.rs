use crate::core::ForwardSpec;
use crate::error::{AdbError, Result};

/// Largest payload a 4 hex digit length prefix can describe.
pub const MAX_REQUEST_LENGTH: usize = 0xFFFF;

/// Frame a host command as `{byte length:04X}{command}`.
///
/// The length is the UTF-8 byte length of the command, not its char count.
pub fn form_request(command: &str) -> Result<Vec<u8>> {
    let length = command.len();
    if length > MAX_REQUEST_LENGTH {
        return Err(AdbError::RequestTooLong(length));
    }

    let mut request = Vec::with_capacity(4 + length);
    request.extend_from_slice(format!("{:04X}", length).as_bytes());
    request.extend_from_slice(command.as_bytes());
    Ok(request)
}

/// Frame a `tcp:{port}` or `tcp:{port}:{address}` forward target.
pub fn form_forward_request(address: Option<&str>, port: u16) -> Result<Vec<u8>> {
    let target = match address {
        Some(address) => format!("tcp:{}:{}", port, address),
        None => format!("tcp:{}", port),
    };
    form_request(&target)
}

/// Reverse of [`form_request`].
pub fn decode_request(frame: &[u8]) -> Result<String> {
    if frame.len() < 4 {
        return Err(AdbError::Protocol(format!(
            "request frame of {} bytes has no length prefix",
            frame.len()
        )));
    }

    let length = parse_hex_length(&frame[..4])?;
    let payload = &frame[4..];
    if payload.len() != length {
        return Err(AdbError::Protocol(format!(
            "request declares {} bytes but carries {}",
            length,
            payload.len()
        )));
    }

    Ok(String::from_utf8(payload.to_vec())?)
}

/// Parse a 4 ASCII hex digit length, upper or lower case.
pub fn parse_hex_length(prefix: &[u8]) -> Result<usize> {
    let invalid = || {
        AdbError::Protocol(format!(
            "invalid hex length prefix {:?}",
            String::from_utf8_lossy(prefix)
        ))
    };

    if prefix.len() != 4 || !prefix.iter().all(u8::is_ascii_hexdigit) {
        return Err(invalid());
    }

    let text = std::str::from_utf8(prefix).map_err(|_| invalid())?;
    usize::from_str_radix(text, 16).map_err(|_| invalid())
}

/// True if `spec` names a forwarding target such as `tcp:5555` or `jdwp:42`.
pub fn is_forward_spec(spec: &str) -> bool {
    spec.parse::<ForwardSpec>().is_ok()
}
