use crate::adb::framebuffer::{ColorChannel, FramebufferHeader};
use crate::error::AdbError;
use crate::testing::fixtures::framebuffer_v2;
use crate::testing::Wire;

#[test]
fn test_body_size() {
    assert_eq!(FramebufferHeader::body_size(1).unwrap(), 48);
    assert_eq!(FramebufferHeader::body_size(2).unwrap(), 52);
    assert!(matches!(FramebufferHeader::body_size(16), Err(AdbError::Protocol(_))));
}

#[test]
fn test_parse_v1_has_no_color_space() {
    // RGB_565, 1080x2400
    let bytes = Wire::new()
        .u32_le(1)
        .u32_le(16)
        .u32_le(1080 * 2400 * 2)
        .u32_le(1080)
        .u32_le(2400)
        .u32_le(11)
        .u32_le(5)
        .u32_le(0)
        .u32_le(5)
        .u32_le(5)
        .u32_le(6)
        .u32_le(0)
        .u32_le(0)
        .build();
    assert_eq!(bytes.len(), 4 + FramebufferHeader::V1_SIZE);

    let header = FramebufferHeader::parse(&bytes).unwrap();
    assert_eq!(header.version, 1);
    assert_eq!(header.bpp, 16);
    assert_eq!(header.color_space, 0);
    assert_eq!(header.size, 1080 * 2400 * 2);
    assert_eq!(header.width, 1080);
    assert_eq!(header.height, 2400);
    assert_eq!(header.red, ColorChannel { offset: 11, length: 5 });
    assert_eq!(header.blue, ColorChannel { offset: 0, length: 5 });
    assert_eq!(header.green, ColorChannel { offset: 5, length: 6 });
    assert_eq!(header.alpha, ColorChannel::default());
}

#[test]
fn test_parse_v2() {
    let header = FramebufferHeader::parse(&framebuffer_v2(1080, 2400)).unwrap();
    assert_eq!(header.version, 2);
    assert_eq!(header.bpp, 32);
    assert_eq!(header.size, 1080 * 2400 * 4);
    assert_eq!(header.red, ColorChannel { offset: 0, length: 8 });
    assert_eq!(header.blue, ColorChannel { offset: 16, length: 8 });
    assert_eq!(header.green, ColorChannel { offset: 8, length: 8 });
    assert_eq!(header.alpha, ColorChannel { offset: 24, length: 8 });
}

#[test]
fn test_parse_short_header() {
    let bytes = framebuffer_v2(4, 4);
    assert!(matches!(
        FramebufferHeader::parse(&bytes[..40]),
        Err(AdbError::ChannelEof { expected: 56, received: 40 })
    ));
    assert!(matches!(
        FramebufferHeader::parse(&bytes[..2]),
        Err(AdbError::ChannelEof { expected: 4, received: 2 })
    ));
}

#[test]
fn test_parse_unknown_version() {
    let bytes = Wire::new().u32_le(7).raw(&[0u8; 52]).build();
    assert!(matches!(FramebufferHeader::parse(&bytes), Err(AdbError::Protocol(_))));
}

#[test]
fn test_data_size_follows_geometry() {
    let header = FramebufferHeader::parse(&framebuffer_v2(1080, 2400)).unwrap();
    assert_eq!(header.data_size().unwrap(), 1080 * 2400 * 4);
}

#[test]
fn test_data_size_larger_than_geometry() {
    let mut header = FramebufferHeader::parse(&framebuffer_v2(4, 4)).unwrap();
    header.size = 4 * 4 * 4 + 1;
    assert!(matches!(header.data_size(), Err(AdbError::Protocol(_))));
}

#[test]
fn test_data_size_cap() {
    let mut header = FramebufferHeader::parse(&framebuffer_v2(1, 1)).unwrap();
    header.width = 65535;
    header.height = 65535;
    header.size = 300 * 1024 * 1024;
    assert!(matches!(header.data_size(), Err(AdbError::Protocol(_))));
}
