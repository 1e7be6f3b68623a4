use crate::adb::{FileStatistics, UnixFileMode};
use crate::core::{DeviceData, DeviceState, ForwardData};
use crate::output::{format_size, render_table, PlainFormat, TableFormat};
use chrono::DateTime;

fn stats(path: &str, mode: u32, size: u32) -> FileStatistics {
    FileStatistics {
        path: path.to_string(),
        file_mode: UnixFileMode(mode),
        size,
        time: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
    }
}

#[test]
fn test_format_size() {
    assert_eq!(format_size(0), "0B");
    assert_eq!(format_size(1023), "1023B");
    assert_eq!(format_size(1536), "1.5K");
    assert_eq!(format_size(5 * 1024 * 1024), "5.0M");
}

#[test]
fn test_device_rows() {
    let mut device = DeviceData::new("emulator-5554", DeviceState::Online);
    device.model = Some("sdk_gphone64_x86_64".to_string());
    device.transport_id = Some(1);

    assert_eq!(device.row()[..3], ["emulator-5554", "device", "sdk_gphone64_x86_64"]);
    assert_eq!(device.row()[4], "1");
    assert_eq!(device.plain(), "emulator-5554\tdevice");
}

#[test]
fn test_file_rows() {
    let entry = stats("Download", 0o040771, 4096);
    assert_eq!(entry.row()[0], "drwxrwx--x");
    assert_eq!(entry.row()[1], "4.0K");
    assert_eq!(entry.row()[3], "Download");
    assert!(entry.plain().starts_with("drwxrwx--x       4096 "));
    assert!(entry.plain().ends_with(" Download"));
}

#[test]
fn test_forward_plain_uses_display() {
    let forward = ForwardData::parse_line("emulator-5554 tcp:8080 tcp:9090").unwrap();
    assert_eq!(forward.plain(), "emulator-5554 tcp:8080 tcp:9090");
    assert_eq!(ForwardData::headers(), ["SERIAL", "LOCAL", "REMOTE"]);
}

#[test]
fn test_render_table() {
    let table = render_table(&[stats("a.txt", 0o100644, 12), stats("b.txt", 0o100600, 3)]).to_string();
    assert!(table.contains("MODE"));
    assert!(table.contains("a.txt"));
    assert!(table.contains("-rw-------"));
}
