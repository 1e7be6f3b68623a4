use crate::adb::socket::AdbSocket;
use crate::adb::sync::SyncService;
use crate::commands::files::{
    is_safe_entry_name, local_mode, plan_push, remote_file_name, remote_join, PullCommand,
};
use crate::error::AdbError;
use crate::progress::ProgressFactory;
use crate::testing::{MockTransport, Wire};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_remote_join() {
    assert_eq!(remote_join("/sdcard", "a.txt"), "/sdcard/a.txt");
    assert_eq!(remote_join("/sdcard/", "a.txt"), "/sdcard/a.txt");
    assert_eq!(remote_join("/", "data"), "/data");
    assert_eq!(remote_join("/sdcard", "/dir/b"), "/sdcard/dir/b");
}

#[test]
fn test_remote_file_name() {
    assert_eq!(remote_file_name("/sdcard/DCIM/"), "DCIM");
    assert_eq!(remote_file_name("/sdcard/a.txt"), "a.txt");
    assert_eq!(remote_file_name("a.txt"), "a.txt");
}

fn tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("photos/2024")).unwrap();
    fs::write(dir.path().join("photos/a.jpg"), b"a").unwrap();
    fs::write(dir.path().join("photos/2024/b.jpg"), b"bb").unwrap();
    fs::write(dir.path().join("notes.txt"), b"notes").unwrap();
    dir
}

#[test]
fn test_plan_single_file_to_file() {
    let dir = tree();
    let plan = plan_push(&[dir.path().join("notes.txt")], "/sdcard/renamed.txt", false).unwrap();
    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].1, "/sdcard/renamed.txt");
}

#[test]
fn test_plan_single_file_into_directory() {
    let dir = tree();
    let plan = plan_push(&[dir.path().join("notes.txt")], "/sdcard/", true).unwrap();
    assert_eq!(plan[0].1, "/sdcard/notes.txt");
}

#[test]
fn test_plan_directory_is_recursive() {
    let dir = tree();
    let plan = plan_push(&[dir.path().join("photos")], "/sdcard/Pictures", true).unwrap();
    let remotes: Vec<&str> = plan.iter().map(|(_, r)| r.as_str()).collect();
    assert_eq!(
        remotes,
        vec!["/sdcard/Pictures/photos/2024/b.jpg", "/sdcard/Pictures/photos/a.jpg"]
    );
    assert_eq!(plan[1].0, dir.path().join("photos/a.jpg"));
}

#[test]
fn test_plan_directory_to_new_path() {
    let dir = tree();
    let plan = plan_push(&[dir.path().join("photos")], "/sdcard/backup", false).unwrap();
    assert!(plan.iter().any(|(_, r)| r == "/sdcard/backup/a.jpg"));
}

#[test]
fn test_plan_several_sources() {
    let dir = tree();
    let sources = vec![dir.path().join("notes.txt"), dir.path().join("photos/a.jpg")];
    let plan = plan_push(&sources, "/sdcard/in", false).unwrap();
    assert_eq!(plan[0].1, "/sdcard/in/notes.txt");
    assert_eq!(plan[1].1, "/sdcard/in/a.jpg");
}

#[test]
fn test_plan_missing_source() {
    let dir = tree();
    let missing: PathBuf = dir.path().join("missing.bin");
    assert!(matches!(
        plan_push(&[missing], "/sdcard", true),
        Err(AdbError::InvalidArgument(_))
    ));
}

#[cfg(unix)]
#[test]
fn test_local_mode() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tree();
    let path = dir.path().join("notes.txt");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();
    assert_eq!(local_mode(&fs::metadata(&path).unwrap()), 0o640);
}

#[test]
fn test_safe_entry_names() {
    assert!(is_safe_entry_name("photo.jpg"));
    assert!(is_safe_entry_name(".hidden"));
    assert!(!is_safe_entry_name(".."));
    assert!(!is_safe_entry_name("."));
    assert!(!is_safe_entry_name("../escaped.txt"));
    assert!(!is_safe_entry_name("/etc/passwd"));
    assert!(!is_safe_entry_name("a/b"));
    assert!(!is_safe_entry_name(""));
}

#[test]
fn test_pull_dir_skips_names_leaving_target() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("pulled");
    let wire = Wire::new()
        .okay()
        .dent(0o100644, 3, 0, "../escaped.txt")
        .dent(0o100644, 3, 0, "ok.txt")
        .list_done()
        .stat(0o100644, 3, 0)
        .data(b"abc")
        .recv_done();
    let socket = AdbSocket::new(MockTransport::new(wire.build()));
    let mut sync = SyncService::open(socket, None).unwrap();

    let (files, bytes) = PullCommand::new()
        .pull_dir(&mut sync, &ProgressFactory::new(false), "/sdcard/d", &target)
        .unwrap();

    assert_eq!((files, bytes), (1, 3));
    assert!(!dir.path().join("escaped.txt").exists());
    assert_eq!(fs::read(target.join("ok.txt")).unwrap(), b"abc");
}
