#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tempfile::tempdir;

use note_core::core::lock::IndexLock;
use note_core::core::paths::NotePaths;
use note_core::NoteError;

#[test]
fn test_killed_run_releases_the_lock() {
    let notes = tempdir().unwrap();
    let tools = tempdir().unwrap();
    let paths = NotePaths::from_root(notes.path().to_path_buf());

    // an editor that never returns on its own
    let editor = tools.path().join("slow-editor");
    fs::write(&editor, "#!/bin/sh\nsleep 5\n").unwrap();
    fs::set_permissions(&editor, fs::Permissions::from_mode(0o755)).unwrap();

    let mut child = Command::new(env!("CARGO_BIN_EXE_note"))
        .args(["n", "draft"])
        .env("NOTE_LOCATION", notes.path())
        .env("NOTE_EDITOR", &editor)
        .env("NOTE_LOG_LEVEL", "error")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let deadline = Instant::now() + Duration::from_secs(10);
    let holder = loop {
        if let Some(info) = IndexLock::holder(&paths.lock) {
            break info;
        }
        assert!(Instant::now() < deadline, "child never took the lock");
        thread::sleep(Duration::from_millis(50));
    };
    assert_eq!(holder.pid, child.id());
    assert!(matches!(
        IndexLock::acquire(&paths.lock).unwrap_err(),
        NoteError::Locked { .. }
    ));

    child.kill().unwrap();
    child.wait().unwrap();

    let lock = IndexLock::acquire(&paths.lock).unwrap();
    assert_eq!(lock.interrupted().map(|info| info.pid), Some(holder.pid));
    drop(lock);

    let status = Command::new(env!("CARGO_BIN_EXE_note"))
        .arg("l")
        .env("NOTE_LOCATION", notes.path())
        .env("NOTE_LOG_LEVEL", "error")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .unwrap();
    assert!(status.success());
}
