//! Command line behaviour of the gaze-smoothing binary

use std::io::Write;
use std::process::Command;
use tempfile::{NamedTempFile, TempDir};

const SESSION: &str = r"
crop: { width: 30, height: 18 }
frames:
  - timestamp: 1.0
    subjects:
      4: { head_pose: { timestamp: 0.95, yaw: 3.1 }, gaze: { theta: 0.1, phi: 0.2 } }
  - timestamp: 1.1
    subjects:
      4: { head_pose: { timestamp: 1.05, yaw: 3.1 }, gaze: { theta: 0.3, phi: 0.4 } }
  - timestamp: 1.2
    subjects:
      4: { head_pose: { timestamp: 0.8, yaw: 3.1 }, gaze: { theta: 0.5, phi: 0.6 } }
";

fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_gaze-smoothing"))
}

fn session_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(SESSION.as_bytes()).unwrap();
    file
}

fn config_file(window: usize) -> NamedTempFile {
    let weights = vec!["1.0"; window].join(", ");
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "smoothing:\n  window_size: {window}\n  weights: [{weights}]").unwrap();
    file
}

#[test]
fn test_print_config() {
    let output = binary().arg("--print-config").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("max_staleness_secs: 0.25"));
}

#[test]
fn test_replay_required() {
    let output = binary().output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_replay_prints_transforms() {
    let session = session_file();
    let config = config_file(2);
    let output = binary()
        .arg("--replay")
        .arg(session.path())
        .arg("-C")
        .arg(config.path())
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout).unwrap();
    // Third frame's pose is 0.4s old and skipped
    assert_eq!(stdout.lines().count(), 1);
    assert!(stdout.contains("gaze/head_pose_estimated4 -> gaze/world_gaze4"));
}

#[test]
fn test_max_staleness_override_and_output_dir() {
    let session = session_file();
    let config = config_file(1);
    let out = TempDir::new().unwrap();
    let output = binary()
        .arg("--replay")
        .arg(session.path())
        .arg("--config")
        .arg(config.path())
        .arg("--max-staleness")
        .arg("0.5")
        .arg("--output-dir")
        .arg(out.path())
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8(output.stdout).unwrap().lines().count(), 3);

    let images = std::fs::read_dir(out.path()).unwrap().count();
    assert_eq!(images, 3);
    let first = std::fs::read_dir(out.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .min()
        .unwrap();
    assert_eq!(image::image_dimensions(first).unwrap(), (60, 18));
}

#[test]
fn test_invalid_staleness_fails() {
    let session = session_file();
    let output = binary()
        .arg("--replay")
        .arg(session.path())
        .arg("--max-staleness")
        .arg("0")
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_out_of_range_staleness_fails_cleanly() {
    let session = session_file();
    let output = binary()
        .arg("--replay")
        .arg(session.path())
        .arg("--max-staleness")
        .arg("1e30")
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("panicked"), "{stderr}");
    assert!(stderr.contains("invalid configuration"), "{stderr}");
}

#[test]
fn test_missing_session_fails() {
    let output = binary().args(["--replay", "/nonexistent/session.yaml"]).output().unwrap();
    assert!(!output.status.success());
}
