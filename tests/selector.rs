//! End-to-end tests for the mode selector
//!
//! Drives `ModeSelector` with the real process launcher. `/bin/sh` stands in
//! for raspindi and raspistill and records its argv and environment to a
//! temp file, so no camera or GPIO hardware is needed.
//!
//! Run: `cargo test --test selector`

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::tempdir;

use picam_mode::{
    ChildOutcome, FailurePolicy, FixedLevel, Level, Mode, ModeProfile, ModeSelector,
    ProcessLauncher, SelectorConfig,
};

// ── Helpers ──────────────────────────────────────────────────────────

/// Shell profile that dumps "$@" and a few variables into `out`
fn recording_profile(out: &Path, args: &[&str], env: &[(&str, &str)]) -> ModeProfile {
    let script = r#"out="$1"; shift; printf '%s\n' "args=$*" "lib=${LD_LIBRARY_PATH-unset}" "home=${HOME-unset}" > "$out""#;

    let mut argv = vec![
        "-c".to_string(),
        script.to_string(),
        "sh".to_string(),
        out.display().to_string(),
    ];
    argv.extend(args.iter().map(|s| s.to_string()));

    ModeProfile {
        program: PathBuf::from("/bin/sh"),
        args: argv,
        env: env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
        indicator: None,
    }
}

fn parent_env() -> Vec<(OsString, OsString)> {
    vec![
        (OsString::from("HOME"), OsString::from("/home/pi")),
        (OsString::from("LD_LIBRARY_PATH"), OsString::from("/usr/local/lib")),
    ]
}

fn config_in(dir: &Path) -> SelectorConfig {
    let out = dir.join("child.txt");
    let defaults = SelectorConfig::default();

    // Keep each mode's real argv and overrides, run them through the shell
    let still_args: Vec<&str> = defaults.still.args.iter().map(String::as_str).collect();
    let mut still = recording_profile(&out, &still_args, &[]);
    still.indicator = defaults.still.indicator.clone();

    let stream_env: Vec<(&str, &str)> = defaults
        .stream
        .env
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    let stream = recording_profile(&out, &[], &stream_env);

    SelectorConfig {
        indicator_path: dir.join("neopixel.state"),
        stream,
        still,
        ..defaults
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_still_capture_end_to_end() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path());

    let selection = ModeSelector::new(
        config,
        FixedLevel(Level::High),
        ProcessLauncher::with_parent_env(parent_env()),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(selection.mode, Mode::Still);
    assert_eq!(selection.outcome, ChildOutcome::Exited { code: 0 });
    assert_eq!(fs::read(dir.path().join("neopixel.state")).unwrap(), b"F");

    let recorded = fs::read_to_string(dir.path().join("child.txt")).unwrap();
    assert_eq!(
        recorded,
        "args=-fp -t 0 -w 1920 -h 1080\nlib=/usr/local/lib\nhome=/home/pi\n"
    );
}

#[tokio::test]
async fn test_stream_end_to_end() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path());

    let selection = ModeSelector::new(
        config,
        FixedLevel(Level::Low),
        ProcessLauncher::with_parent_env(parent_env()),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(selection.mode, Mode::Stream);
    assert!(!dir.path().join("neopixel.state").exists());

    let recorded = fs::read_to_string(dir.path().join("child.txt")).unwrap();
    assert_eq!(recorded, "args=\nlib=/opt/raspindi/usr/lib\nhome=/home/pi\n");
}

#[tokio::test]
async fn test_stream_override_does_not_leak_into_parent() {
    let dir = tempdir().unwrap();
    let before = std::env::var_os("LD_LIBRARY_PATH");

    ModeSelector::new(
        config_in(dir.path()),
        FixedLevel(Level::Low),
        ProcessLauncher::inheriting(),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(std::env::var_os("LD_LIBRARY_PATH"), before);
}

#[tokio::test]
async fn test_missing_capture_binary_is_not_fatal() {
    let dir = tempdir().unwrap();
    let config = SelectorConfig {
        indicator_path: dir.path().join("neopixel.state"),
        still: ModeProfile::raspistill(dir.path().join("raspistill")),
        ..Default::default()
    };

    let selection = ModeSelector::new(
        config,
        FixedLevel(Level::High),
        ProcessLauncher::with_parent_env(parent_env()),
    )
    .run()
    .await
    .unwrap();

    assert!(matches!(selection.outcome, ChildOutcome::LaunchFailed { .. }));
    assert_eq!(fs::read(dir.path().join("neopixel.state")).unwrap(), b"F");
}

#[tokio::test]
async fn test_missing_stream_binary_strict() {
    let dir = tempdir().unwrap();
    let config = SelectorConfig {
        indicator_path: dir.path().join("neopixel.state"),
        failure_policy: FailurePolicy::Propagate,
        stream: ModeProfile::raspindi(dir.path().join("raspindi"), "/opt/raspindi/usr/lib"),
        ..Default::default()
    };

    let result = ModeSelector::new(
        config,
        FixedLevel(Level::Low),
        ProcessLauncher::with_parent_env(parent_env()),
    )
    .run()
    .await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("raspindi"));
    assert!(!dir.path().join("neopixel.state").exists());
}

#[tokio::test]
async fn test_nonzero_exit_strict() {
    let dir = tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.failure_policy = FailurePolicy::Propagate;
    config.still.args = vec!["-c".to_string(), "exit 64".to_string()];

    let err = ModeSelector::new(
        config,
        FixedLevel(Level::High),
        ProcessLauncher::with_parent_env(parent_env()),
    )
    .run()
    .await
    .unwrap_err();

    assert!(err.to_string().contains("exited with code 64"));
}

#[test]
fn test_dry_run_plan_serializes() {
    let selector = ModeSelector::new(
        SelectorConfig::default(),
        FixedLevel(Level::Low),
        ProcessLauncher::with_parent_env(Vec::new()),
    );

    let json = serde_json::to_value(selector.plan(Level::Low)).unwrap();
    assert_eq!(json["mode"], "stream");
    assert_eq!(json["level"], "low");
    assert_eq!(json["program"], "/opt/raspindi/bin/raspindi");
    assert_eq!(json["env"]["LD_LIBRARY_PATH"], "/opt/raspindi/usr/lib");
    assert!(json["indicator_path"].is_null());

    let json = serde_json::to_value(selector.plan(Level::High)).unwrap();
    assert_eq!(json["mode"], "still");
    assert_eq!(json["indicator_path"], "/tmp/neopixel.state");
    assert_eq!(json["indicator"], "F");
}
