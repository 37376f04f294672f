// tests/config_loading.rs

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use globwatch::config::{load_and_validate, load_from_path, WatchOptions, DEFAULT_IGNORED};
use globwatch::errors::GlobwatchError;
use tempfile::TempDir;

fn write_config(contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("Globwatch.toml");
    fs::write(&path, contents).expect("Failed to write config");
    (dir, path)
}

#[test]
fn full_config_is_loaded() {
    let (_dir, path) = write_config(
        r#"
[watcher]
watch = ["src/**/*.rs", "Cargo.toml"]
ignored = ["**/dist"]
use_polling = true
poll_interval_ms = 250
cwd = "/srv/project"
"#,
    );

    let cfg = load_and_validate(&path).unwrap();

    assert_eq!(cfg.watch, vec!["src/**/*.rs", "Cargo.toml"]);
    assert_eq!(
        cfg.options,
        WatchOptions {
            ignored: vec!["**/dist".to_string()],
            use_polling: true,
            poll_interval: Duration::from_millis(250),
            cwd: Some(PathBuf::from("/srv/project")),
        }
    );
}

#[test]
fn empty_file_uses_defaults() {
    let (_dir, path) = write_config("");
    let cfg = load_and_validate(&path).unwrap();

    assert!(cfg.watch.is_empty());
    assert_eq!(cfg.options, WatchOptions::default());
    assert_eq!(cfg.options.poll_interval, Duration::from_millis(100));
}

#[test]
fn effective_ignores_start_with_defaults_without_duplicates() {
    let options = WatchOptions {
        ignored: vec!["**/.git".to_string(), "build".to_string()],
        ..WatchOptions::default()
    };
    let effective = options.effective_ignored();

    assert_eq!(&effective[..DEFAULT_IGNORED.len()], DEFAULT_IGNORED);
    assert_eq!(effective.last().map(String::as_str), Some("build"));
    assert_eq!(effective.len(), DEFAULT_IGNORED.len() + 1);
}

#[test]
fn zero_poll_interval_is_rejected() {
    let (_dir, path) = write_config("[watcher]\npoll_interval_ms = 0\n");
    match load_and_validate(&path) {
        Err(GlobwatchError::ConfigError(msg)) => {
            assert!(msg.contains("poll_interval_ms"), "message: {msg}")
        }
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
fn blank_patterns_are_rejected_with_their_index() {
    let (_dir, path) = write_config("[watcher]\nwatch = [\"src\", \"  \"]\n");
    match load_and_validate(&path) {
        Err(GlobwatchError::ConfigError(msg)) => assert!(msg.contains("watch[1]"), "message: {msg}"),
        other => panic!("expected config error, got {other:?}"),
    }

    let (_dir, path) = write_config("[watcher]\nignored = [\"\"]\n");
    match load_and_validate(&path) {
        Err(GlobwatchError::ConfigError(msg)) => assert!(msg.contains("ignored[0]"), "message: {msg}"),
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
fn relative_cwd_is_rejected() {
    let (_dir, path) = write_config("[watcher]\ncwd = \"relative/dir\"\n");
    assert!(matches!(
        load_and_validate(&path),
        Err(GlobwatchError::ConfigError(_))
    ));
}

#[test]
fn unknown_fields_are_a_parse_error() {
    let (_dir, path) = write_config("[watcher]\nwatch = []\ndebounce_ms = 5\n");
    assert!(matches!(load_from_path(&path), Err(GlobwatchError::TomlError(_))));

    let (_dir, path) = write_config("[tasks.build]\ncmd = \"make\"\n");
    assert!(matches!(load_from_path(&path), Err(GlobwatchError::TomlError(_))));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_and_validate(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, GlobwatchError::IoError(_)));
}

#[test]
fn hand_built_options_are_validated_too() {
    let zero = WatchOptions {
        poll_interval: Duration::ZERO,
        ..WatchOptions::default()
    };
    assert!(zero.validate().is_err());

    let relative = WatchOptions {
        cwd: Some(PathBuf::from("rel")),
        ..WatchOptions::default()
    };
    assert!(relative.validate().is_err());

    assert!(WatchOptions::default().validate().is_ok());
}
