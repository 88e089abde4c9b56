// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use bmac_config::{ConfigError, MultiSourceConfig, multi_source_config};
use clap::Parser;
use serde::{Deserialize, Serialize};
use serial_test::serial;
use tempfile::TempDir;

#[derive(Debug, Parser, Serialize, Deserialize)]
struct Settings {
    #[arg(long)]
    banks: Option<usize>,

    #[arg(long)]
    cycles: Option<usize>,

    #[arg(long)]
    label: Option<String>,

    #[arg(long)]
    #[serde(skip)]
    conf_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            banks: Some(16),
            cycles: Some(128),
            label: Some("default".to_string()),
            conf_file: None,
        }
    }
}

multi_source_config!(Settings ; conf_file ; banks, cycles, label);

fn write_toml(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
#[serial]
fn defaults_only() {
    let settings = Settings::parse_sources_from(["test"]).unwrap();
    assert_eq!(settings.banks, Some(16));
    assert_eq!(settings.cycles, Some(128));
    assert_eq!(settings.label.as_deref(), Some("default"));
    assert!(settings.conf_file.is_none());
}

#[test]
#[serial]
fn file_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_toml(&dir, "settings.toml", "banks = 4\n");

    let settings = Settings::parse_sources_from(["test", "--conf-file", path.to_str().unwrap()]).unwrap();
    assert_eq!(settings.banks, Some(4));
    assert_eq!(settings.cycles, Some(128));
    assert_eq!(settings.conf_file, Some(path));
}

#[test]
#[serial]
fn cli_overrides_file() {
    let dir = TempDir::new().unwrap();
    let path = write_toml(&dir, "settings.toml", "banks = 4\ncycles = 2\n");

    let settings = Settings::parse_sources_from([
        "test",
        "--conf-file",
        path.to_str().unwrap(),
        "--banks",
        "8",
    ])
    .unwrap();
    assert_eq!(settings.banks, Some(8));
    assert_eq!(settings.cycles, Some(2));
}

#[test]
#[serial]
fn env_overrides_file_but_not_cli() {
    let dir = TempDir::new().unwrap();
    let path = write_toml(&dir, "settings.toml", "banks = 4\ncycles = 2\n");

    // SAFETY: tests touching the environment are serialised
    unsafe {
        env::set_var("BMAC_CYCLES", "7");
        env::set_var("BMAC_BANKS", "5");
    }
    let result = Settings::parse_sources_from([
        "test",
        "--conf-file",
        path.to_str().unwrap(),
        "--banks",
        "9",
    ]);
    unsafe {
        env::remove_var("BMAC_CYCLES");
        env::remove_var("BMAC_BANKS");
    }

    let settings = result.unwrap();
    assert_eq!(settings.cycles, Some(7));
    assert_eq!(settings.banks, Some(9));
}

#[test]
#[serial]
fn missing_conf_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let err = Settings::parse_sources_from(["test", "--conf-file", path.to_str().unwrap()]).unwrap_err();
    assert_eq!(err.io_kind(), Some(ErrorKind::NotFound));
}

#[test]
#[serial]
fn conf_file_is_directory() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().to_path_buf();

    let err = Settings::parse_sources_from(["test", "--conf-file", path.to_str().unwrap()]).unwrap_err();
    assert_eq!(err.io_kind(), Some(ErrorKind::IsADirectory));
}

#[test]
#[serial]
fn badly_typed_value() {
    let dir = TempDir::new().unwrap();
    let path = write_toml(&dir, "settings.toml", "banks = \"many\"\n");

    let err = Settings::parse_sources_from(["test", "--conf-file", path.to_str().unwrap()]).unwrap_err();
    assert!(matches!(err, ConfigError::Figment(_)));
}

#[test]
#[serial]
fn unknown_argument() {
    let err = Settings::parse_sources_from(["test", "--bogus"]).unwrap_err();
    assert!(matches!(err, ConfigError::Clap(_)));
    assert!(err.io_kind().is_none());
}

#[test]
#[serial]
fn extra_conf_file_applies_changed_values() {
    let dir = TempDir::new().unwrap();
    let path = write_toml(&dir, "extra.toml", "label = \"extra\"\n");

    let mut settings = Settings::parse_sources_from(["test", "--banks", "3"]).unwrap();
    settings.parse_extra_conf_file(&path).unwrap();

    // Values the extra file leaves at their defaults do not clobber earlier ones
    assert_eq!(settings.banks, Some(3));
    assert_eq!(settings.label.as_deref(), Some("extra"));
}

#[test]
#[serial]
fn extra_conf_file_empty_path_is_ignored() {
    let mut settings = Settings::default();
    settings.parse_extra_conf_file(&PathBuf::new()).unwrap();
    assert_eq!(settings.banks, Some(16));
}

#[test]
#[serial]
fn extra_conf_file_missing() {
    let dir = TempDir::new().unwrap();
    let mut settings = Settings::default();
    let err = settings
        .parse_extra_conf_file(&dir.path().join("absent.toml"))
        .unwrap_err();
    assert_eq!(err.io_kind(), Some(ErrorKind::NotFound));
}
