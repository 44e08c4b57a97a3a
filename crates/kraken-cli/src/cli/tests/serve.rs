//! Tests for the serve subcommand.

use super::parse;
use crate::cli::commands::resolve_config;
use crate::cli::CliCommand;
use std::path::{Path, PathBuf};

#[test]
fn cli_parse_serve_defaults() {
    match parse(&["kraken", "serve"]) {
        CliCommand::Serve {
            config,
            site_root,
            bind,
        } => {
            assert!(config.is_none());
            assert!(site_root.is_none());
            assert!(bind.is_none());
        }
        _ => panic!("expected Serve"),
    }
}

#[test]
fn cli_parse_serve_overrides() {
    match parse(&[
        "kraken",
        "serve",
        "--config",
        "/etc/kraken.toml",
        "--site-root",
        "demos/site",
        "--bind",
        "0.0.0.0:8080",
    ]) {
        CliCommand::Serve {
            config,
            site_root,
            bind,
        } => {
            assert_eq!(config.as_deref(), Some(Path::new("/etc/kraken.toml")));
            assert_eq!(site_root.as_deref(), Some(Path::new("demos/site")));
            assert_eq!(bind.as_deref(), Some("0.0.0.0:8080"));
        }
        _ => panic!("expected Serve with overrides"),
    }
}

#[test]
fn overrides_replace_config_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kraken.toml");
    std::fs::write(&path, "bind = \"127.0.0.1:5000\"\nsite_root = \"site\"\n").unwrap();

    let cfg = resolve_config(Some(&path), None, None).unwrap();
    assert_eq!(cfg.bind, "127.0.0.1:5000");
    assert_eq!(cfg.site_root, PathBuf::from("site"));

    let cfg = resolve_config(
        Some(&path),
        Some(PathBuf::from("/srv/site")),
        Some("127.0.0.1:9000".to_string()),
    )
    .unwrap();
    assert_eq!(cfg.bind, "127.0.0.1:9000");
    assert_eq!(cfg.site_root, PathBuf::from("/srv/site"));
}

#[test]
fn missing_config_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(resolve_config(Some(&dir.path().join("absent.toml")), None, None).is_err());
}
