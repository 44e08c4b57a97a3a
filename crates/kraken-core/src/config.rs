//! Kraken configuration loaded from `~/.config/kraken/config.toml`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where session values are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    /// Process-local map; sessions end with the process.
    #[default]
    Memory,
    /// SQLite database under the XDG state dir (or `sqlite_path`).
    Sqlite,
}

/// Session storage settings (optional `[session]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub backend: SessionBackend,
    /// Database file for the sqlite backend; defaults to
    /// `~/.local/state/kraken/sessions.db`.
    #[serde(default)]
    pub sqlite_path: Option<PathBuf>,
    /// Seconds a session may go unused before it is dropped.
    #[serde(default = "default_session_max_age")]
    pub max_age_secs: u64,
}

fn default_session_max_age() -> u64 {
    7 * 24 * 60 * 60
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend: SessionBackend::default(),
            sqlite_path: None,
            max_age_secs: default_session_max_age(),
        }
    }
}

impl SessionConfig {
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }
}

/// A directory served verbatim under a URL prefix (e.g. `/__logo/`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticMount {
    /// First path segment that selects this mount, without slashes.
    pub prefix: String,
    /// Directory to serve; relative paths resolve against `site_root`.
    pub dir: PathBuf,
}

/// Global configuration for a kraken site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KrakenConfig {
    /// Listen address, e.g. "127.0.0.1:5000".
    pub bind: String,
    /// Directory holding the site's pages.
    pub site_root: PathBuf,
    /// Hex-encoded key used to sign session cookies. When missing a random
    /// key is generated at startup and cookies do not survive a restart.
    #[serde(default)]
    pub secret_key: Option<String>,
    /// Name of the session cookie.
    #[serde(default = "default_session_cookie")]
    pub session_cookie: String,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default = "default_static_mounts")]
    pub static_mounts: Vec<StaticMount>,
}

fn default_session_cookie() -> String {
    "kraken_session".to_string()
}

fn default_static_mounts() -> Vec<StaticMount> {
    vec![StaticMount {
        prefix: "__logo".to_string(),
        dir: PathBuf::from("__logo"),
    }]
}

impl Default for KrakenConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
            site_root: PathBuf::from("site"),
            secret_key: None,
            session_cookie: default_session_cookie(),
            session: SessionConfig::default(),
            static_mounts: default_static_mounts(),
        }
    }
}

impl KrakenConfig {
    /// Mount directory with relative paths resolved against `site_root`.
    pub fn mount_dir(&self, mount: &StaticMount) -> PathBuf {
        if mount.dir.is_absolute() {
            mount.dir.clone()
        } else {
            self.site_root.join(&mount.dir)
        }
    }

    /// Decoded secret key, if one is configured.
    pub fn secret_key_bytes(&self) -> Result<Option<Vec<u8>>> {
        match &self.secret_key {
            None => Ok(None),
            Some(hex_key) => {
                let key = hex::decode(hex_key.trim()).context("secret_key is not valid hex")?;
                anyhow::ensure!(!key.is_empty(), "secret_key is empty");
                Ok(Some(key))
            }
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("kraken")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<KrakenConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = KrakenConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from(&path)
}

/// Load configuration from an explicit file.
pub fn load_from(path: &Path) -> Result<KrakenConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: KrakenConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
