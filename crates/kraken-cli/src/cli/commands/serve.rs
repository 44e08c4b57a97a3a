//! `kraken serve` – serve a site directory.

use anyhow::Result;
use kraken_core::config::{self, KrakenConfig};
use kraken_core::controllers::{demo, ControllerRegistry};
use kraken_core::server;
use std::path::{Path, PathBuf};

/// Config from `path` (or the XDG default) with command-line overrides applied.
pub(crate) fn resolve_config(
    path: Option<&Path>,
    site_root: Option<PathBuf>,
    bind: Option<String>,
) -> Result<KrakenConfig> {
    let mut cfg = match path {
        Some(p) => config::load_from(p)?,
        None => config::load_or_init()?,
    };
    if let Some(root) = site_root {
        cfg.site_root = root;
    }
    if let Some(bind) = bind {
        cfg.bind = bind;
    }
    Ok(cfg)
}

pub async fn run_serve(
    config_path: Option<&Path>,
    site_root: Option<PathBuf>,
    bind: Option<String>,
) -> Result<()> {
    let cfg = resolve_config(config_path, site_root, bind)?;
    tracing::debug!("loaded config: {:?}", cfg);
    anyhow::ensure!(
        cfg.site_root.is_dir(),
        "site root {} is not a directory",
        cfg.site_root.display()
    );

    let mut controllers = ControllerRegistry::new();
    demo::register(&mut controllers)?;

    println!(
        "Serving {} on http://{} (Ctrl-C to stop)",
        cfg.site_root.display(),
        cfg.bind
    );
    server::serve(&cfg, controllers).await
}
