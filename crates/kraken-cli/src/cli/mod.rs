//! CLI for the kraken web framework.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_check, run_serve};

/// Top-level CLI for kraken.
#[derive(Debug, Parser)]
#[command(name = "kraken")]
#[command(about = "Kraken: serve a site directory with pages, assets and controllers", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Serve a site until Ctrl-C.
    Serve {
        /// Config file to use instead of ~/.config/kraken/config.toml.
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
        /// Site directory (overrides `site_root` from the config).
        #[arg(long, value_name = "DIR")]
        site_root: Option<PathBuf>,
        /// Listen address, e.g. 127.0.0.1:5000 (overrides `bind`).
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// Run the conformance checklist against a running site.
    Check {
        /// Base URL of the site, e.g. http://127.0.0.1:5000
        base_url: String,
        /// Path of a static asset to use for the validator checks.
        #[arg(long, value_name = "PATH", default_value = "/__logo/dyko.png")]
        asset: String,
        /// Expected byte length of the asset.
        #[arg(long, value_name = "BYTES")]
        asset_len: Option<usize>,
        /// Name of the session cookie the site sets.
        #[arg(long, value_name = "NAME", default_value = "kraken_session")]
        cookie: String,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Serve {
                config,
                site_root,
                bind,
            } => run_serve(config.as_deref(), site_root, bind).await?,
            CliCommand::Check {
                base_url,
                asset,
                asset_len,
                cookie,
            } => run_check(&base_url, &asset, asset_len, &cookie).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
