//! `kraken check <base_url>` – run the conformance checklist.

use anyhow::{Context, Result};
use kraken_core::conformance::{self, CheckPlan};

pub async fn run_check(
    base_url: &str,
    asset: &str,
    asset_len: Option<usize>,
    cookie: &str,
) -> Result<()> {
    let mut plan = CheckPlan::new(base_url)
        .with_asset_path(asset)
        .with_session_cookie(cookie);
    if let Some(len) = asset_len {
        plan = plan.with_asset_len(len);
    }
    let report = tokio::task::spawn_blocking(move || conformance::run(&plan))
        .await
        .context("conformance task panicked")?;

    for outcome in &report.outcomes {
        println!("{}", outcome);
    }
    let failed = report.failures().count();
    anyhow::ensure!(
        failed == 0,
        "{} of {} checks failed",
        failed,
        report.outcomes.len()
    );
    println!("All {} checks passed.", report.outcomes.len());
    Ok(())
}
