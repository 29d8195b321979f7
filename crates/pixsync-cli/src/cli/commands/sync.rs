//! Sync command: upload a project tree to GitHub.

use anyhow::{anyhow, Result};
use pixsync_core::config::PixsyncConfig;
use pixsync_core::http::CurlTransport;
use pixsync_core::sync::{SyncOptions, SyncRequest, SyncWorker};
use std::path::PathBuf;
use std::time::Duration;

use super::project_root;

/// Run one sync and print the summary plus any per-file failures.
pub async fn run_sync(
    cfg: &PixsyncConfig,
    owner: String,
    repo: String,
    token: Option<String>,
    root: Option<PathBuf>,
) -> Result<()> {
    let token = token.ok_or_else(|| anyhow!("pass --token or set GITHUB_TOKEN"))?;
    let request = SyncRequest::new(token, owner, repo);
    request.validate()?;
    let root = project_root(root, cfg.server.project_root.as_deref())?;

    let transport = CurlTransport::with_timeout(Duration::from_secs(cfg.github.timeout_secs));
    let worker = SyncWorker::new(transport, SyncOptions::from(&cfg.github));
    let (owner, repo) = (request.owner.clone(), request.repo.clone());
    let report = tokio::task::spawn_blocking(move || worker.sync(&request, &root)).await??;

    println!("{}", report.summary(owner.trim(), repo.trim()));
    for failure in &report.failures {
        println!("  failed {}: {}", failure.path, failure.error);
    }
    Ok(())
}
