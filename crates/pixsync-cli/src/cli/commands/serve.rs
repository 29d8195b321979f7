//! Serve command: expose repository sync over HTTP.

use anyhow::Result;
use pixsync_core::config::PixsyncConfig;
use pixsync_core::http::CurlTransport;
use pixsync_core::server::{self, SyncState};
use pixsync_core::sync::SyncOptions;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::project_root;

pub async fn run_serve(cfg: &PixsyncConfig, bind: Option<String>, root: Option<PathBuf>) -> Result<()> {
    let bind = bind.unwrap_or_else(|| cfg.server.bind.clone());
    let state = SyncState {
        transport: Arc::new(CurlTransport::with_timeout(Duration::from_secs(
            cfg.github.timeout_secs,
        ))),
        options: SyncOptions::from(&cfg.github),
        project_root: project_root(root, cfg.server.project_root.as_deref())?,
    };
    println!(
        "serving {} on http://{} (project {})",
        server::SYNC_PATH,
        bind,
        state.project_root.display()
    );
    server::serve(&bind, state).await
}
