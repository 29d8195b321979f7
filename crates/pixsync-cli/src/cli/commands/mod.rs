//! CLI command handlers, one file per command, plus the pieces they share.

mod chat;
mod prompt;
mod serve;
mod sync;

pub use chat::run_chat;
pub use prompt::run_prompt;
pub use serve::run_serve;
pub use sync::run_sync;

use anyhow::{anyhow, Context, Result};
use pixsync_core::chat::{decode_data_uri, ChatMessage, PromptOrchestrator};
use pixsync_core::config::PixsyncConfig;
use pixsync_core::gemini::GeminiClient;
use pixsync_core::http::CurlTransport;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Gemini pipeline wired from config; the key comes from the configured env var.
pub(crate) fn build_orchestrator(cfg: &PixsyncConfig) -> Result<PromptOrchestrator<CurlTransport>> {
    let key_var = &cfg.gemini.api_key_env;
    let api_key = std::env::var(key_var)
        .ok()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| anyhow!("set {} to your Gemini API key", key_var))?;
    let transport = CurlTransport::with_timeout(Duration::from_secs(cfg.gemini.timeout_secs));
    let client = GeminiClient::from_config(transport, &cfg.gemini, api_key, cfg.retry_policy());
    Ok(PromptOrchestrator::from_config(client, &cfg.gemini))
}

pub(crate) fn project_root(arg: Option<PathBuf>, configured: Option<&Path>) -> Result<PathBuf> {
    match arg.or_else(|| configured.map(Path::to_path_buf)) {
        Some(p) => Ok(p),
        None => Ok(std::env::current_dir()?),
    }
}

pub(crate) fn extension_for(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "png",
    }
}

/// Write the image carried by `message` to `out`, or to
/// `<dir>/pixsync-<id>.<ext>` when `out` is None.
pub(crate) fn save_image(message: &ChatMessage, out: Option<&Path>, dir: &Path) -> Result<PathBuf> {
    let uri = message
        .image_data_uri()
        .ok_or_else(|| anyhow!("message {} has no image", message.id()))?;
    let (mime, bytes) = decode_data_uri(uri).context("malformed image data URI")?;
    let path = match out {
        Some(p) => p.to_path_buf(),
        None => dir.join(format!("pixsync-{}.{}", message.id(), extension_for(&mime))),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, &bytes).with_context(|| format!("write {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "image saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_follows_mime() {
        assert_eq!(extension_for("image/jpeg"), "jpg");
        assert_eq!(extension_for("image/png"), "png");
        assert_eq!(extension_for("application/octet-stream"), "png");
    }

    #[test]
    fn explicit_root_wins_over_config() {
        let root = project_root(Some("/a".into()), Some(Path::new("/b"))).unwrap();
        assert_eq!(root, PathBuf::from("/a"));
        let root = project_root(None, Some(Path::new("/b"))).unwrap();
        assert_eq!(root, PathBuf::from("/b"));
    }
}
