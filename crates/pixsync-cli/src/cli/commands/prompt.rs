//! Prompt command: one prompt, one image.

use anyhow::{bail, Context, Result};
use pixsync_core::chat::{AttachedFile, ChatSession};
use pixsync_core::config::PixsyncConfig;
use pixsync_core::gemini::AspectRatio;
use std::path::PathBuf;

use super::{build_orchestrator, save_image};

/// Generate an image for `text` and write it to disk.
pub async fn run_prompt(
    cfg: &PixsyncConfig,
    text: String,
    attach: Option<PathBuf>,
    aspect: AspectRatio,
    out: Option<PathBuf>,
) -> Result<()> {
    let orchestrator = build_orchestrator(cfg)?;
    let mut session = ChatSession::new();
    if let Some(path) = &attach {
        let file = AttachedFile::from_path(path)
            .with_context(|| format!("read attachment {}", path.display()))?;
        session.attach(file);
    }

    let message = tokio::task::spawn_blocking(move || {
        orchestrator.submit(&mut session, &text, aspect).clone()
    })
    .await?;

    if message.is_error() {
        bail!("{}", message.text_content());
    }
    let dir = std::env::current_dir()?;
    let path = save_image(&message, out.as_deref(), &dir)?;
    if let Some(interpretation) = message.interpretation_text() {
        println!("{}", interpretation);
    }
    println!("saved {}", path.display());
    Ok(())
}
