//! CLI for pixsync.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pixsync_core::config;
use pixsync_core::gemini::AspectRatio;
use std::path::PathBuf;

use commands::{run_chat, run_prompt, run_serve, run_sync};

/// Top-level CLI for pixsync.
#[derive(Debug, Parser)]
#[command(name = "pixsync")]
#[command(about = "pixsync: prompt-to-image generation and project sync to GitHub", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Generate one image from a prompt.
    Prompt {
        /// What to draw.
        text: String,
        /// File sent along with the prompt (image, video, audio, pdf, text).
        #[arg(long, value_name = "PATH")]
        attach: Option<PathBuf>,
        /// Aspect ratio hint, e.g. 16:9. 2:3 and 21:9 are sent as 1:1.
        #[arg(long, default_value = "1:1", value_name = "RATIO")]
        aspect: AspectRatio,
        /// Where to write the image (default: pixsync-<id>.<ext> in the working directory).
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },

    /// Interactive chat: one image per prompt, with /attach, /clear, /history, /quit.
    Chat {
        /// Aspect ratio hint for every prompt in the session.
        #[arg(long, default_value = "1:1", value_name = "RATIO")]
        aspect: AspectRatio,
        /// Directory receiving generated images.
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,
    },

    /// Upload a project tree to a GitHub repository.
    Sync {
        /// Repository owner (user or organization).
        #[arg(long)]
        owner: String,
        /// Repository name.
        #[arg(long)]
        repo: String,
        /// Personal access token; falls back to $GITHUB_TOKEN.
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,
        /// Project directory to upload (default: working directory).
        #[arg(long, value_name = "DIR")]
        root: Option<PathBuf>,
    },

    /// Serve POST /api/github/sync over HTTP.
    Serve {
        /// Listen address (default from config, 127.0.0.1:3001).
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
        /// Project directory uploaded by the endpoint.
        #[arg(long, value_name = "DIR")]
        root: Option<PathBuf>,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Prompt {
                text,
                attach,
                aspect,
                out,
            } => run_prompt(&cfg, text, attach, aspect, out).await?,
            CliCommand::Chat { aspect, out_dir } => run_chat(&cfg, aspect, out_dir).await?,
            CliCommand::Sync {
                owner,
                repo,
                token,
                root,
            } => run_sync(&cfg, owner, repo, token, root).await?,
            CliCommand::Serve { bind, root } => run_serve(&cfg, bind, root).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
