use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per API call (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 2.0 = 2s).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay_secs: 2.0,
            max_delay_secs: 30,
        }
    }
}

/// Gemini endpoint and model selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// Base URL up to and including the API version.
    pub api_base: String,
    /// Model used for the interpretation step.
    pub text_model: String,
    /// Model used for image synthesis.
    pub image_model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            text_model: "gemini-2.5-flash".to_string(),
            image_model: "gemini-2.5-flash-image".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_secs: 120,
        }
    }
}

/// GitHub contents API settings for repository sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    pub api_base: String,
    /// Branch used when the repository metadata cannot be fetched.
    pub fallback_branch: String,
    /// Commit message prefix; the sync time is appended.
    pub commit_message_prefix: String,
    /// Globs (relative to the project root) that are never uploaded.
    pub exclude: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            fallback_branch: "main".to_string(),
            commit_message_prefix: "Sync from pixsync:".to_string(),
            exclude: crate::sync::DEFAULT_EXCLUDES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            timeout_secs: 30,
        }
    }
}

/// HTTP endpoint settings for `pixsync serve`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Directory uploaded by `/api/github/sync`. None = working directory.
    pub project_root: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3001".to_string(),
            project_root: None,
        }
    }
}

/// Global configuration loaded from `~/.config/pixsync/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PixsyncConfig {
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl PixsyncConfig {
    /// Retry settings, falling back to defaults when the section is absent.
    pub fn retry_policy(&self) -> crate::retry::RetryPolicy {
        self.retry
            .as_ref()
            .map(crate::retry::RetryPolicy::from)
            .unwrap_or_default()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pixsync")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PixsyncConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = PixsyncConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: PixsyncConfig = toml::from_str(&data)?;
    Ok(cfg)
}
