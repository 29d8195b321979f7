//! Repository sync: upload a local project tree to GitHub through the
//! contents API, one file at a time.
//!
//! For each file the worker looks up the current blob sha on the target
//! branch, then creates or updates the file. Per-file failures are collected
//! in the report; only an auth rejection or an unreachable API stops the run.

mod github;
mod walk;

pub use github::{GitHubClient, PutContent};
pub use walk::{enumerate_files, repo_path, ExcludeSet, DEFAULT_EXCLUDES};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::config::GithubConfig;
use crate::http::HttpTransport;
use crate::retry::{self, ApiError};

/// Credentials and target of one sync run. Never persisted.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SyncRequest {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default, alias = "repoName")]
    pub repo: String,
}

impl fmt::Debug for SyncRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncRequest")
            .field("token", &"<redacted>")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .finish()
    }
}

impl SyncRequest {
    pub fn new(token: impl Into<String>, owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// All three fields must be non-blank.
    pub fn validate(&self) -> Result<(), SyncError> {
        for (name, value) in [
            ("token", &self.token),
            ("owner", &self.owner),
            ("repo", &self.repo),
        ] {
            if value.trim().is_empty() {
                return Err(SyncError::MissingParameter(name));
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("invalid exclude pattern: {0}")]
    Exclude(#[from] globset::Error),
    #[error("invalid GitHub API base URL: {0}")]
    ApiBase(String),
    #[error("cannot enumerate project files: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("GitHub rejected the token: {0}")]
    Unauthorized(#[source] ApiError),
    #[error("GitHub API unreachable: {0}")]
    Unreachable(#[source] ApiError),
}

impl SyncError {
    /// True for caller mistakes detected before any network call.
    pub fn is_invalid_request(&self) -> bool {
        matches!(self, SyncError::MissingParameter(_))
    }
}

/// One file that could not be uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub path: String,
    pub error: String,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub branch: String,
    /// Files enumerated and attempted.
    pub files_processed: usize,
    pub created: usize,
    pub updated: usize,
    pub failures: Vec<FileFailure>,
}

impl SyncReport {
    pub fn uploaded(&self) -> usize {
        self.created + self.updated
    }

    pub fn summary(&self, owner: &str, repo: &str) -> String {
        let mut s = format!(
            "Synced {} of {} files to {}/{} on branch {}",
            self.uploaded(),
            self.files_processed,
            owner,
            repo,
            self.branch
        );
        if !self.failures.is_empty() {
            s.push_str(&format!(" ({} failed)", self.failures.len()));
        }
        s
    }
}

/// Per-file data for one upload, built fresh each run.
#[derive(Debug)]
struct FileUploadRecord {
    relative_path: String,
    content: Vec<u8>,
    existing_sha: Option<String>,
}

/// Run-independent settings.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub api_base: String,
    pub fallback_branch: String,
    pub commit_message_prefix: String,
    pub exclude: Vec<String>,
}

impl From<&GithubConfig> for SyncOptions {
    fn from(cfg: &GithubConfig) -> Self {
        Self {
            api_base: cfg.api_base.clone(),
            fallback_branch: cfg.fallback_branch.clone(),
            commit_message_prefix: cfg.commit_message_prefix.clone(),
            exclude: cfg.exclude.clone(),
        }
    }
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self::from(&GithubConfig::default())
    }
}

pub struct SyncWorker<T> {
    transport: T,
    options: SyncOptions,
}

/// Errors that make every later call pointless end the run. A timeout or
/// a dropped connection on one file is that file's failure only.
fn fatal(e: ApiError) -> Result<ApiError, SyncError> {
    if retry::is_host_unreachable(&e) {
        return Err(SyncError::Unreachable(e));
    }
    match e {
        ApiError::Http { status: 401, .. } => Err(SyncError::Unauthorized(e)),
        other => Ok(other),
    }
}

impl<T: HttpTransport> SyncWorker<T> {
    pub fn new(transport: T, options: SyncOptions) -> Self {
        Self { transport, options }
    }

    /// Upload every non-excluded file under `root` to `owner/repo`.
    ///
    /// Blocks for the whole run; call from `spawn_blocking` in async code.
    pub fn sync(&self, request: &SyncRequest, root: &Path) -> Result<SyncReport, SyncError> {
        request.validate()?;
        let owner = request.owner.trim();
        let repo = request.repo.trim();

        let excludes = ExcludeSet::new(self.options.exclude.as_slice())?;
        let client = GitHubClient::new(&self.transport, &self.options.api_base, request.token.trim())
            .map_err(SyncError::ApiBase)?;

        let files = enumerate_files(root, &excludes)?;
        tracing::info!(owner, repo, files = files.len(), root = %root.display(), "sync starting");

        let branch = self.resolve_branch(&client, owner, repo);
        let mut report = SyncReport {
            branch: branch.clone(),
            ..SyncReport::default()
        };

        for rel in &files {
            report.files_processed += 1;
            let path = repo_path(rel);
            let content = match std::fs::read(root.join(rel)) {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(path = %path, "read failed: {}", e);
                    report.failures.push(FileFailure {
                        path,
                        error: format!("read: {e}"),
                    });
                    continue;
                }
            };

            let existing_sha = match client.content_sha(owner, repo, &path, &branch) {
                Ok(sha) => sha,
                Err(e) => {
                    let e = fatal(e)?;
                    tracing::debug!(path = %path, "sha lookup failed, treating as new: {}", e);
                    None
                }
            };

            let record = FileUploadRecord {
                relative_path: path,
                content,
                existing_sha,
            };
            match self.upload(&client, owner, repo, &branch, &record) {
                Ok(()) => {
                    let action = if record.existing_sha.is_some() {
                        report.updated += 1;
                        "updated"
                    } else {
                        report.created += 1;
                        "created"
                    };
                    tracing::info!(path = %record.relative_path, action, "uploaded");
                }
                Err(e) => {
                    let e = fatal(e)?;
                    tracing::warn!(path = %record.relative_path, "upload failed: {}", e);
                    report.failures.push(FileFailure {
                        path: record.relative_path,
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            owner,
            repo,
            branch = %report.branch,
            processed = report.files_processed,
            failed = report.failures.len(),
            "sync finished"
        );
        Ok(report)
    }

    fn resolve_branch(&self, client: &GitHubClient<&T>, owner: &str, repo: &str) -> String {
        match client.default_branch(owner, repo) {
            Ok(Some(branch)) => branch,
            Ok(None) => self.options.fallback_branch.clone(),
            Err(e) => {
                tracing::warn!(
                    fallback = %self.options.fallback_branch,
                    "could not read repository metadata: {}",
                    e
                );
                self.options.fallback_branch.clone()
            }
        }
    }

    fn upload(
        &self,
        client: &GitHubClient<&T>,
        owner: &str,
        repo: &str,
        branch: &str,
        record: &FileUploadRecord,
    ) -> Result<(), ApiError> {
        let body = PutContent {
            message: format!(
                "{} {}",
                self.options.commit_message_prefix,
                chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
            ),
            content: STANDARD.encode(&record.content),
            branch: branch.to_string(),
            sha: record.existing_sha.clone(),
        };
        client.put_content(owner, repo, &record.relative_path, &body)
    }
}
