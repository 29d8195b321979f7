//! GitHub REST calls used by the sync loop: repository metadata and the
//! contents API.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::http::{HttpRequest, HttpTransport, Method};
use crate::retry::ApiError;

const API_VERSION: &str = "2022-11-28";

/// Body of `PUT /repos/{owner}/{repo}/contents/{path}`.
///
/// `sha` must be present to update an existing file and absent to create one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PutContent {
    pub message: String,
    /// Base64 of the file bytes.
    pub content: String,
    pub branch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RepoMetadata {
    default_branch: Option<String>,
}

pub struct GitHubClient<T> {
    transport: T,
    base: Url,
    token: String,
}

impl<T: HttpTransport> GitHubClient<T> {
    /// Fails when `api_base` is not an absolute http(s)-style URL.
    pub fn new(transport: T, api_base: &str, token: impl Into<String>) -> Result<Self, String> {
        let base = Url::parse(api_base).map_err(|e| format!("{api_base}: {e}"))?;
        if base.cannot_be_a_base() {
            return Err(format!("{api_base}: not a base URL"));
        }
        Ok(Self {
            transport,
            base,
            token: token.into(),
        })
    }

    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn contents_url(&self, owner: &str, repo: &str, path: &str) -> Url {
        self.endpoint(
            ["repos", owner, repo, "contents"]
                .into_iter()
                .chain(path.split('/')),
        )
    }

    fn request(&self, method: Method, url: Url) -> HttpRequest {
        HttpRequest::new(method, url.as_str())
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .header("User-Agent", concat!("pixsync/", env!("CARGO_PKG_VERSION")))
    }

    /// `GET /repos/{owner}/{repo}` → `default_branch`.
    pub fn default_branch(&self, owner: &str, repo: &str) -> Result<Option<String>, ApiError> {
        let url = self.endpoint(["repos", owner, repo]);
        let resp = self
            .transport
            .send(&self.request(Method::Get, url))?
            .error_for_status()?;
        let meta: RepoMetadata = resp.json()?;
        Ok(meta.default_branch.filter(|b| !b.is_empty()))
    }

    /// Blob sha of `path` on `branch`, or None when the file does not exist.
    pub fn content_sha(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        branch: &str,
    ) -> Result<Option<String>, ApiError> {
        let mut url = self.contents_url(owner, repo, path);
        url.query_pairs_mut().append_pair("ref", branch);
        let resp = self.transport.send(&self.request(Method::Get, url))?;
        if resp.status == 404 {
            return Ok(None);
        }
        let value: serde_json::Value = resp.error_for_status()?.json()?;
        // A directory listing comes back as an array and has no single sha.
        Ok(value
            .get("sha")
            .and_then(|s| s.as_str())
            .map(|s| s.to_string()))
    }

    /// Create or update `path` with the given body.
    pub fn put_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        body: &PutContent,
    ) -> Result<(), ApiError> {
        let url = self.contents_url(owner, repo, path);
        let req = self.request(Method::Put, url).json(body)?;
        self.transport.send(&req)?.error_for_status()?;
        Ok(())
    }
}
