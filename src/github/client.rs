//! GitHub REST client for contents and releases.

use super::{
    AssetUpload, ContentEntry, ManifestSource, NewRelease, ReleaseBackend, ReleaseHandle,
    UploadedAsset,
};
use crate::error::{BackendError, ConfigError, Result};
use crate::source::RepoRef;
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::io::ReaderStream;

/// Public GitHub API endpoint
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Error bodies longer than this are cut before being put into errors
const MAX_ERROR_BODY: usize = 500;

/// GitHub REST client
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_base: String,
}

#[derive(Deserialize)]
struct ReleaseResponse {
    id: u64,
    upload_url: String,
    html_url: String,
}

impl From<ReleaseResponse> for ReleaseHandle {
    fn from(r: ReleaseResponse) -> Self {
        ReleaseHandle {
            id: r.id,
            upload_url: strip_uri_template(&r.upload_url).to_string(),
            html_url: r.html_url,
        }
    }
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct AssetResponse {
    name: String,
    size: u64,
    browser_download_url: String,
}

#[derive(Serialize)]
struct CreateReleaseRequest<'a> {
    tag_name: &'a str,
    name: &'a str,
    body: &'a str,
    draft: bool,
    prerelease: bool,
}

impl GitHubClient {
    /// Create an authenticated client
    ///
    /// `timeout` applies to every request when set; otherwise reqwest's
    /// defaults are used.
    pub fn new(token: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| ConfigError::InvalidToken)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder.build().map_err(|e| ConfigError::HttpClient {
            reason: e.to_string(),
        })?;

        Ok(Self {
            http,
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }

    /// Point the client at a different API root (GitHub Enterprise)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn repo_url(&self, repo: &RepoRef) -> String {
        format!("{}/repos/{}/{}", self.api_base, repo.owner, repo.repo)
    }
}

impl ManifestSource for GitHubClient {
    async fn get_content(
        &self,
        repo: &RepoRef,
        path: &str,
        git_ref: Option<&str>,
    ) -> std::result::Result<ContentEntry, BackendError> {
        let operation = "get_content";
        let url = format!("{}/contents/{}", self.repo_url(repo), path.trim_start_matches('/'));
        let mut request = self.http.get(&url);
        if let Some(git_ref) = git_ref {
            request = request.query(&[("ref", git_ref)]);
        }

        let response = request.send().await.map_err(|e| transport(operation, e))?;
        let response = check_status(response, operation, || format!("{repo}:{path}")).await?;
        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| invalid(operation, e))?;

        // Directory listings come back as arrays
        if value.is_array() {
            return Ok(ContentEntry {
                kind: "dir".to_string(),
                content: None,
            });
        }

        let parsed: ContentResponse =
            serde_json::from_value(value).map_err(|e| invalid(operation, e))?;
        Ok(ContentEntry {
            kind: parsed.kind,
            content: parsed.content,
        })
    }
}

impl ReleaseBackend for GitHubClient {
    async fn get_release_by_tag(
        &self,
        repo: &RepoRef,
        tag: &str,
    ) -> std::result::Result<ReleaseHandle, BackendError> {
        let operation = "get_release_by_tag";
        let url = format!("{}/releases/tags/{}", self.repo_url(repo), tag);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| transport(operation, e))?;
        let response = check_status(response, operation, || format!("release {tag} in {repo}")).await?;
        let release: ReleaseResponse = response.json().await.map_err(|e| invalid(operation, e))?;
        Ok(release.into())
    }

    async fn create_release(
        &self,
        repo: &RepoRef,
        release: &NewRelease,
    ) -> std::result::Result<ReleaseHandle, BackendError> {
        let operation = "create_release";
        let url = format!("{}/releases", self.repo_url(repo));
        let payload = CreateReleaseRequest {
            tag_name: &release.tag,
            name: &release.name,
            body: &release.body,
            draft: false,
            prerelease: false,
        };

        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| transport(operation, e))?;
        let response = check_status(response, operation, || format!("releases of {repo}")).await?;
        let created: ReleaseResponse = response.json().await.map_err(|e| invalid(operation, e))?;
        Ok(created.into())
    }

    async fn upload_release_asset(
        &self,
        _repo: &RepoRef,
        release: &ReleaseHandle,
        asset: &AssetUpload,
    ) -> std::result::Result<UploadedAsset, BackendError> {
        let operation = "upload_release_asset";

        let file = tokio::fs::File::open(&asset.path)
            .await
            .map_err(|e| BackendError::Transport {
                operation: operation.to_string(),
                reason: format!("cannot open {}: {e}", asset.path.display()),
            })?;
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));

        let response = self
            .http
            .post(&release.upload_url)
            .query(&[("name", asset.name.as_str())])
            .header(header::CONTENT_TYPE, asset.content_type)
            .header(header::CONTENT_LENGTH, asset.content_length)
            .body(body)
            .send()
            .await
            .map_err(|e| transport(operation, e))?;
        let response = check_status(response, operation, || {
            format!("release {} upload endpoint", release.id)
        })
        .await?;
        let uploaded: AssetResponse = response.json().await.map_err(|e| invalid(operation, e))?;

        Ok(UploadedAsset {
            name: uploaded.name,
            size: uploaded.size,
            browser_download_url: uploaded.browser_download_url,
        })
    }
}

/// `https://uploads.github.com/.../assets{?name,label}` -> `.../assets`
fn strip_uri_template(url: &str) -> &str {
    url.split_once('{').map_or(url, |(base, _)| base)
}

async fn check_status(
    response: reqwest::Response,
    operation: &str,
    resource: impl FnOnce() -> String,
) -> std::result::Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(BackendError::NotFound {
            resource: resource(),
        });
    }

    let body = response.text().await.unwrap_or_default();
    Err(BackendError::Status {
        operation: operation.to_string(),
        status: status.as_u16(),
        body: truncate(&body, MAX_ERROR_BODY),
    })
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}

fn transport(operation: &str, e: reqwest::Error) -> BackendError {
    BackendError::Transport {
        operation: operation.to_string(),
        reason: e.to_string(),
    }
}

fn invalid(operation: &str, e: impl std::fmt::Display) -> BackendError {
    BackendError::InvalidResponse {
        operation: operation.to_string(),
        reason: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_uri_template() {
        assert_eq!(
            strip_uri_template("https://uploads.github.com/repos/o/r/releases/1/assets{?name,label}"),
            "https://uploads.github.com/repos/o/r/releases/1/assets"
        );
        assert_eq!(strip_uri_template("https://x/assets"), "https://x/assets");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc…");
    }

    #[test]
    fn test_release_response_conversion() {
        let raw = r#"{
            "id": 42,
            "upload_url": "https://uploads.github.com/repos/o/r/releases/42/assets{?name,label}",
            "html_url": "https://github.com/o/r/releases/tag/cypress-13.6.0",
            "draft": false
        }"#;
        let parsed: ReleaseResponse = serde_json::from_str(raw).unwrap();
        let handle: ReleaseHandle = parsed.into();
        assert_eq!(handle.id, 42);
        assert_eq!(
            handle.upload_url,
            "https://uploads.github.com/repos/o/r/releases/42/assets"
        );
    }

    #[test]
    fn test_client_rejects_header_breaking_token() {
        assert!(GitHubClient::new("bad\ntoken", None).is_err());
    }

    #[test]
    fn test_api_base_override() {
        let client = GitHubClient::new("t", None)
            .unwrap()
            .with_api_base("https://ghe.example.com/api/v3/");
        assert_eq!(
            client.repo_url(&RepoRef::new("o", "r")),
            "https://ghe.example.com/api/v3/repos/o/r"
        );
    }
}
