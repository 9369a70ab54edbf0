//! GitHub integration: manifest source and release hosting.
//!
//! The cache pipeline only talks to the two collaborator traits defined here.
//! [`GitHubClient`] implements both over the REST API; tests substitute
//! recording stubs.

mod client;

pub use client::{DEFAULT_API_BASE, GitHubClient};

use crate::error::BackendError;
use crate::source::RepoRef;
use std::future::Future;
use std::path::PathBuf;

/// One entry returned by the repository contents API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentEntry {
    /// Entry type: "file", "dir", "symlink" or "submodule"
    pub kind: String,
    /// Base64 encoded body, present for files
    pub content: Option<String>,
}

/// A release that exists on the hosting backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseHandle {
    /// Release ID
    pub id: u64,
    /// Asset upload endpoint (URI template suffix already removed)
    pub upload_url: String,
    /// Release page URL
    pub html_url: String,
}

/// Parameters for a new, published, non-prerelease release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRelease {
    /// Tag to create the release under
    pub tag: String,
    /// Release title
    pub name: String,
    /// Release notes
    pub body: String,
}

/// A local file to attach to a release
#[derive(Debug, Clone)]
pub struct AssetUpload {
    /// Asset name on the release
    pub name: String,
    /// File to stream from
    pub path: PathBuf,
    /// MIME type
    pub content_type: &'static str,
    /// Exact size in bytes
    pub content_length: u64,
}

/// Asset as reported back by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    /// Asset name
    pub name: String,
    /// Stored size in bytes
    pub size: u64,
    /// Public download URL
    pub browser_download_url: String,
}

/// Where the dependency manifest is read from
pub trait ManifestSource: Send + Sync {
    /// Fetch one path of a repository at an optional ref
    fn get_content(
        &self,
        repo: &RepoRef,
        path: &str,
        git_ref: Option<&str>,
    ) -> impl Future<Output = Result<ContentEntry, BackendError>> + Send;
}

/// Where cache releases live
///
/// Every call is a single remote operation that may fail; there is no local
/// fallback.
pub trait ReleaseBackend: Send + Sync {
    /// Look up a release by exact tag. Absent releases yield [`BackendError::NotFound`].
    fn get_release_by_tag(
        &self,
        repo: &RepoRef,
        tag: &str,
    ) -> impl Future<Output = Result<ReleaseHandle, BackendError>> + Send;

    /// Create a published release
    fn create_release(
        &self,
        repo: &RepoRef,
        release: &NewRelease,
    ) -> impl Future<Output = Result<ReleaseHandle, BackendError>> + Send;

    /// Attach a file to an existing release
    fn upload_release_asset(
        &self,
        repo: &RepoRef,
        release: &ReleaseHandle,
        asset: &AssetUpload,
    ) -> impl Future<Output = Result<UploadedAsset, BackendError>> + Send;
}
