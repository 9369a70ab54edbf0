//! # Kodegen Artifact Cache
//!
//! Mirrors third-party binaries and package tarballs into GitHub releases so
//! CI pipelines can fetch them from a fast, controlled source.
//!
//! The dependency manifest of a source repository is read once; every
//! dependency is classified as a known vendor binary (one asset per
//! platform) or a plain registry tarball (one asset), and a release tagged
//! `{name}-{version}` is created for it unless one already exists.
//!
//! ## Features
//!
//! - **Idempotent**: an existing release for a tag is never re-created or touched
//! - **Dry run by default**: nothing is created or uploaded without `--deploy`
//! - **Streaming**: downloads and uploads go through disk, not memory
//! - **Self-cleaning**: scratch files are removed after every package
//!
//! ## Usage
//!
//! ```bash
//! kodegen_artifact_cache --source-repo acme/web                     # dry run
//! kodegen_artifact_cache --source-repo acme/web --deploy            # create releases
//! kodegen_artifact_cache --source-repo acme/web --package=electron  # one package
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Core modules
pub mod batch;
pub mod cli;
pub mod download;
pub mod error;
pub mod github;
pub mod manifest;
pub mod publish;
pub mod registry;
pub mod source;
pub mod tag;

// Re-export main types for public API
pub use batch::{BatchSummary, ItemReport};
pub use cli::Args;
pub use download::{Downloader, HttpTransport, ScratchDir, ScratchFile};
pub use error::{CacheError, Result};
pub use github::{GitHubClient, ManifestSource, ReleaseBackend, ReleaseHandle};
pub use manifest::{DependencyEntry, PackageWorkItem};
pub use publish::{ItemOutcome, ReleasePublisher};
pub use registry::{ArtifactDescriptor, ArtifactKind, KnownArtifact, PlatformTarget};
pub use source::RepoRef;

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for a cache run
///
/// Built once from CLI arguments and passed by reference to every component
/// that needs it.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Repository holding the manifest
    pub source_repo: RepoRef,
    /// Manifest path inside the source repository
    pub manifest_path: String,
    /// Git ref to read the manifest at (default branch when `None`)
    pub git_ref: Option<String>,
    /// Repository receiving cache releases
    pub release_repo: RepoRef,
    /// GitHub REST API root
    pub api_base: String,
    /// Registry host for tarball downloads
    pub registry_url: String,
    /// Transient download directory
    pub scratch_dir: PathBuf,
    /// Per-request HTTP timeout
    pub http_timeout: Option<Duration>,
    /// Create releases and upload assets (otherwise dry run)
    pub deploy: bool,
    /// Only process this dependency
    pub package_filter: Option<String>,
    /// Exit non-zero when any package fails
    pub strict: bool,
}

impl CacheConfig {
    /// Dry-run configuration with defaults for everything but the repositories
    pub fn new(source_repo: RepoRef, release_repo: RepoRef) -> Self {
        Self {
            source_repo,
            manifest_path: "package.json".to_string(),
            git_ref: None,
            release_repo,
            api_base: github::DEFAULT_API_BASE.to_string(),
            registry_url: registry::DEFAULT_REGISTRY_URL.to_string(),
            scratch_dir: ScratchDir::default_location(),
            http_timeout: None,
            deploy: false,
            package_filter: None,
            strict: false,
        }
    }
}
