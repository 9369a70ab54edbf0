//! Error types for artifact cache operations.
//!
//! This module defines all error types with actionable error messages and recovery suggestions.

use thiserror::Error;

/// Result type alias for artifact cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

/// Main error type for all artifact cache operations
#[derive(Error, Debug)]
pub enum CacheError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Manifest fetch/parse errors
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Release hosting backend errors
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Artifact download errors
    #[error("Download error: {0}")]
    Download(#[from] DownloadError),

    /// Release publishing errors
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),
}

/// Configuration errors. All of these abort the run before any work starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No GitHub token available
    #[error("GitHub token not provided. Set GITHUB_TOKEN or GH_TOKEN, or pass --token")]
    MissingToken,

    /// Token contains characters not allowed in an HTTP header
    #[error("GitHub token is not a valid header value")]
    InvalidToken,

    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {reason}")]
    HttpClient {
        /// Reason for the error
        reason: String,
    },

    /// Repository reference could not be parsed
    #[error("Invalid repository '{input}'. Use owner/repo or https://github.com/owner/repo")]
    InvalidRepo {
        /// Raw input
        input: String,
    },

    /// A configured URL is malformed
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// Raw URL
        url: String,
        /// Parse failure
        reason: String,
    },
}

/// Manifest errors
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Remote fetch failed or the path is not a file
    #[error("Manifest '{path}' unavailable: {reason}")]
    Unavailable {
        /// Manifest path in the source repository
        path: String,
        /// Reason for the error
        reason: String,
    },

    /// Content could not be decoded into UTF-8 text
    #[error("Manifest '{path}' could not be decoded: {reason}")]
    Decode {
        /// Manifest path in the source repository
        path: String,
        /// Reason for the error
        reason: String,
    },

    /// Content is not well-formed JSON
    #[error("Manifest '{path}' is not valid JSON: {source}")]
    Parse {
        /// Manifest path in the source repository
        path: String,
        /// Parser error
        #[source]
        source: serde_json::Error,
    },
}

/// Release hosting backend errors
#[derive(Error, Debug)]
pub enum BackendError {
    /// Resource does not exist (HTTP 404)
    #[error("Not found: {resource}")]
    NotFound {
        /// Resource that was requested
        resource: String,
    },

    /// Non-success HTTP status other than 404
    #[error("GitHub API returned {status} for {operation}: {body}")]
    Status {
        /// Operation that failed
        operation: String,
        /// HTTP status code
        status: u16,
        /// Response body (truncated)
        body: String,
    },

    /// Network-level failure
    #[error("Request failed for {operation}: {reason}")]
    Transport {
        /// Operation that failed
        operation: String,
        /// Reason for the error
        reason: String,
    },

    /// Response body did not have the expected shape
    #[error("Unexpected response for {operation}: {reason}")]
    InvalidResponse {
        /// Operation that failed
        operation: String,
        /// Reason for the error
        reason: String,
    },
}

impl BackendError {
    /// Whether this error is a plain "not found" answer
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::NotFound { .. })
    }
}

/// Artifact download errors
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Redirect chain exceeded the hop limit
    #[error("Too many redirects fetching {url} (limit {limit})")]
    TooManyRedirects {
        /// Original URL
        url: String,
        /// Maximum hops allowed
        limit: usize,
    },

    /// A redirect response carried no Location header
    #[error("Redirect from {url} has no Location header")]
    RedirectMissingLocation {
        /// URL that answered with the redirect
        url: String,
    },

    /// A Location header could not be resolved into a URL
    #[error("Invalid redirect target '{location}' from {url}")]
    InvalidRedirect {
        /// URL that answered with the redirect
        url: String,
        /// Raw Location header value
        location: String,
    },

    /// Terminal response was not 2xx
    #[error("Download of {url} failed with HTTP {status}")]
    DownloadFailed {
        /// URL of the terminal request
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Transport-level failure
    #[error("Download of {url} failed: {reason}")]
    Transport {
        /// URL being fetched
        url: String,
        /// Reason for the error
        reason: String,
    },

    /// Local filesystem failure while writing the scratch file
    #[error("Failed writing {path}: {source}")]
    Io {
        /// Scratch file path
        path: std::path::PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Release publishing errors
#[derive(Error, Debug)]
pub enum PublishError {
    /// Existence check failed with something other than "not found"
    #[error("Could not check release '{tag}': {source}")]
    TransientLookup {
        /// Sanitized tag
        tag: String,
        /// Backend failure
        #[source]
        source: BackendError,
    },

    /// Release creation failed
    #[error("Could not create release '{tag}': {source}")]
    CreateFailed {
        /// Sanitized tag
        tag: String,
        /// Backend failure
        #[source]
        source: BackendError,
    },

    /// Asset upload failed
    #[error("Could not upload '{asset}': {source}")]
    UploadFailed {
        /// Asset filename
        asset: String,
        /// Backend failure
        #[source]
        source: BackendError,
    },

    /// Sanitization left nothing usable
    #[error("Package '{name}' version '{version}' sanitizes to an empty tag")]
    InvalidTag {
        /// Package name
        name: String,
        /// Package version
        version: String,
    },

    /// Version is a path-like spec (git URL, tarball path) rather than a version
    #[error("Package '{name}' version '{version}' is not a plain version; path separators are not supported")]
    UnsupportedVersion {
        /// Package name
        name: String,
        /// Package version
        version: String,
    },

    /// Another package in this run already claimed the tag
    #[error("Tag '{tag}' for {name}@{version} collides with {other}")]
    TagCollision {
        /// Sanitized tag
        tag: String,
        /// Package name
        name: String,
        /// Package version
        version: String,
        /// The name@version that claimed the tag first
        other: String,
    },
}

impl CacheError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            CacheError::Config(ConfigError::MissingToken) => vec![
                "Export a token: export GITHUB_TOKEN=<token>".to_string(),
                "The token needs contents:write on the release repository".to_string(),
            ],
            CacheError::Config(ConfigError::InvalidRepo { .. }) => vec![
                "Pass repositories as owner/repo, e.g. --source-repo cyrup-ai/app".to_string(),
            ],
            CacheError::Manifest(ManifestError::Unavailable { .. }) => vec![
                "Check --manifest-path and --ref point at an existing file".to_string(),
                "Verify the token can read the source repository".to_string(),
            ],
            CacheError::Manifest(ManifestError::Parse { .. }) => vec![
                "Validate the manifest locally: jq . package.json".to_string(),
            ],
            CacheError::Publish(PublishError::UnsupportedVersion { .. }) => vec![
                "Pin the dependency to a registry version, or cache it by hand".to_string(),
            ],
            CacheError::Publish(PublishError::TransientLookup { .. }) => vec![
                "Re-run later; existing releases are never re-created".to_string(),
                "Check the GitHub rate limit: gh api rate_limit".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}
