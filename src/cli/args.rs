//! Command line argument parsing and validation.
//!
//! Every option can also come from the environment, so CI jobs can configure
//! the tool without long command lines.

use crate::error::{ConfigError, Result};
use crate::github::DEFAULT_API_BASE;
use crate::registry::DEFAULT_REGISTRY_URL;
use crate::source::RepoRef;
use crate::{CacheConfig, ScratchDir};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Mirror third-party binaries and registry tarballs into GitHub releases
#[derive(Parser, Debug)]
#[command(
    name = "kodegen_artifact_cache",
    version,
    about = "Mirror third-party binaries and registry tarballs into GitHub releases",
    long_about = "Read a package.json from a GitHub repository and make sure every dependency has
a cache release holding its downloadable artifacts.

Runs as a dry run unless --deploy is given.

Usage:
  kodegen_artifact_cache --source-repo acme/web
  kodegen_artifact_cache --source-repo acme/web --deploy
  kodegen_artifact_cache --source-repo acme/web --package=cypress --deploy"
)]
pub struct Args {
    /// GitHub token (falls back to GH_TOKEN)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Repository holding the manifest: owner/repo or GitHub URL
    #[arg(long, env = "CACHE_SOURCE_REPO", value_name = "OWNER/REPO")]
    pub source_repo: String,

    /// Manifest path inside the source repository
    #[arg(long, env = "CACHE_MANIFEST_PATH", default_value = "package.json")]
    pub manifest_path: String,

    /// Git ref to read the manifest at (default branch if omitted)
    #[arg(long = "ref", env = "CACHE_SOURCE_REF", value_name = "REF")]
    pub git_ref: Option<String>,

    /// Repository receiving cache releases (defaults to the source repository)
    #[arg(long, env = "CACHE_RELEASE_REPO", value_name = "OWNER/REPO")]
    pub release_repo: Option<String>,

    /// GitHub REST API root (GitHub Enterprise: https://HOST/api/v3)
    #[arg(long, env = "CACHE_GITHUB_API_URL", default_value = DEFAULT_API_BASE)]
    pub api_url: String,

    /// Package registry host for tarball downloads
    #[arg(long, env = "CACHE_REGISTRY_URL", default_value = DEFAULT_REGISTRY_URL)]
    pub registry_url: String,

    /// Directory for transient downloads
    #[arg(long, env = "CACHE_SCRATCH_DIR", value_name = "DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Per-request HTTP timeout in seconds (0 or unset: transport default)
    #[arg(long, env = "CACHE_HTTP_TIMEOUT", value_name = "SECS")]
    pub http_timeout: Option<u64>,

    /// Create releases and upload assets (default is a dry run)
    #[arg(long)]
    pub deploy: bool,

    /// Only cache this dependency
    #[arg(long, value_name = "NAME")]
    pub package: Option<String>,

    /// Exit with status 2 when any package fails
    #[arg(long)]
    pub strict: bool,

    /// Only print errors to the console (log output is unaffected)
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Resolve the GitHub token from --token / GITHUB_TOKEN, then GH_TOKEN
    pub fn token(&self) -> Result<String> {
        self.token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| std::env::var("GH_TOKEN").ok().filter(|t| !t.trim().is_empty()))
            .ok_or_else(|| ConfigError::MissingToken.into())
    }

    /// Build the run configuration
    pub fn to_config(&self) -> Result<CacheConfig> {
        let source_repo = RepoRef::parse(&self.source_repo)?;
        let release_repo = match &self.release_repo {
            Some(repo) => RepoRef::parse(repo)?,
            None => source_repo.clone(),
        };

        for raw in [&self.registry_url, &self.api_url] {
            url::Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
                url: raw.clone(),
                reason: e.to_string(),
            })?;
        }

        Ok(CacheConfig {
            source_repo,
            manifest_path: self.manifest_path.clone(),
            git_ref: self.git_ref.clone(),
            release_repo,
            api_base: self.api_url.trim_end_matches('/').to_string(),
            registry_url: self.registry_url.trim_end_matches('/').to_string(),
            scratch_dir: self
                .scratch_dir
                .clone()
                .unwrap_or_else(ScratchDir::default_location),
            http_timeout: self
                .http_timeout
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            deploy: self.deploy,
            package_filter: self.package.clone(),
            strict: self.strict,
        })
    }
}

/// Console output settings derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(quiet: bool) -> Self {
        Self {
            output: super::OutputManager::new(quiet),
        }
    }

    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print section header
    pub fn section(&self, title: &str) {
        let _ = self.output.section(title);
    }

    /// Print info message
    pub fn info_println(&self, message: &str) {
        let _ = self.output.info(message);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["kodegen_artifact_cache", "--source-repo", "acme/web"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults_are_dry_run() {
        let config = parse(&[]).to_config().unwrap();
        assert!(!config.deploy);
        assert!(!config.strict);
        assert_eq!(config.manifest_path, "package.json");
        assert_eq!(config.release_repo, RepoRef::new("acme", "web"));
        assert_eq!(config.package_filter, None);
        assert_eq!(config.http_timeout, None);
        assert_eq!(config.api_base, "https://api.github.com");
    }

    #[test]
    fn test_enterprise_api_url() {
        let config = parse(&["--api-url", "https://ghe.example.com/api/v3/"])
            .to_config()
            .unwrap();
        assert_eq!(config.api_base, "https://ghe.example.com/api/v3");

        assert!(parse(&["--api-url", "ghe"]).to_config().is_err());
    }

    #[test]
    fn test_quiet_flag() {
        assert!(parse(&["-q"]).quiet);
        assert!(!parse(&[]).quiet);
    }

    #[test]
    fn test_flags() {
        let config = parse(&[
            "--deploy",
            "--package=electron",
            "--release-repo",
            "acme/artifact-cache",
            "--http-timeout",
            "30",
            "--registry-url",
            "https://registry.example.com/",
        ])
        .to_config()
        .unwrap();

        assert!(config.deploy);
        assert_eq!(config.package_filter.as_deref(), Some("electron"));
        assert_eq!(config.release_repo, RepoRef::new("acme", "artifact-cache"));
        assert_eq!(config.http_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.registry_url, "https://registry.example.com");
    }

    #[test]
    fn test_invalid_registry_url() {
        assert!(parse(&["--registry-url", "not a url"]).to_config().is_err());
    }

    #[test]
    fn test_explicit_token_wins() {
        let args = parse(&["--token", "abc"]);
        assert_eq!(args.token().unwrap(), "abc");
    }
}
