//! Repository reference resolution (GitHub URLs, org/repo notation)

use crate::error::{ConfigError, Result};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// A GitHub repository identified by owner and name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
}

impl RepoRef {
    /// Create from already-split parts
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Parse input string into RepoRef
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        // Try as GitHub URL: https://github.com/owner/repo
        static GITHUB_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^https?://github\.com/(?P<owner>[^/]+)/(?P<repo>[^/]+?)(?:\.git)?/?$")
                .expect("GitHub URL regex is valid")
        });

        if let Some(caps) = GITHUB_URL_RE.captures(input) {
            return Ok(Self::new(&caps["owner"], &caps["repo"]));
        }

        // Try as org/repo notation
        if let Some((owner, repo)) = input.split_once('/') {
            let repo = repo.trim_end_matches(".git");
            if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') {
                return Ok(Self::new(owner, repo));
            }
        }

        Err(ConfigError::InvalidRepo {
            input: input.to_string(),
        }
        .into())
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_owner_repo() {
        let r = RepoRef::parse("cyrup-ai/kodegen").unwrap();
        assert_eq!(r, RepoRef::new("cyrup-ai", "kodegen"));
        assert_eq!(r.to_string(), "cyrup-ai/kodegen");
    }

    #[test]
    fn test_parse_github_url() {
        let r = RepoRef::parse("https://github.com/cyrup-ai/kodegen.git").unwrap();
        assert_eq!(r, RepoRef::new("cyrup-ai", "kodegen"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(RepoRef::parse("kodegen").is_err());
        assert!(RepoRef::parse("/kodegen").is_err());
        assert!(RepoRef::parse("a/b/c").is_err());
    }
}
