//! Release existence checks.

use crate::error::BackendError;
use crate::github::{ReleaseBackend, ReleaseHandle};
use crate::source::RepoRef;

/// Result of looking up a cache release by tag
#[derive(Debug)]
pub enum ExistenceCheck {
    /// A release with this tag exists
    Exists(ReleaseHandle),
    /// The backend answered "not found"
    Absent,
    /// Anything else. Must not be treated as absent.
    TransientError(BackendError),
}

/// Look up `tag` on the release backend.
///
/// Only an explicit not-found maps to [`ExistenceCheck::Absent`]; rate limits,
/// auth and network failures come back as [`ExistenceCheck::TransientError`]
/// so a release is never created twice on a flaky lookup.
pub async fn check_existence<B: ReleaseBackend>(
    backend: &B,
    repo: &RepoRef,
    tag: &str,
) -> ExistenceCheck {
    match backend.get_release_by_tag(repo, tag).await {
        Ok(handle) => ExistenceCheck::Exists(handle),
        Err(e) if e.is_not_found() => ExistenceCheck::Absent,
        Err(e) => ExistenceCheck::TransientError(e),
    }
}
