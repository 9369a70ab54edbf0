//! Batch processing of classified work items.

use crate::download::HttpTransport;
use crate::error::{CacheError, PublishError};
use crate::github::ReleaseBackend;
use crate::manifest::PackageWorkItem;
use crate::publish::{ItemOutcome, ReleasePublisher};
use crate::tag;
use std::collections::HashMap;

/// Result for one work item
#[derive(Debug)]
pub struct ItemReport {
    /// Dependency name
    pub name: String,
    /// Normalized version
    pub version: String,
    /// Sanitized tag
    pub tag: String,
    /// Success or the error that ended this item
    pub outcome: Result<ItemOutcome, CacheError>,
}

impl ItemReport {
    /// Whether this item succeeded
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Aggregate result of a batch
#[derive(Debug)]
pub struct BatchSummary {
    /// Whether the batch ran in deploy mode
    pub deploy: bool,
    /// Per-item results, in processing order
    pub reports: Vec<ItemReport>,
}

impl BatchSummary {
    /// Items that succeeded (including already-cached ones)
    pub fn succeeded(&self) -> usize {
        self.reports.iter().filter(|r| r.is_success()).count()
    }

    /// Items processed
    pub fn total(&self) -> usize {
        self.reports.len()
    }

    /// Items that failed
    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    /// No item matched the filter or the manifest was empty
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Items were processed and none succeeded
    pub fn all_failed(&self) -> bool {
        !self.is_empty() && self.succeeded() == 0
    }

    /// One-line summary
    pub fn message(&self) -> String {
        if self.is_empty() {
            return "Nothing to cache".to_string();
        }
        let counts = format!("{}/{}", self.succeeded(), self.total());
        match (self.deploy, self.all_failed()) {
            (_, true) => format!("All packages failed ({counts} succeeded)"),
            (true, false) => format!("Cached {counts} packages"),
            (false, false) => format!(
                "Dry run complete: {counts} packages would be cached. Re-run with --deploy to create releases"
            ),
        }
    }

    /// Process exit code: failures only count when `strict` is set
    pub fn exit_code(&self, strict: bool) -> i32 {
        if strict && self.failed() > 0 { 2 } else { 0 }
    }
}

/// Keep items matching `filter` (all items when `None`)
pub fn select(items: Vec<PackageWorkItem>, filter: Option<&str>) -> Vec<PackageWorkItem> {
    match filter {
        Some(name) => items.into_iter().filter(|i| i.name == name).collect(),
        None => items,
    }
}

/// Versions like `user/repo#v1` or `file:../pkg` would escape the scratch directory
fn has_path_separator(version: &str) -> bool {
    version.contains(['/', '\\'])
}

/// Publish every selected item, one at a time
///
/// Item failures are recorded and never stop the batch.
pub async fn run<B: ReleaseBackend, T: HttpTransport>(
    items: Vec<PackageWorkItem>,
    filter: Option<&str>,
    publisher: &ReleasePublisher<'_, B, T>,
) -> BatchSummary {
    let selected = select(items, filter);
    if selected.is_empty() {
        match filter {
            Some(name) => log::info!("No dependency named '{name}'; nothing to cache"),
            None => log::info!("Manifest declares no dependencies; nothing to cache"),
        }
    }

    let mut claimed: HashMap<String, String> = HashMap::new();
    let mut reports = Vec::with_capacity(selected.len());

    for (index, item) in selected.iter().enumerate() {
        let tag = tag::sanitize(&item.name, &item.version);
        log::info!(
            "[{}/{}] {}@{} ({:?}, tag {tag})",
            index + 1,
            selected.len(),
            item.name,
            item.version,
            item.kind()
        );

        let key = format!("{}@{}", item.name, item.version);
        let outcome = if has_path_separator(&item.version) {
            Err(PublishError::UnsupportedVersion {
                name: item.name.clone(),
                version: item.version.clone(),
            }
            .into())
        } else if !tag::is_valid(&tag) {
            Err(PublishError::InvalidTag {
                name: item.name.clone(),
                version: item.version.clone(),
            }
            .into())
        } else if let Some(other) = claimed.get(&tag) {
            Err(PublishError::TagCollision {
                tag: tag.clone(),
                name: item.name.clone(),
                version: item.version.clone(),
                other: other.clone(),
            }
            .into())
        } else {
            claimed.insert(tag.clone(), key);
            publisher.publish(item, &tag).await
        };

        if let Err(e) = &outcome {
            log::error!("✗ {}@{} failed: {e}", item.name, item.version);
        }

        reports.push(ItemReport {
            name: item.name.clone(),
            version: item.version.clone(),
            tag,
            outcome,
        });
    }

    BatchSummary {
        deploy: publisher.is_deploy(),
        reports,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ArtifactDescriptor, DEFAULT_REGISTRY_URL};

    fn item(name: &str) -> PackageWorkItem {
        PackageWorkItem {
            name: name.to_string(),
            version: "1.0.0".to_string(),
            descriptor: ArtifactDescriptor::classify(name, DEFAULT_REGISTRY_URL),
        }
    }

    fn report(ok: bool) -> ItemReport {
        ItemReport {
            name: "x".to_string(),
            version: "1.0.0".to_string(),
            tag: "x-1.0.0".to_string(),
            outcome: if ok {
                Ok(ItemOutcome::AlreadyCached {
                    tag: "x-1.0.0".to_string(),
                    html_url: "https://github.com/o/r/releases/tag/x-1.0.0".to_string(),
                })
            } else {
                Err(PublishError::InvalidTag {
                    name: "x".to_string(),
                    version: "1.0.0".to_string(),
                }
                .into())
            },
        }
    }

    #[test]
    fn test_select_filter() {
        let items = vec![item("cypress"), item("electron"), item("left-pad")];
        let selected = select(items.clone(), Some("electron"));
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "electron");

        assert!(select(items.clone(), Some("missing")).is_empty());
        assert_eq!(select(items, None).len(), 3);
    }

    #[test]
    fn test_summary_messages() {
        let empty = BatchSummary { deploy: false, reports: vec![] };
        assert_eq!(empty.message(), "Nothing to cache");
        assert!(!empty.all_failed());

        let dry = BatchSummary { deploy: false, reports: vec![report(true)] };
        assert!(dry.message().starts_with("Dry run complete: 1/1"));

        let deployed = BatchSummary { deploy: true, reports: vec![report(true), report(false)] };
        assert_eq!(deployed.message(), "Cached 1/2 packages");

        let failed = BatchSummary { deploy: true, reports: vec![report(false)] };
        assert!(failed.all_failed());
        assert_eq!(failed.message(), "All packages failed (0/1 succeeded)");
    }

    #[test]
    fn test_path_like_versions() {
        assert!(has_path_separator("user/repo#v1.0.0"));
        assert!(has_path_separator("file:..\\pkg"));
        assert!(!has_path_separator("13.6.0"));
        assert!(!has_path_separator("1.0.0-beta.1"));
    }

    #[test]
    fn test_exit_codes() {
        let partial = BatchSummary { deploy: true, reports: vec![report(true), report(false)] };
        assert_eq!(partial.exit_code(false), 0);
        assert_eq!(partial.exit_code(true), 2);

        let clean = BatchSummary { deploy: true, reports: vec![report(true)] };
        assert_eq!(clean.exit_code(true), 0);
    }
}
