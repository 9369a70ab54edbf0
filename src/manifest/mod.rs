//! Dependency manifest resolution.
//!
//! Fetches `package.json` style manifests from the source repository and turns
//! their `dependencies` / `devDependencies` into [`PackageWorkItem`]s.
//!
//! Merge order: runtime dependencies are read first, development dependencies
//! are overlaid on top. A name declared in both groups keeps its runtime
//! position in the iteration order but takes the development version.

use crate::error::{ManifestError, Result};
use crate::github::ManifestSource;
use crate::registry::{ArtifactDescriptor, ArtifactKind};
use crate::source::RepoRef;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::{Map, Value};

/// One dependency as declared in the manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEntry {
    /// Dependency name
    pub name: String,
    /// Version spec as written, e.g. `^13.6.0`
    pub raw_version_spec: String,
}

impl DependencyEntry {
    /// Concrete version with a single leading range prefix removed
    pub fn version(&self) -> &str {
        normalize_version(&self.raw_version_spec)
    }
}

/// A package-version pair queued for caching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageWorkItem {
    /// Dependency name
    pub name: String,
    /// Normalized version
    pub version: String,
    /// How to fetch its assets
    pub descriptor: ArtifactDescriptor,
}

impl PackageWorkItem {
    /// Binary or registry
    pub fn kind(&self) -> ArtifactKind {
        self.descriptor.kind()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageManifest {
    #[serde(default)]
    dependencies: Map<String, Value>,
    #[serde(default)]
    dev_dependencies: Map<String, Value>,
}

/// Strip one leading `^` or `~`
pub fn normalize_version(spec: &str) -> &str {
    spec.strip_prefix(['^', '~']).unwrap_or(spec)
}

/// Fetch raw manifest text from the source repository
pub async fn fetch_manifest<S: ManifestSource>(
    source: &S,
    repo: &RepoRef,
    path: &str,
    git_ref: Option<&str>,
) -> Result<String> {
    let entry = source
        .get_content(repo, path, git_ref)
        .await
        .map_err(|e| ManifestError::Unavailable {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

    if entry.kind != "file" {
        return Err(ManifestError::Unavailable {
            path: path.to_string(),
            reason: format!("expected a file, found '{}'", entry.kind),
        }
        .into());
    }

    let encoded = entry.content.ok_or_else(|| ManifestError::Unavailable {
        path: path.to_string(),
        reason: "response carried no content".to_string(),
    })?;

    decode_content(path, &encoded)
}

/// Decode the base64 body the contents API returns (line-wrapped at 60 chars)
pub fn decode_content(path: &str, encoded: &str) -> Result<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| ManifestError::Decode {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
    String::from_utf8(bytes).map_err(|e| {
        ManifestError::Decode {
            path: path.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// Parse manifest text into merged dependency entries, in manifest order
pub fn parse_dependencies(path: &str, text: &str) -> Result<Vec<DependencyEntry>> {
    let manifest: PackageManifest =
        serde_json::from_str(text).map_err(|source| ManifestError::Parse {
            path: path.to_string(),
            source,
        })?;

    let mut merged: Map<String, Value> = manifest.dependencies;
    for (name, spec) in manifest.dev_dependencies {
        // preserve_order map: re-inserting an existing key keeps its position
        merged.insert(name, spec);
    }

    let entries = merged
        .into_iter()
        .filter_map(|(name, spec)| match spec {
            Value::String(raw_version_spec) => Some(DependencyEntry {
                name,
                raw_version_spec,
            }),
            other => {
                log::warn!("Skipping dependency '{name}': version spec is not a string ({other})");
                None
            }
        })
        .collect();

    Ok(entries)
}

/// Classify dependency entries into work items
pub fn classify(entries: &[DependencyEntry], registry_url: &str) -> Vec<PackageWorkItem> {
    entries
        .iter()
        .map(|entry| {
            let version = entry.version().to_string();
            if semver::Version::parse(&version).is_err() {
                log::warn!(
                    "Dependency '{}' has non-concrete version '{}'; download URLs may not resolve",
                    entry.name,
                    entry.raw_version_spec
                );
            }
            let descriptor = ArtifactDescriptor::classify(&entry.name, registry_url);
            log::debug!(
                "Classified {}@{} as {:?}",
                entry.name,
                version,
                descriptor.kind()
            );
            PackageWorkItem {
                name: entry.name.clone(),
                version,
                descriptor,
            }
        })
        .collect()
}

/// Fetch, parse, and classify the manifest in one step
pub async fn resolve<S: ManifestSource>(
    source: &S,
    repo: &RepoRef,
    path: &str,
    git_ref: Option<&str>,
    registry_url: &str,
) -> Result<Vec<PackageWorkItem>> {
    let text = fetch_manifest(source, repo, path, git_ref).await?;
    let entries = parse_dependencies(path, &text)?;
    log::info!("Manifest {repo}:{path} declares {} dependencies", entries.len());
    Ok(classify(&entries, registry_url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BackendError, CacheError};
    use crate::github::ContentEntry;
    use crate::registry::DEFAULT_REGISTRY_URL;

    /// Answers every request with the same canned result
    struct CannedSource(fn() -> std::result::Result<ContentEntry, BackendError>);

    impl ManifestSource for CannedSource {
        async fn get_content(
            &self,
            _repo: &RepoRef,
            _path: &str,
            _git_ref: Option<&str>,
        ) -> std::result::Result<ContentEntry, BackendError> {
            (self.0)()
        }
    }

    async fn fetch(source: CannedSource) -> Result<String> {
        fetch_manifest(&source, &RepoRef::new("acme", "web"), "package.json", None).await
    }

    fn assert_unavailable(result: Result<String>) {
        match result {
            Err(CacheError::Manifest(ManifestError::Unavailable { path, .. })) => {
                assert_eq!(path, "package.json");
            }
            other => panic!("expected Unavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_decodes_file() {
        let text = fetch(CannedSource(|| {
            Ok(ContentEntry {
                kind: "file".to_string(),
                content: Some("eyJuYW1lIjoieCJ9\n".to_string()),
            })
        }))
        .await
        .unwrap();
        assert_eq!(text, r#"{"name":"x"}"#);
    }

    #[tokio::test]
    async fn test_directory_is_unavailable() {
        assert_unavailable(
            fetch(CannedSource(|| {
                Ok(ContentEntry {
                    kind: "dir".to_string(),
                    content: None,
                })
            }))
            .await,
        );
    }

    #[tokio::test]
    async fn test_missing_content_is_unavailable() {
        assert_unavailable(
            fetch(CannedSource(|| {
                Ok(ContentEntry {
                    kind: "file".to_string(),
                    content: None,
                })
            }))
            .await,
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_is_unavailable() {
        assert_unavailable(
            fetch(CannedSource(|| {
                Err(BackendError::Transport {
                    operation: "get_content".to_string(),
                    reason: "connection refused".to_string(),
                })
            }))
            .await,
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_unavailable() {
        assert_unavailable(
            fetch(CannedSource(|| {
                Err(BackendError::NotFound {
                    resource: "acme/web:package.json".to_string(),
                })
            }))
            .await,
        );
    }

    #[test]
    fn test_normalize_version() {
        assert_eq!(normalize_version("^13.6.0"), "13.6.0");
        assert_eq!(normalize_version("~1.3.0"), "1.3.0");
        assert_eq!(normalize_version("1.3.0"), "1.3.0");
        // only one prefix is removed
        assert_eq!(normalize_version("^~1.0.0"), "~1.0.0");
        assert_eq!(normalize_version(">=1.0.0"), ">=1.0.0");
    }

    #[test]
    fn test_dev_overrides_runtime_and_keeps_position() {
        let text = r#"{
            "name": "app",
            "dependencies": { "electron": "^27.0.0", "left-pad": "~1.3.0" },
            "devDependencies": { "cypress": "^13.6.0", "electron": "28.1.0" }
        }"#;
        let entries = parse_dependencies("package.json", text).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["electron", "left-pad", "cypress"]);
        assert_eq!(entries[0].version(), "28.1.0");
    }

    #[test]
    fn test_missing_groups_are_empty() {
        let entries = parse_dependencies("package.json", r#"{"name": "x"}"#).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_non_string_specs_skipped() {
        let text = r#"{"dependencies": {"odd": {"version": "1"}, "ok": "1.0.0"}}"#;
        let entries = parse_dependencies("package.json", text).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "ok");
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = parse_dependencies("package.json", "{ not json").unwrap_err();
        assert!(matches!(err, CacheError::Manifest(ManifestError::Parse { .. })));
    }

    #[test]
    fn test_decode_wrapped_base64() {
        let encoded = "eyJkZXBlbmRlbmNpZXMiOnsi\nY3lwcmVzcyI6Il4xMy42LjAifX0=\n";
        let text = decode_content("package.json", encoded).unwrap();
        assert_eq!(text, r#"{"dependencies":{"cypress":"^13.6.0"}}"#);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode_content("package.json", "***").unwrap_err();
        assert!(matches!(err, CacheError::Manifest(ManifestError::Decode { .. })));
    }

    #[test]
    fn test_classify_known_and_registry() {
        let entries = vec![
            DependencyEntry {
                name: "cypress".to_string(),
                raw_version_spec: "^13.6.0".to_string(),
            },
            DependencyEntry {
                name: "left-pad".to_string(),
                raw_version_spec: "~1.3.0".to_string(),
            },
        ];
        let items = classify(&entries, DEFAULT_REGISTRY_URL);
        assert_eq!(items[0].version, "13.6.0");
        assert_eq!(items[0].kind(), ArtifactKind::Binary);
        assert_eq!(items[1].version, "1.3.0");
        assert_eq!(items[1].kind(), ArtifactKind::Registry);
    }
}
