//! Cache release publishing.
//!
//! Per work item: existence check, then (if absent) create the release,
//! download and upload every platform asset in order, and always clean up
//! the scratch files it produced.

mod existence;
mod notes;

pub use existence::{ExistenceCheck, check_existence};
pub use notes::{release_body, release_title};

use crate::CacheConfig;
use crate::download::{Downloader, HttpTransport, ScratchFile};
use crate::error::{PublishError, Result};
use crate::github::{AssetUpload, NewRelease, ReleaseBackend, ReleaseHandle};
use crate::manifest::PackageWorkItem;
use crate::registry::PlatformTarget;

/// The release assets are attached to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseRef {
    /// A real release on the backend
    Remote(ReleaseHandle),
    /// Placeholder used in dry-run mode
    DryRun,
}

/// What happened to one platform target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferAction {
    /// Downloaded and attached to the release
    Uploaded {
        /// Bytes transferred
        size: u64,
        /// Public asset URL
        download_url: String,
    },
    /// Dry run: nothing was downloaded or uploaded
    WouldUpload,
}

/// One platform target processed for a release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    /// Target the asset is for
    pub target: PlatformTarget,
    /// Source URL
    pub url: String,
    /// Asset name
    pub filename: String,
    /// Outcome
    pub action: TransferAction,
}

/// Successful result of publishing one work item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// A release with this tag already existed; nothing was done
    AlreadyCached {
        /// Sanitized tag
        tag: String,
        /// Existing release page
        html_url: String,
    },
    /// Release created (or would be, in dry run) and all assets handled
    Published {
        /// Sanitized tag
        tag: String,
        /// Release assets went to
        release: ReleaseRef,
        /// One entry per platform target, in order
        transfers: Vec<Transfer>,
    },
}

/// Drives the per-item release state machine
pub struct ReleasePublisher<'a, B: ReleaseBackend, T: HttpTransport> {
    backend: &'a B,
    downloader: &'a Downloader<T>,
    config: &'a CacheConfig,
}

impl<'a, B: ReleaseBackend, T: HttpTransport> ReleasePublisher<'a, B, T> {
    /// Create a publisher
    pub fn new(backend: &'a B, downloader: &'a Downloader<T>, config: &'a CacheConfig) -> Self {
        Self {
            backend,
            downloader,
            config,
        }
    }

    /// Whether side effects are enabled
    pub fn is_deploy(&self) -> bool {
        self.config.deploy
    }

    /// Ensure a cache release exists for `item` under `tag`
    ///
    /// A failed existence check returns before anything is allocated. Past
    /// that point, scratch files are removed on every exit path.
    pub async fn publish(&self, item: &PackageWorkItem, tag: &str) -> Result<ItemOutcome> {
        let repo = &self.config.release_repo;

        match check_existence(self.backend, repo, tag).await {
            ExistenceCheck::Exists(handle) => {
                log::info!("✓ {tag} already cached: {}", handle.html_url);
                return Ok(ItemOutcome::AlreadyCached {
                    tag: tag.to_string(),
                    html_url: handle.html_url,
                });
            }
            ExistenceCheck::Absent => {
                log::debug!("No release for {tag} yet");
            }
            ExistenceCheck::TransientError(source) => {
                return Err(PublishError::TransientLookup {
                    tag: tag.to_string(),
                    source,
                }
                .into());
            }
        }

        let mut scratch_files = Vec::new();
        let result = self.create_and_transfer(item, tag, &mut scratch_files).await;
        self.cleanup(&scratch_files).await;
        result
    }

    async fn create_and_transfer(
        &self,
        item: &PackageWorkItem,
        tag: &str,
        scratch_files: &mut Vec<ScratchFile>,
    ) -> Result<ItemOutcome> {
        let release = self.create_release(item, tag).await?;

        let mut transfers = Vec::with_capacity(item.descriptor.platforms().len());
        for target in item.descriptor.platforms() {
            // fail-fast: the first broken target abandons the rest
            let transfer = self.transfer(item, &release, target, scratch_files).await?;
            transfers.push(transfer);
        }

        Ok(ItemOutcome::Published {
            tag: tag.to_string(),
            release,
            transfers,
        })
    }

    async fn create_release(&self, item: &PackageWorkItem, tag: &str) -> Result<ReleaseRef> {
        let new_release = NewRelease {
            tag: tag.to_string(),
            name: release_title(item),
            body: release_body(item, &self.config.source_repo, chrono::Utc::now()),
        };

        if !self.config.deploy {
            log::info!(
                "[dry-run] Would create release {} ({}) in {}",
                new_release.tag,
                new_release.name,
                self.config.release_repo
            );
            log::debug!("[dry-run] Release body:\n{}", new_release.body);
            return Ok(ReleaseRef::DryRun);
        }

        let handle = self
            .backend
            .create_release(&self.config.release_repo, &new_release)
            .await
            .map_err(|source| PublishError::CreateFailed {
                tag: tag.to_string(),
                source,
            })?;
        log::info!("Created release {tag}: {}", handle.html_url);
        Ok(ReleaseRef::Remote(handle))
    }

    async fn transfer(
        &self,
        item: &PackageWorkItem,
        release: &ReleaseRef,
        target: &PlatformTarget,
        scratch_files: &mut Vec<ScratchFile>,
    ) -> Result<Transfer> {
        let url = item.descriptor.build_url(&item.version, target);
        let filename = item.descriptor.build_filename(&item.version, target);

        let handle = match release {
            ReleaseRef::DryRun => {
                log::info!("[dry-run] Would download {} ({}): {url}", filename, target.os);
                log::info!("[dry-run] Would upload {filename}");
                return Ok(Transfer {
                    target: *target,
                    url,
                    filename,
                    action: TransferAction::WouldUpload,
                });
            }
            ReleaseRef::Remote(handle) => handle,
        };

        let file = self
            .downloader
            .download(&item.descriptor, &item.version, target)
            .await?;
        scratch_files.push(file.clone());

        let upload = AssetUpload {
            name: file.filename.clone(),
            path: file.path.clone(),
            content_type: item.kind().content_type(),
            content_length: file.size,
        };
        let asset = self
            .backend
            .upload_release_asset(&self.config.release_repo, handle, &upload)
            .await
            .map_err(|source| PublishError::UploadFailed {
                asset: upload.name.clone(),
                source,
            })?;
        log::info!("Uploaded {} ({} bytes)", asset.name, asset.size);

        Ok(Transfer {
            target: *target,
            url,
            filename,
            action: TransferAction::Uploaded {
                size: asset.size,
                download_url: asset.browser_download_url,
            },
        })
    }

    async fn cleanup(&self, scratch_files: &[ScratchFile]) {
        let scratch = self.downloader.scratch();
        scratch.remove_files(scratch_files).await;
        scratch.remove_if_empty().await;
    }
}
