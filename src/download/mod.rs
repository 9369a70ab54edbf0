//! Artifact downloads into the scratch directory.
//!
//! Downloads follow redirects by hand (at most [`MAX_REDIRECTS`] hops) so the
//! hop budget is ours, stream straight to disk, and never leave a partially
//! written file behind.

mod scratch;
mod transport;

pub use scratch::{ScratchDir, ScratchFile};
pub use transport::{BodyStream, HttpTransport, ReqwestTransport, TransportResponse};

use crate::error::DownloadError;
use crate::registry::{ArtifactDescriptor, PlatformTarget};
use futures_lite::StreamExt;
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Maximum redirect hops followed for one download
pub const MAX_REDIRECTS: usize = 5;

/// Returns `true` if the HTTP status code is a redirect we follow
pub fn is_redirect(status: u16) -> bool {
    matches!(status, 301 | 302 | 303 | 307 | 308)
}

/// Streams artifacts into a [`ScratchDir`]
pub struct Downloader<T: HttpTransport> {
    transport: T,
    scratch: ScratchDir,
}

impl<T: HttpTransport> Downloader<T> {
    /// Create a downloader writing into `scratch`
    pub fn new(transport: T, scratch: ScratchDir) -> Self {
        Self { transport, scratch }
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Scratch directory downloads land in
    pub fn scratch(&self) -> &ScratchDir {
        &self.scratch
    }

    /// Download one platform target of an artifact
    pub async fn download(
        &self,
        descriptor: &ArtifactDescriptor,
        version: &str,
        target: &PlatformTarget,
    ) -> Result<ScratchFile, DownloadError> {
        let url = descriptor.build_url(version, target);
        let filename = descriptor.build_filename(version, target);
        self.fetch_to(&url, &filename).await
    }

    /// Download `url` into the scratch directory as `filename`
    pub async fn fetch_to(&self, url: &str, filename: &str) -> Result<ScratchFile, DownloadError> {
        self.scratch
            .ensure()
            .await
            .map_err(|source| DownloadError::Io {
                path: self.scratch.path().to_path_buf(),
                source,
            })?;

        let dest = self.scratch.path().join(filename);
        log::info!("Downloading {url} -> {}", dest.display());

        let response = self.follow_redirects(url).await?;

        match write_body(url, response.body, &dest).await {
            Ok(size) => {
                log::debug!("Wrote {size} bytes to {}", dest.display());
                Ok(ScratchFile {
                    path: dest,
                    filename: filename.to_string(),
                    size,
                })
            }
            Err(e) => {
                remove_partial(&dest).await;
                Err(e)
            }
        }
    }

    async fn follow_redirects(&self, url: &str) -> Result<TransportResponse, DownloadError> {
        let mut current = url.to_string();
        let mut hops = 0usize;

        loop {
            let response = self
                .transport
                .get(&current)
                .await
                .map_err(|e| DownloadError::Transport {
                    url: current.clone(),
                    reason: e.to_string(),
                })?;

            if is_redirect(response.status) {
                if hops >= MAX_REDIRECTS {
                    return Err(DownloadError::TooManyRedirects {
                        url: url.to_string(),
                        limit: MAX_REDIRECTS,
                    });
                }
                let location = response.location.as_deref().ok_or_else(|| {
                    DownloadError::RedirectMissingLocation {
                        url: current.clone(),
                    }
                })?;
                let next = resolve_location(&current, location)?;
                hops += 1;
                log::debug!("Redirect {hops}/{MAX_REDIRECTS}: {current} -> {next}");
                current = next;
                continue;
            }

            if !(200..300).contains(&response.status) {
                return Err(DownloadError::DownloadFailed {
                    url: current,
                    status: response.status,
                });
            }

            return Ok(response);
        }
    }
}

/// Resolve a Location header (absolute or relative) against the request URL
fn resolve_location(current: &str, location: &str) -> Result<String, DownloadError> {
    let invalid = || DownloadError::InvalidRedirect {
        url: current.to_string(),
        location: location.to_string(),
    };
    let base = url::Url::parse(current).map_err(|_| invalid())?;
    base.join(location).map(String::from).map_err(|_| invalid())
}

async fn write_body(url: &str, mut body: BodyStream, dest: &Path) -> Result<u64, DownloadError> {
    let io_err = |source| DownloadError::Io {
        path: dest.to_path_buf(),
        source,
    };

    let mut file = tokio::fs::File::create(dest).await.map_err(io_err)?;
    let mut written = 0u64;

    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| DownloadError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        file.write_all(&chunk).await.map_err(io_err)?;
        written += chunk.len() as u64;
    }

    file.flush().await.map_err(io_err)?;
    Ok(written)
}

async fn remove_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => log::debug!("Removed partial download {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("Failed to remove partial download {}: {e}", path.display()),
    }
}
