//! HTTP transport seam for downloads.

use bytes::Bytes;
use futures_lite::StreamExt;
use futures_lite::stream::Boxed;
use std::future::Future;
use std::time::Duration;

/// Response body as a stream of chunks
pub type BodyStream = Boxed<std::io::Result<Bytes>>;

/// One HTTP response, redirects not followed
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// `Location` header, if any
    pub location: Option<String>,
    /// Streaming body
    pub body: BodyStream,
}

/// Minimal GET-only HTTP client.
///
/// Implementations must NOT follow redirects; the downloader does that itself
/// so it can enforce its hop limit.
pub trait HttpTransport: Send + Sync {
    /// Issue a single GET request
    fn get(&self, url: &str) -> impl Future<Output = std::io::Result<TransportResponse>> + Send;
}

/// Production transport using reqwest with redirects disabled
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with an optional per-request timeout
    pub fn new(timeout: Option<Duration>) -> reqwest::Result<Self> {
        let mut builder = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> std::io::Result<TransportResponse> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(std::io::Error::other)?;

        let status = response.status().as_u16();
        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(std::io::Error::other))
            .boxed();

        Ok(TransportResponse {
            status,
            location,
            body,
        })
    }
}
