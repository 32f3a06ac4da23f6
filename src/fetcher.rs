use async_trait::async_trait;
use image::DynamicImage;
use thiserror::Error;

use crate::{model::Notification, notify::Notifier};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure, including URLs the client cannot parse
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: BoxError,
    },
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("{url} is not a decodable image: {source}")]
    Decode {
        url: String,
        #[source]
        source: image::ImageError,
    },
}

/// Retrieves the raw bytes behind a URL.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// [`ImageFetcher`] backed by a shared `reqwest` client
#[derive(Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let request_error = |e: reqwest::Error| FetchError::Request {
            url: url.to_string(),
            source: Box::new(e),
        };

        let resp = self.client.get(url).send().await.map_err(request_error)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = resp.bytes().await.map_err(request_error)?;
        Ok(body.to_vec())
    }
}

/// Fetches `url` and decodes it into an image.
///
/// The URL is passed through untouched; malformed input fails inside the
/// transport. Emits exactly one `DownloadSucceeded` or `DownloadFailed`.
pub async fn fetch(
    fetcher: &dyn ImageFetcher,
    url: &str,
    notifier: &Notifier,
) -> Result<DynamicImage, FetchError> {
    match fetch_and_decode(fetcher, url).await {
        Ok(img) => {
            log::info!("Downloaded {} ({}x{})", url, img.width(), img.height());
            notifier.notify(Notification::DownloadSucceeded);
            Ok(img)
        }
        Err(e) => {
            log::error!("Download failed: {e}");
            notifier.notify(Notification::DownloadFailed);
            Err(e)
        }
    }
}

async fn fetch_and_decode(fetcher: &dyn ImageFetcher, url: &str) -> Result<DynamicImage, FetchError> {
    let bytes = fetcher.fetch_bytes(url).await?;
    image::load_from_memory(&bytes).map_err(|source| FetchError::Decode {
        url: url.to_string(),
        source,
    })
}
