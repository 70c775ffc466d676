//! Bounded HTTP downloads.

use crate::error::{ImagesError, ImagesErrorExt};
use crate::source::SourceUrl;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const USER_AGENT: &str = concat!("imghub/", env!("CARGO_PKG_VERSION"));

/// A downloaded image, held only until it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub bytes: Vec<u8>,
    /// `Content-Type` as declared by the remote server.
    pub content_type: String,
}

impl FetchResult {
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }
}

/// Performs validated GET requests with a size cap and a timeout.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    max_file_size: u64,
}

impl Fetcher {
    /// `timeout` bounds the whole request, body included.
    ///
    /// # Errors
    /// Returns [`ImagesError::Config`] if the limits are zero or the HTTP client cannot be built.
    pub fn new(timeout: Duration, max_file_size: u64) -> Result<Self, ImagesError> {
        if max_file_size == 0 || timeout.is_zero() {
            return Err(ImagesError::Config {
                message: "fetch limits must be greater than zero".into(),
                context: None,
            });
        }

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ImagesError::Config {
                message: e.to_string().into(),
                context: Some("Failed to build HTTP client".into()),
            })?;

        Ok(Self { client, max_file_size })
    }

    #[must_use]
    pub const fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Downloads `url`, racing the request against `cancel`.
    ///
    /// Dropping the in-flight request on cancellation closes its connection.
    ///
    /// # Errors
    /// * [`ImagesError::Cancelled`] when `cancel` fires first.
    /// * [`ImagesError::DownloadFailed`] for transport failures, timeouts included.
    /// * [`ImagesError::UnexpectedStatus`] for any status other than `200 OK`.
    /// * [`ImagesError::NotAnImage`] when `Content-Type` does not start with `image/`.
    /// * [`ImagesError::FileTooLarge`] as soon as the body is known to exceed the limit.
    pub async fn download(
        &self,
        url: &SourceUrl,
        cancel: &CancellationToken,
    ) -> Result<FetchResult, ImagesError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(ImagesError::Cancelled {
                message: "download aborted".into(),
                context: Some(url.to_string().into()),
            }),
            result = self.fetch(url) => result,
        }
    }

    async fn fetch(&self, url: &SourceUrl) -> Result<FetchResult, ImagesError> {
        debug!(%url, "Requesting remote image");

        let mut response = self
            .client
            .get(url.as_url().clone())
            .send()
            .await
            .context(format!("GET {url}"))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ImagesError::UnexpectedStatus {
                status: status.as_u16(),
                context: Some(url.to_string().into()),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        if !is_image_type(&content_type) {
            return Err(ImagesError::NotAnImage { message: content_type.into(), context: None });
        }

        if response.content_length().is_some_and(|len| len > self.max_file_size) {
            return Err(self.too_large());
        }

        let reserve = response.content_length().unwrap_or(0).min(self.max_file_size);
        let mut bytes = Vec::with_capacity(usize::try_from(reserve).unwrap_or(0));

        while let Some(chunk) = response.chunk().await.context("Failed to read response body")? {
            let total = u64::try_from(bytes.len() + chunk.len()).unwrap_or(u64::MAX);
            if total > self.max_file_size {
                return Err(self.too_large());
            }
            bytes.extend_from_slice(&chunk);
        }

        debug!(%url, size = bytes.len(), content_type = %content_type, "Remote image downloaded");
        Ok(FetchResult { bytes, content_type })
    }

    const fn too_large(&self) -> ImagesError {
        ImagesError::FileTooLarge { limit: self.max_file_size, context: None }
    }
}

fn is_image_type(content_type: &str) -> bool {
    content_type.as_bytes().get(..6).is_some_and(|prefix| prefix.eq_ignore_ascii_case(b"image/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_type_prefix_is_case_insensitive() {
        assert!(is_image_type("image/png"));
        assert!(is_image_type("IMAGE/JPEG; charset=binary"));
        assert!(!is_image_type("text/html"));
        assert!(!is_image_type("image"));
        assert!(!is_image_type(""));
        assert!(!is_image_type("application/image/png"));
    }

    #[test]
    fn test_zero_limits_are_rejected() {
        assert!(Fetcher::new(Duration::ZERO, 10).is_err());
        assert!(Fetcher::new(Duration::from_secs(1), 0).is_err());
        assert!(Fetcher::new(Duration::from_secs(1), 10).is_ok());
    }
}
