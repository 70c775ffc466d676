use crate::error::{ImagesError, ImagesErrorExt};
use crate::fetcher::Fetcher;
use crate::gate::ConcurrencyGate;
use crate::source::SourceUrl;
use imghub_storage::Storage;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// "Fetch from URL, persist, return the public URL."
///
/// Validation happens before admission, so malformed URLs never take a download slot. The slot
/// is held for the download only; the write to storage runs after it has been released.
#[derive(Debug, Clone)]
pub struct UploadPipeline {
    fetcher: Fetcher,
    gate: ConcurrencyGate,
    storage: Storage,
    public_base: String,
}

impl UploadPipeline {
    /// `public_base` is prepended to logical paths; trailing slashes are stripped.
    pub fn new(
        fetcher: Fetcher,
        gate: ConcurrencyGate,
        storage: Storage,
        public_base: impl Into<String>,
    ) -> Self {
        let public_base = public_base.into().trim_end_matches('/').to_owned();
        Self { fetcher, gate, storage, public_base }
    }

    /// Downloads `raw_url` and stores it under the URL's path.
    ///
    /// No retries. Nothing is written unless the download fully succeeded.
    ///
    /// # Errors
    /// * URL validation errors from [`SourceUrl::parse`], before any slot is taken.
    /// * [`ImagesError::Cancelled`] if `cancel` fires while queued or downloading.
    /// * Download errors from [`Fetcher::download`].
    /// * [`ImagesError::Storage`] if the write fails.
    pub async fn fetch_and_store(
        &self,
        raw_url: &str,
        cancel: &CancellationToken,
    ) -> Result<String, ImagesError> {
        let source = SourceUrl::parse(raw_url)?;
        debug!(url = %source, "Upload accepted, waiting for a download slot");

        let fetched = {
            let _permit = self.gate.acquire(cancel).await?;
            debug!(url = %source, in_flight = self.gate.in_flight(), "Download slot acquired");
            self.fetcher.download(&source, cancel).await?
        };

        let path = source.logical_path();
        self.storage
            .save(path, &fetched.bytes)
            .await
            .context(format!("Failed to store {path}"))?;

        info!(path, size = fetched.len(), content_type = %fetched.content_type, "Image saved");
        Ok(self.public_url(path))
    }

    /// Joins the public base with a `/`-prefixed logical path.
    #[must_use]
    pub fn public_url(&self, logical_path: &str) -> String {
        format!("{}{logical_path}", self.public_base)
    }

    #[must_use]
    pub fn public_base(&self) -> &str {
        &self.public_base
    }

    #[must_use]
    pub const fn gate(&self) -> &ConcurrencyGate {
        &self.gate
    }

    #[must_use]
    pub const fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }
}
