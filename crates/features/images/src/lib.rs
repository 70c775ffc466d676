//! Images feature slice: fetch remote images under resource limits, persist them by URL path,
//! and read them back.
//!
//! ```text
//! fetch_and_store(url)
//!   -> SourceUrl::parse        (InvalidUrl / UnsupportedScheme / NoFilePath)
//!   -> ConcurrencyGate::acquire (Cancelled)
//!   -> Fetcher::download        (DownloadFailed / UnexpectedStatus / NotAnImage / FileTooLarge)
//!   -> Storage::save            (Storage)
//!   -> public URL
//! ```
//!
//! HTTP handlers live behind the `server` feature.

mod error;
mod fetcher;
mod gate;
mod pipeline;
#[cfg(feature = "server")]
pub mod server;
mod source;

pub use crate::error::{ErrorClass, ImagesError, ImagesErrorExt};
pub use crate::fetcher::{FetchResult, Fetcher};
pub use crate::gate::{ConcurrencyGate, GatePermit};
pub use crate::pipeline::UploadPipeline;
pub use crate::source::SourceUrl;
pub use tokio_util::sync::CancellationToken;

use imghub_kernel::domain::config::AppConfig;
use imghub_storage::Storage;
use std::ops::Deref;
use std::sync::Arc;

#[derive(Debug)]
pub struct ImagesInner {
    storage: Storage,
    pipeline: UploadPipeline,
}

/// Images feature state. Cheap to clone; clones share the gate, the client and the store.
#[derive(Debug, Clone)]
pub struct Images {
    inner: Arc<ImagesInner>,
}

impl Deref for Images {
    type Target = ImagesInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Images {
    #[must_use]
    pub fn new(storage: Storage, pipeline: UploadPipeline) -> Self {
        Self { inner: Arc::new(ImagesInner { storage, pipeline }) }
    }

    /// See [`UploadPipeline::fetch_and_store`].
    ///
    /// # Errors
    /// Propagates every pipeline error.
    pub async fn fetch_and_store(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<String, ImagesError> {
        self.pipeline.fetch_and_store(url, cancel).await
    }

    /// Reads the image stored at `path`.
    ///
    /// # Errors
    /// Returns [`ImagesError::Storage`] wrapping `NotFound`, `PathTraversal`, `InvalidPath` or `Io`.
    pub async fn get_image(&self, path: &str) -> Result<Vec<u8>, ImagesError> {
        Ok(self.storage.get(path).await?)
    }

    /// Never fails; anything short of a stored regular file is `false`.
    pub async fn image_exists(&self, path: &str) -> bool {
        self.storage.exists(path).await
    }

    /// Public URLs of every stored image.
    ///
    /// # Errors
    /// Returns [`ImagesError::Storage`] if the tree cannot be walked.
    pub async fn list_images(&self) -> Result<Vec<String>, ImagesError> {
        let paths = self.storage.list().await.context("Failed to list images")?;
        Ok(paths.iter().map(|p| self.pipeline.public_url(p)).collect())
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    #[must_use]
    pub fn pipeline(&self) -> &UploadPipeline {
        &self.pipeline
    }

    #[must_use]
    pub fn public_url(&self) -> &str {
        self.pipeline.public_base()
    }
}

/// Initialize the images feature from the application config and an opened store.
///
/// # Errors
/// Returns [`ImagesError::Config`] for unusable fetch limits.
pub fn init(config: &AppConfig, storage: Storage) -> Result<Images, ImagesError> {
    let fetch = &config.fetch;

    let fetcher = Fetcher::new(fetch.timeout(), fetch.max_file_size)?;
    let gate = ConcurrencyGate::new(fetch.max_concurrent)?;
    let pipeline =
        UploadPipeline::new(fetcher, gate, storage.clone(), config.server.public_base());

    tracing::info!(
        max_concurrent = fetch.max_concurrent,
        max_file_size = fetch.max_file_size,
        timeout_secs = fetch.timeout_secs,
        public_url = pipeline.public_base(),
        "Images slice initialized"
    );

    Ok(Images::new(storage, pipeline))
}
