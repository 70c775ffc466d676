//! Core storage engine: the [`Storage`] handle and its four operations.
//!
//! Every operation goes through a single reader/writer lock. Reads (`get`, `exists`, `list`)
//! share it, `save` holds it exclusively. Combined with the temp-file-then-rename write, a
//! reader observes either the previous complete object or the new one, never a partial file.

use crate::builder::StorageBuilder;
use crate::error::{StorageError, StorageErrorExt};
use crate::maintenance;
use crate::security::{self, TMP_SUFFIX};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// The internal shared state of a [`Storage`] instance.
#[derive(Debug)]
pub struct StorageInner {
    /// The canonicalized physical path on the disk where all images live.
    pub(crate) root: PathBuf,
    /// Counter used to keep temporary file names unique within the process.
    pub(crate) tmp_counter: AtomicU64,
    /// Coarse lock over the whole tree.
    pub(crate) lock: RwLock<()>,
}

/// A thread-safe handle to the image store.
///
/// Objects are addressed by logical paths such as `/cats/cat.jpg`, which mirror the file tree
/// under the storage root. The handle is reference-counted and cheap to clone; all clones
/// share the same lock.
///
/// # Example
///
/// ```rust
/// use imghub_storage::{Storage, StorageError};
///
/// #[tokio::main]
/// async fn main() -> Result<(), StorageError> {
///     # let tmp = tempfile::tempdir().unwrap();
///     # let root = tmp.path().join("data");
///     let storage = Storage::builder().root(&root).create(true).connect().await?;
///
///     storage.save("/cats/cat.jpg", b"jpeg bytes").await?;
///     assert!(storage.exists("/cats/cat.jpg").await);
///     assert_eq!(storage.get("/cats/cat.jpg").await?, b"jpeg bytes");
///     assert_eq!(storage.list().await?, vec!["/cats/cat.jpg".to_owned()]);
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Storage {
    pub(crate) inner: Arc<StorageInner>,
}

impl Deref for Storage {
    type Target = StorageInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Storage {
    #[must_use = "The storage engine is not initialized until you call .connect()"]
    pub fn builder() -> StorageBuilder {
        StorageBuilder::new()
    }

    /// The canonical storage root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a logical path to its physical location within the storage root.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::PathTraversal`] if the path escapes the root, however the
    /// attempt is spelled (`..` segments, backslashes, symlinks).
    /// Returns [`StorageError::InvalidPath`] if the path names the root itself or carries the
    /// reserved temporary suffix.
    /// Returns [`StorageError::Io`] if an existing ancestor cannot be verified.
    pub fn resolve(&self, path: impl AsRef<str>) -> Result<PathBuf, StorageError> {
        security::resolve_path(&self.root, path.as_ref())
    }

    /// Stores `data` at `path`, replacing any previous object.
    ///
    /// 1. Missing parent directories are created.
    /// 2. Data goes to a temporary file next to the target, named uniquely per process and
    ///    call, and is `fsync`ed.
    /// 3. The temporary file is renamed over the target and the directory is synced.
    ///
    /// A crash at any point leaves at most a stray temporary file, which the next
    /// [`connect`](StorageBuilder::connect) purges once it is stale.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::PathTraversal`] or [`StorageError::InvalidPath`] for rejected paths.
    /// Returns [`StorageError::Io`] if the disk write or the rename fails; the temporary file is
    /// removed in that case.
    pub async fn save(&self, path: impl AsRef<str>, data: &[u8]) -> Result<(), StorageError> {
        let path = path.as_ref();
        let _guard = self.lock.write().await;

        let resolved = self.resolve(path)?;

        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent)
                .await
                .context(format!("Failed to create directories for {}", resolved.display()))?;
        }

        let temp = unique_tmp_path(&resolved, &self.tmp_counter);

        // A name clash leaves the existing file alone; it belongs to another writer.
        let file = fs::OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&temp)
            .await
            .context(format!("Temp creation failed: {}", temp.display()))?;

        if let Err(err) = write_synced(file, data).await {
            discard(&temp).await;
            return Err(err);
        }

        if let Err(err) = promote(&temp, &resolved).await {
            discard(&temp).await;
            return Err(err);
        }

        if let Some(parent) = resolved.parent() {
            sync_dir(parent).await;
        }

        debug!(path, size = data.len(), "Image saved atomically");
        Ok(())
    }

    /// Reads the full content stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if nothing is stored there.
    /// Returns [`StorageError::PathTraversal`] or [`StorageError::InvalidPath`] for rejected paths.
    /// Returns [`StorageError::Io`] for any other read failure (including directories).
    pub async fn get(&self, path: impl AsRef<str>) -> Result<Vec<u8>, StorageError> {
        let path = path.as_ref();
        let _guard = self.lock.read().await;

        let resolved = self.resolve(path)?;

        match fs::read(&resolved).await {
            Ok(data) => Ok(data),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound { message: path.to_owned().into(), context: None })
            },
            Err(err) => Err(StorageError::Io {
                source: err,
                context: Some(format!("Read failed: {}", resolved.display()).into()),
            }),
        }
    }

    /// Returns `true` iff a regular file is stored at `path`.
    ///
    /// Never fails: rejected paths and stat errors both read as `false`.
    pub async fn exists(&self, path: impl AsRef<str>) -> bool {
        let _guard = self.lock.read().await;

        let Ok(resolved) = self.resolve(path) else {
            return false;
        };

        fs::metadata(&resolved).await.is_ok_and(|meta| meta.is_file())
    }

    /// Lists the logical path of every stored object, in walk order (sorted by file name).
    ///
    /// Directories, symlinks and in-flight temporary files are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if part of the tree cannot be read.
    pub async fn list(&self) -> Result<Vec<String>, StorageError> {
        let _guard = self.lock.read().await;

        let root = self.root.clone();
        tokio::task::spawn_blocking(move || walk_objects(&root))
            .await
            .map_err(|e| StorageError::Io {
                source: std::io::Error::other(e),
                context: Some("Listing task failed".into()),
            })?
    }

    /// Removes stale temporary files left behind by interrupted writes.
    pub async fn purge_tmp(&self) {
        let _guard = self.lock.write().await;
        maintenance::purge_tmp(&self.root).await;
    }
}

fn walk_objects(root: &Path) -> Result<Vec<String>, StorageError> {
    let mut objects = Vec::new();

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| StorageError::Io {
            source: e.into(),
            context: Some("Failed to walk storage tree".into()),
        })?;

        if !entry.file_type().is_file() || maintenance::is_tmp_name(entry.file_name()) {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(root) else { continue };
        match security::logical_path(relative) {
            Some(logical) => objects.push(logical),
            None => warn!(path = %entry.path().display(), "Skipping file with non UTF-8 name"),
        }
    }

    Ok(objects)
}

async fn write_synced(mut file: fs::File, data: &[u8]) -> Result<(), StorageError> {
    file.write_all(data).await.context("Write failed")?;
    file.sync_all().await.context("Hardware sync failed")?;
    Ok(())
}

/// Renames `temp` over `target`. The target is never removed first, so a failed rename leaves
/// the previous object intact.
async fn promote(temp: &Path, target: &Path) -> Result<(), StorageError> {
    fs::rename(temp, target)
        .await
        .context(format!("Atomic swap failed: {} -> {}", temp.display(), target.display()))
}

async fn discard(temp: &Path) {
    if let Err(err) = fs::remove_file(temp).await {
        if err.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %temp.display(), error = %err, "Failed to remove temporary file");
        }
    }
}

async fn sync_dir(path: &Path) {
    match fs::File::open(path).await {
        Ok(dir) => {
            if let Err(err) = dir.sync_all().await {
                warn!(path = %path.display(), error = %err, "Directory sync failed");
            }
        },
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Directory open failed");
        },
    }
}

/// `<name>.<pid>-<nanos>-<counter>.imghub-tmp`: unique within the process through the counter
/// and across processes and restarts through the pid and the clock.
fn unique_tmp_path(target: &Path, counter: &AtomicU64) -> PathBuf {
    let counter = counter.fetch_add(1, Ordering::Relaxed);
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| d.subsec_nanos());
    let pid = std::process::id();
    let file_name = target.file_name().and_then(|s| s.to_str()).unwrap_or("image");
    target.with_file_name(format!("{file_name}.{pid}-{nanos:09}-{counter}{TMP_SUFFIX}"))
}
