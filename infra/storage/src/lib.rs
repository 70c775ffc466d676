//! A sandboxed, path-keyed image store.
//!
//! Objects are addressed by logical paths (`/cats/cat.jpg`) that mirror a directory tree under
//! a single root. All examples use temporary directories to avoid writing to the real filesystem.
//!
//! # Core Features
//!
//! - **Sandbox Security**: Logical paths are normalized and then checked against the canonical
//!   root, so `..` segments, backslashes and symlinks cannot reach outside it.
//! - **Atomic Writes**: Unique temp file + `fsync` + `rename`. Readers see the old object or
//!   the new one, never a torn write.
//! - **Self-Healing**: Stale temporary files from crashed writers are purged on connect.
//!
//! # Examples
//!
//! ```rust
//! use imghub_storage::{Storage, StorageError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), StorageError> {
//!     # let tmp = tempfile::tempdir().unwrap();
//!     # let root = tmp.path().join("data");
//!     let storage = Storage::builder().root(&root).connect().await?;
//!
//!     storage.save("/photos/2024/beach.png", b"png bytes").await?;
//!
//!     // Escapes are refused before any I/O happens.
//!     let denied = storage.get("/../../etc/passwd").await;
//!     assert!(matches!(denied, Err(StorageError::PathTraversal { .. })));
//!
//!     Ok(())
//! }
//! ```

mod builder;
mod engine;
mod error;
mod maintenance;
mod security;

pub use builder::StorageBuilder;
pub use engine::{Storage, StorageInner};
pub use error::{StorageError, StorageErrorExt};
