use std::borrow::Cow;

/// A specialized [`StorageError`] enum of this crate.
#[imghub_derive::imghub_error]
pub enum StorageError {
    /// No regular file exists at the resolved location.
    #[error("Image not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The logical path would land outside the storage root.
    #[error("Path traversal denied{}: {message}", format_context(.context))]
    PathTraversal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The logical path is well-formed but cannot name a stored object.
    #[error("Invalid image path{}: {message}", format_context(.context))]
    InvalidPath { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Storage I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },
}
