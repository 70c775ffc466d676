use imghub_storage::StorageError;
use std::borrow::Cow;

/// Errors of the images feature: URL validation, download, persistence.
#[imghub_derive::imghub_error]
pub enum ImagesError {
    /// Not a syntactically valid absolute URL.
    #[error("Invalid url{}: {message}", format_context(.context))]
    InvalidUrl { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Unsupported scheme{}: {message}", format_context(.context))]
    UnsupportedScheme { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The URL path is empty or `/`, so there is nothing to store it under.
    #[error("Url has no file path{}: {message}", format_context(.context))]
    NoFilePath { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The upstream `Content-Type` is not `image/*`.
    #[error("Not an image{}: content-type {message:?}", format_context(.context))]
    NotAnImage { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("File too large{}: exceeds {limit} bytes", format_context(.context))]
    FileTooLarge { limit: u64, context: Option<Cow<'static, str>> },

    #[error("Download failed{}: {source}", format_context(.context))]
    DownloadFailed { source: reqwest::Error, context: Option<Cow<'static, str>> },

    #[error("Unexpected status{}: {status}", format_context(.context))]
    UnexpectedStatus { status: u16, context: Option<Cow<'static, str>> },

    /// The caller gave up while the request waited for a permit or was in flight.
    #[error("Request cancelled{}: {message}", format_context(.context))]
    Cancelled { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid images configuration{}: {message}", format_context(.context))]
    Config { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Storage failure{}: {source}", format_context(.context))]
    Storage { source: StorageError, context: Option<Cow<'static, str>> },

    #[error("Internal images error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Coarse outcome classes used to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The client sent something unusable (400).
    InvalidInput,
    /// The remote file is over the size limit (413).
    PayloadTooLarge,
    /// The remote server failed or misbehaved (502).
    Upstream,
    /// Nothing is stored under the requested path (404).
    NotFound,
    /// Anything else (500).
    Internal,
}

impl ImagesError {
    /// Classifies the error for status mapping.
    ///
    /// Storage errors are classified by what they say about a read request: a missing object is
    /// `NotFound` and a rejected path is `InvalidInput`. The upload route overrides this and
    /// reports every storage failure as internal.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidUrl { .. }
            | Self::UnsupportedScheme { .. }
            | Self::NoFilePath { .. }
            | Self::NotAnImage { .. } => ErrorClass::InvalidInput,
            Self::FileTooLarge { .. } => ErrorClass::PayloadTooLarge,
            Self::DownloadFailed { .. } | Self::UnexpectedStatus { .. } => ErrorClass::Upstream,
            Self::Storage { source: StorageError::NotFound { .. }, .. } => ErrorClass::NotFound,
            Self::Storage {
                source: StorageError::PathTraversal { .. } | StorageError::InvalidPath { .. },
                ..
            } => ErrorClass::InvalidInput,
            Self::Cancelled { .. }
            | Self::Config { .. }
            | Self::Storage { .. }
            | Self::Internal { .. } => ErrorClass::Internal,
        }
    }
}
