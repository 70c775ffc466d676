use crate::error::ImagesError;
use std::fmt;
use url::Url;

/// A remote image location that passed shape validation.
///
/// Holding a `SourceUrl` means the URL is absolute, uses `http` or `https`, and has a file path.
/// That path, in the percent-encoded form `url` serializes, is the logical path the image is
/// stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUrl {
    url: Url,
}

impl SourceUrl {
    /// Validates `raw` in order: syntax, scheme, path.
    ///
    /// # Errors
    /// * [`ImagesError::InvalidUrl`] for anything that is not an absolute URL.
    /// * [`ImagesError::UnsupportedScheme`] for schemes other than `http` and `https`.
    /// * [`ImagesError::NoFilePath`] when the path is empty or `/`.
    pub fn parse(raw: &str) -> Result<Self, ImagesError> {
        let url = Url::parse(raw).map_err(|e| ImagesError::InvalidUrl {
            message: e.to_string().into(),
            context: Some(raw.to_owned().into()),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ImagesError::UnsupportedScheme {
                message: url.scheme().to_owned().into(),
                context: None,
            });
        }

        if matches!(url.path(), "" | "/") {
            return Err(ImagesError::NoFilePath { message: url.to_string().into(), context: None });
        }

        Ok(Self { url })
    }

    #[must_use]
    pub const fn as_url(&self) -> &Url {
        &self.url
    }

    /// The logical storage path, always starting with `/`.
    #[must_use]
    pub fn logical_path(&self) -> &str {
        self.url.path()
    }
}

impl fmt::Display for SourceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.url.fmt(f)
    }
}
