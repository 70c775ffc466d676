use imghub_derive::api_model;

#[api_model(deny_unknown_fields = false)]
/// Upload request
pub struct UploadRequest {
    /// Absolute `http` or `https` URL of the image
    pub url: String,
}

#[api_model]
/// Upload result
pub struct UploadResponse {
    /// Public URL the image is served from
    pub url: String,
}

#[api_model]
/// A stored image
pub struct ImageEntry {
    /// Public URL
    pub url: String,
}

#[api_model]
/// All stored images
pub struct ImageList {
    pub images: Vec<ImageEntry>,
}

#[api_model]
/// Existence check result
pub struct ExistsResponse {
    pub exists: bool,
}

#[api_model]
/// Error body returned by every failing route
pub struct ErrorResponse {
    /// Human readable message
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}
