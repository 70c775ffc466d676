use super::error::error_response;
use super::models::{ErrorResponse, ExistsResponse, ImageEntry, ImageList, UploadRequest, UploadResponse};
use crate::Images;
use crate::error::{ErrorClass, ImagesError};
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use image::ImageFormat;
use imghub_derive::api_handler;
use imghub_domain::constants::IMAGES_TAG;
use imghub_storage::StorageError;
use tokio_util::sync::CancellationToken;

const EXISTS_PREFIX: &str = "/exists";
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[api_handler(
    post,
    path = "/images",
    request_body = UploadRequest,
    responses(
        (status = OK, description = "Image fetched and stored", body = UploadResponse),
        (status = BAD_REQUEST, description = "Malformed body, URL or non-image content", body = ErrorResponse),
        (status = PAYLOAD_TOO_LARGE, description = "Remote file exceeds the size limit", body = ErrorResponse),
        (status = BAD_GATEWAY, description = "Remote server failed", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Storage or internal failure", body = ErrorResponse),
    ),
    tag = IMAGES_TAG,
)]
pub(super) async fn upload_handler(
    State(images): State<Images>,
    payload: Result<Json<UploadRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(request)) = payload else {
        return error_response(StatusCode::BAD_REQUEST, "invalid request body");
    };

    // Dropping the request future (client gone, shutdown) cancels the download.
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    match images.fetch_and_store(&request.url, &cancel).await {
        Ok(url) => Json(UploadResponse { url }).into_response(),
        Err(err) => {
            let status = upload_class(&err).status();
            if status.is_server_error() {
                tracing::error!(url = %request.url, error = %err, "Upload failed");
            } else {
                tracing::info!(url = %request.url, error = %err, "Upload rejected");
            }
            error_response(status, &err.to_string())
        },
    }
}

/// Storage failures during an upload are the server's fault, whatever their kind.
const fn upload_class(err: &ImagesError) -> ErrorClass {
    match err {
        ImagesError::Storage { .. } => ErrorClass::Internal,
        other => other.class(),
    }
}

#[api_handler(
    get,
    path = "/images",
    responses(
        (status = OK, description = "Public URLs of all stored images", body = ImageList),
        (status = INTERNAL_SERVER_ERROR, description = "Storage failure", body = ErrorResponse),
    ),
    tag = IMAGES_TAG,
)]
pub(super) async fn list_handler(State(images): State<Images>) -> Result<Json<ImageList>, ImagesError> {
    let images = images.list_images().await?.into_iter().map(|url| ImageEntry { url }).collect();
    Ok(Json(ImageList { images }))
}

/// Looks up the raw (still percent-encoded) path, the same form uploads are stored under.
pub(super) async fn exists_handler(State(images): State<Images>, uri: Uri) -> Json<ExistsResponse> {
    let path = uri.path().strip_prefix(EXISTS_PREFIX).unwrap_or_default();
    Json(ExistsResponse { exists: images.image_exists(path).await })
}

pub(super) async fn serve_handler(State(images): State<Images>, method: Method, uri: Uri) -> Response {
    if method != Method::GET {
        return error_response(StatusCode::METHOD_NOT_ALLOWED, "method not allowed");
    }

    match images.get_image(uri.path()).await {
        Ok(bytes) => {
            let content_type = image::guess_format(&bytes)
                .map_or(FALLBACK_CONTENT_TYPE, |format| ImageFormat::to_mime_type(&format));
            ([(header::CONTENT_TYPE, content_type)], bytes).into_response()
        },
        Err(ImagesError::Storage { source: StorageError::NotFound { .. }, .. }) => {
            error_response(StatusCode::NOT_FOUND, "image not found")
        },
        Err(err) => err.into_response(),
    }
}
