//! HTTP surface of the images slice.
//!
//! * [`router`]: documented JSON routes (`POST /images`, `GET /images`).
//! * [`content_router`]: `GET /exists/{*path}` and the catch-all that serves stored bytes.
//!   Kept out of the `OpenAPI` router because the catch-all owns the fallback.

mod error;
mod handlers;
mod models;

pub use models::{ErrorResponse, ExistsResponse, ImageEntry, ImageList, UploadRequest, UploadResponse};

use crate::Images;
use axum::Router;
use axum::extract::FromRef;
use axum::routing::get;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub fn router<S>() -> OpenApiRouter<S>
where
    S: Send + Sync + Clone + 'static,
    Images: FromRef<S>,
{
    OpenApiRouter::<S>::new().routes(routes!(handlers::upload_handler, handlers::list_handler))
}

pub fn content_router<S>() -> Router<S>
where
    S: Send + Sync + Clone + 'static,
    Images: FromRef<S>,
{
    Router::<S>::new()
        .route("/exists/{*path}", get(handlers::exists_handler))
        .fallback(handlers::serve_handler)
}
