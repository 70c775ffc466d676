use crate::state::ApiState;
use axum::Router;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

/// Path of the interactive API reference.
pub const DOCS_PATH: &str = "/docs";

#[derive(OpenApi)]
#[openapi(info(title = "imghub", description = "Fetch remote images, store them by path, serve them back"))]
struct ApiDoc;

pub fn init(state: ApiState) -> Router {
    let (api_routes, api_doc) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(imghub_kernel::server::system_router())
        .merge(imghub_images::server::router())
        .split_for_parts();

    // Content routes own the fallback, so they stay outside the documented router.
    Router::new()
        .merge(api_routes)
        .merge(imghub_images::server::content_router())
        .merge(Scalar::with_url(DOCS_PATH, api_doc))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
