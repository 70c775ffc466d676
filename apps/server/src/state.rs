use axum::extract::FromRef;
use imghub_domain::config::AppConfig;
use imghub_images::Images;

/// Shared state handed to every route. Each feature router extracts only its own part.
#[derive(Debug, Clone)]
pub struct ApiState {
    pub config: AppConfig,
    pub images: Images,
}

impl FromRef<ApiState> for Images {
    fn from_ref(state: &ApiState) -> Self {
        state.images.clone()
    }
}

impl FromRef<ApiState> for AppConfig {
    fn from_ref(state: &ApiState) -> Self {
        state.config.clone()
    }
}
