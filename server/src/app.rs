use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use drive_relay_auth::{auth_routes, require_session, AuthState};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::drive::DriveClient;

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthState,
    pub drive: Arc<DriveClient>,
}

impl AppState {
    pub fn new(auth: AuthState, drive: DriveClient) -> Self {
        Self {
            auth,
            drive: Arc::new(drive),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    // Resource creation requires a session; a refreshed session cookie is
    // attached to the response by the middleware.
    let protected = Router::new()
        .route("/create_doc", post(api::create_doc))
        .route("/create_sheet", post(api::create_sheet))
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            require_session,
        ))
        .with_state(state.clone());

    Router::new()
        .route("/", get(api::root))
        .route("/health", get(api::health_check))
        .merge(auth_routes().with_state(state.auth.clone()))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
}
