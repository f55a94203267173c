//! Router assembly and middleware stack.

use std::time::Duration;

use axum::{
    extract::FromRef,
    http::{header, HeaderName, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::adapters::websocket::{websocket_router, WebSocketState};
use crate::config::ValidationError;

use super::health::health;
use super::AppState;

impl FromRef<AppState> for WebSocketState {
    fn from_ref(state: &AppState) -> Self {
        WebSocketState::new(state.hub.clone(), state.presence.clone())
    }
}

/// Allows exactly one origin, with credentials.
pub fn cors_layer(origin: &str) -> Result<CorsLayer, ValidationError> {
    let origin = HeaderValue::from_str(origin)
        .map_err(|_| ValidationError::InvalidCorsOrigin(origin.to_string()))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            HeaderName::from_static("x-requested-with"),
            header::CONTENT_TYPE,
        ]))
}

/// Full application router: `/ws` and `/health`.
pub fn create_router(state: AppState, cors_origin: &str) -> Result<Router, ValidationError> {
    let ws_state = WebSocketState::from_ref(&state);

    let api = Router::new()
        .route("/health", get(health))
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(10)));

    Ok(Router::new()
        .merge(websocket_router().with_state(ws_state))
        .merge(api)
        .layer(cors_layer(cors_origin)?)
        .layer(TraceLayer::new_for_http()))
}
