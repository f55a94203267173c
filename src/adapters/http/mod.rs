//! HTTP adapter - WebSocket endpoint, health check and middleware.
//!
//! - `GET /ws` - Client event stream
//! - `GET /health` - Liveness with online count and round phases

mod health;
mod router;

use std::sync::Arc;

use crate::adapters::websocket::ClientHub;
use crate::application::handlers::{JackpotHandle, PresenceService, WheelHandle};

pub use health::HealthResponse;
pub use router::{cors_layer, create_router};

/// Shared state for HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub hub: ClientHub,
    pub presence: Arc<PresenceService>,
    pub wheel: WheelHandle,
    pub jackpot: JackpotHandle,
}
