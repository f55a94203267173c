//! `GET /health`

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::domain::jackpot::JackpotPhase;
use crate::domain::wheel::WheelPhase;

use super::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub online: usize,
    pub wheel_phase: Option<WheelPhase>,
    pub jackpot_phase: Option<JackpotPhase>,
}

/// Reports `degraded` with 503 when a scheduler task is gone.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let online = state.presence.online_count().await;
    let wheel_phase = state.wheel.snapshot().await.ok().map(|s| s.phase);
    let jackpot_phase = state.jackpot.snapshot().await.ok().map(|s| s.phase);

    let healthy = wheel_phase.is_some() && jackpot_phase.is_some();
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if healthy { "ok" } else { "degraded" },
            online,
            wheel_phase,
            jackpot_phase,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use axum::routing::get;
    use axum::Router;
    use serde_json::{json, Value};
    use tokio::sync::watch;
    use tower::ServiceExt;

    use crate::adapters::rules::MockRulesService;
    use crate::adapters::websocket::ClientHub;
    use crate::application::handlers::{
        JackpotScheduler, JackpotSchedulerConfig, PresenceService, WheelScheduler,
        WheelSchedulerConfig,
    };
    use crate::domain::foundation::ClientAddress;

    fn state(shutdown: watch::Receiver<bool>) -> AppState {
        let hub = ClientHub::new(16);
        let broadcaster = Arc::new(hub.clone());
        let rules = Arc::new(MockRulesService::new());
        let (wheel, wheel_handle) =
            WheelScheduler::new(WheelSchedulerConfig::default(), rules.clone(), broadcaster.clone());
        let (jackpot, jackpot_handle) =
            JackpotScheduler::new(JackpotSchedulerConfig::default(), rules, broadcaster.clone());
        tokio::spawn(wheel.run(shutdown.clone()));
        tokio::spawn(jackpot.run(shutdown));

        AppState {
            hub,
            presence: Arc::new(PresenceService::new(broadcaster)),
            wheel: wheel_handle,
            jackpot: jackpot_handle,
        }
    }

    async fn get_health(state: AppState) -> (StatusCode, Value) {
        let response = Router::new()
            .route("/health", get(health))
            .with_state(state)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn reports_online_count_and_phases() {
        let (_tx, rx) = watch::channel(false);
        let state = state(rx);
        state.presence.connect(ClientAddress::from("10.1.1.1")).await;

        let (status, body) = get_health(state).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "status": "ok", "online": 1, "wheel_phase": "idle", "jackpot_phase": "idle" })
        );
    }

    #[tokio::test]
    async fn degraded_when_schedulers_are_gone() {
        let (tx, rx) = watch::channel(false);
        let state = state(rx);
        tx.send(true).unwrap();
        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let (status, body) = get_health(state).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], json!("degraded"));
        assert_eq!(body["wheel_phase"], Value::Null);
    }
}
