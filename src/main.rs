//! Casino orchestrator server binary.
//!
//! Wires the Redis feed, the round schedulers, the rules client and the
//! WebSocket endpoint together, then serves until Ctrl+C or SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use casino_orchestrator::adapters::bus::RedisMessageBus;
use casino_orchestrator::adapters::http::{create_router, AppState};
use casino_orchestrator::adapters::rules::{HttpRulesConfig, HttpRulesService};
use casino_orchestrator::adapters::websocket::ClientHub;
use casino_orchestrator::application::handlers::{
    JackpotScheduler, JackpotSchedulerConfig, PresenceService, Relay, WheelScheduler,
    WheelSchedulerConfig,
};
use casino_orchestrator::config::{AppConfig, JackpotRoundConfig, WheelRoundConfig};
use casino_orchestrator::domain::jackpot::JackpotSettings;
use casino_orchestrator::domain::wheel::WheelSettings;
use casino_orchestrator::ports::{Broadcaster, RulesService};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    tracing::info!(
        environment = ?config.server.environment,
        rules = %config.rules.base_url,
        wheel_event_types = ?config.relay.wheel_event_types,
        "Starting casino orchestrator"
    );

    let hub = ClientHub::new(config.server.broadcast_capacity);
    let broadcaster: Arc<dyn Broadcaster> = Arc::new(hub.clone());

    let rules: Arc<dyn RulesService> = Arc::new(HttpRulesService::new(
        HttpRulesConfig::new(&config.rules.base_url).with_timeout(config.rules.timeout()),
    )?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let (wheel, wheel_handle) = WheelScheduler::new(
        wheel_scheduler_config(&config.rounds.wheel),
        rules.clone(),
        broadcaster.clone(),
    );
    let (jackpot, jackpot_handle) = JackpotScheduler::new(
        jackpot_scheduler_config(&config.rounds.jackpot),
        rules,
        broadcaster.clone(),
    );
    let wheel_task = tokio::spawn(wheel.run(shutdown_rx.clone()));
    let jackpot_task = tokio::spawn(jackpot.run(shutdown_rx.clone()));

    if config.rounds.jackpot.recover_on_startup {
        jackpot_handle.recover().await?;
    }

    let bus = RedisMessageBus::new(&config.redis.url, config.redis.reconnect_delay())?
        .with_connect_timeout(config.redis.timeout());
    let relay = Relay::new(
        broadcaster.clone(),
        wheel_handle.clone(),
        jackpot_handle.clone(),
        config.relay.wheel_events()?,
    );
    let relay_shutdown = shutdown_rx.clone();
    let relay_task = tokio::spawn(async move {
        if let Err(e) = relay.run(bus, relay_shutdown).await {
            tracing::error!(error = %e, "Relay exited with error");
        }
    });

    let state = AppState {
        hub,
        presence: Arc::new(PresenceService::new(broadcaster)),
        wheel: wheel_handle,
        jackpot: jackpot_handle,
    };
    let app = create_router(state, &config.server.cors_origin)?;

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Shutting down background tasks");
    let _ = shutdown_tx.send(true);
    let _ = tokio::join!(relay_task, wheel_task, jackpot_task);

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    if config.server.json_logs() {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn wheel_scheduler_config(rounds: &WheelRoundConfig) -> WheelSchedulerConfig {
    WheelSchedulerConfig {
        settings: WheelSettings {
            countdown_secs: rounds.countdown_secs,
            spin_secs: rounds.spin_secs,
        },
        stop_delay: rounds.stop_delay(),
        announce_bet_window: rounds.announce_bet_window,
        ..WheelSchedulerConfig::default()
    }
}

fn jackpot_scheduler_config(rounds: &JackpotRoundConfig) -> JackpotSchedulerConfig {
    JackpotSchedulerConfig {
        settings: JackpotSettings {
            build_up_secs: rounds.build_up_secs,
            pre_finish_threshold_secs: rounds.pre_finish_threshold_secs,
        },
        new_game_retry: rounds.new_game_retry(),
        ..JackpotSchedulerConfig::default()
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}
