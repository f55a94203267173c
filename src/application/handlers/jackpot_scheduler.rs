//! Jackpot scheduler - the task that owns the jackpot round.
//!
//! Same shape as the wheel scheduler: one task, a command inbox, spawned
//! rules calls reporting back with the epoch they belong to. The countdown
//! and the build-up each have their own ticker, and a fresh `jackpot.timer`
//! cancels both plus any pending new-game retry.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot, watch};

use crate::domain::foundation::RoundEpoch;
use crate::domain::jackpot::{
    JackpotPhase, JackpotRound, JackpotSettings, JackpotSnapshot, JackpotTick, JackpotTimerRequest,
};
use crate::domain::relay::OutboundEvent;
use crate::ports::{Broadcaster, JackpotStatus, RulesError, RulesService};

use super::errors::SchedulerError;
use super::timers::{Deadline, Ticker};

const NAME: &str = "jackpot";

/// Status sent to the backend when the countdown enters its final seconds.
const PRE_FINISH_STATUS: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JackpotSchedulerConfig {
    pub settings: JackpotSettings,
    pub tick_interval: Duration,
    /// Wait between failed new-game attempts.
    pub new_game_retry: Duration,
}

impl Default for JackpotSchedulerConfig {
    fn default() -> Self {
        Self {
            settings: JackpotSettings::default(),
            tick_interval: Duration::from_secs(1),
            new_game_retry: Duration::from_millis(1000),
        }
    }
}

#[derive(Debug)]
pub enum JackpotCommand {
    /// Supersede whatever is running with a new countdown.
    Start(JackpotTimerRequest),
    /// Ask the backend where the current round stands and resume it.
    Recover,
    Snapshot(oneshot::Sender<JackpotSnapshot>),
}

#[derive(Debug)]
enum JackpotResult {
    Slider {
        epoch: RoundEpoch,
        result: Result<Value, RulesError>,
    },
    NewGame {
        epoch: RoundEpoch,
        result: Result<Value, RulesError>,
    },
    Status(Result<JackpotStatus, RulesError>),
}

#[derive(Debug, Clone)]
pub struct JackpotHandle {
    sender: mpsc::Sender<JackpotCommand>,
}

impl JackpotHandle {
    async fn send(&self, command: JackpotCommand) -> Result<(), SchedulerError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| SchedulerError::Unavailable(NAME))
    }

    pub async fn start(&self, request: JackpotTimerRequest) -> Result<(), SchedulerError> {
        self.send(JackpotCommand::Start(request)).await
    }

    pub async fn recover(&self) -> Result<(), SchedulerError> {
        self.send(JackpotCommand::Recover).await
    }

    pub async fn snapshot(&self) -> Result<JackpotSnapshot, SchedulerError> {
        let (tx, rx) = oneshot::channel();
        self.send(JackpotCommand::Snapshot(tx)).await?;
        rx.await.map_err(|_| SchedulerError::Unavailable(NAME))
    }
}

pub struct JackpotScheduler {
    config: JackpotSchedulerConfig,
    round: JackpotRound,
    rules: Arc<dyn RulesService>,
    broadcaster: Arc<dyn Broadcaster>,
    inbox: mpsc::Receiver<JackpotCommand>,
    results_tx: mpsc::UnboundedSender<JackpotResult>,
    results_rx: mpsc::UnboundedReceiver<JackpotResult>,
    countdown: Ticker,
    build_up: Ticker,
    retry: Deadline,
    retry_epoch: Option<RoundEpoch>,
}

impl JackpotScheduler {
    pub fn new(
        config: JackpotSchedulerConfig,
        rules: Arc<dyn RulesService>,
        broadcaster: Arc<dyn Broadcaster>,
    ) -> (Self, JackpotHandle) {
        let (sender, inbox) = mpsc::channel(64);
        let (results_tx, results_rx) = mpsc::unbounded_channel();

        let scheduler = Self {
            round: JackpotRound::new(config.settings),
            config,
            rules,
            broadcaster,
            inbox,
            results_tx,
            results_rx,
            countdown: Ticker::idle(),
            build_up: Ticker::idle(),
            retry: Deadline::idle(),
            retry_epoch: None,
        };

        (scheduler, JackpotHandle { sender })
    }

    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            build_up_secs = self.config.settings.build_up_secs,
            "Jackpot scheduler started"
        );
        let mut inbox_open = true;

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                command = self.inbox.recv(), if inbox_open => match command {
                    Some(command) => self.handle_command(command),
                    None => inbox_open = false,
                },
                Some(result) = self.results_rx.recv() => self.handle_result(result),
                _ = self.countdown.tick() => self.on_tick(),
                _ = self.build_up.tick() => self.on_tick(),
                _ = self.retry.fired() => self.retry_new_game(),
            }
        }

        tracing::info!("Jackpot scheduler stopped");
    }

    fn handle_command(&mut self, command: JackpotCommand) {
        match command {
            JackpotCommand::Start(request) => self.start(request),
            JackpotCommand::Recover => {
                let rules = Arc::clone(&self.rules);
                let results = self.results_tx.clone();
                tokio::spawn(async move {
                    let status = rules.jackpot_status().await;
                    let _ = results.send(JackpotResult::Status(status));
                });
            }
            JackpotCommand::Snapshot(reply) => {
                let _ = reply.send(self.round.snapshot());
            }
        }
    }

    fn start(&mut self, request: JackpotTimerRequest) {
        self.countdown.cancel();
        self.build_up.cancel();
        self.retry.cancel();
        self.retry_epoch = None;

        match self.round.start(request) {
            Ok(epoch) => {
                tracing::info!(%epoch, min = request.min, sec = request.sec, time = request.time, "Jackpot countdown started");
                self.countdown.arm(self.config.tick_interval);
            }
            Err(e) => tracing::error!(error = %e, "Jackpot start rejected"),
        }
    }

    fn on_tick(&mut self) {
        let tick = match self.round.tick() {
            Ok(tick) => tick,
            Err(e) => {
                tracing::error!(error = %e, "Jackpot tick rejected");
                self.countdown.cancel();
                self.build_up.cancel();
                return;
            }
        };

        match tick {
            JackpotTick::Idle => {
                self.countdown.cancel();
                self.build_up.cancel();
            }
            JackpotTick::Countdown { event, pre_finish } => {
                if pre_finish {
                    self.signal_pre_finish();
                }
                self.broadcast(event);
            }
            JackpotTick::Expired { pre_finish, epoch } => {
                if pre_finish {
                    self.signal_pre_finish();
                }
                self.countdown.cancel();
                tracing::info!(%epoch, "Jackpot round expired");
                self.spawn_slider(epoch);
            }
            JackpotTick::BuildUp(event) => self.broadcast(event),
            JackpotTick::BuildUpFinished { event, epoch } => {
                self.broadcast(event);
                self.build_up.cancel();
                self.spawn_new_game(epoch);
            }
        }
    }

    fn handle_result(&mut self, result: JackpotResult) {
        match result {
            JackpotResult::Slider { epoch, result } => match result {
                Ok(slider) => match self.round.begin_build_up(epoch) {
                    Ok(true) => {
                        self.broadcast(OutboundEvent::jackpot_slider(slider));
                        self.build_up.arm(self.config.tick_interval);
                    }
                    Ok(false) => {
                        tracing::debug!(%epoch, current = %self.round.epoch(), "Discarding stale slider");
                    }
                    Err(e) => tracing::error!(error = %e, "Jackpot build-up rejected"),
                },
                Err(e) => {
                    tracing::error!(%epoch, endpoint = %e.endpoint(), error = %e, "Fetching jackpot slider failed");
                }
            },
            JackpotResult::NewGame { epoch, result } => match result {
                Ok(game) => match self.round.finish_new_game(epoch) {
                    Ok(true) => {
                        tracing::info!(%epoch, "Jackpot new game created");
                        self.broadcast(OutboundEvent::jackpot_new_game(game));
                    }
                    Ok(false) => {
                        tracing::debug!(%epoch, current = %self.round.epoch(), "Discarding stale new game");
                    }
                    Err(e) => tracing::error!(error = %e, "Jackpot new game rejected"),
                },
                Err(e) => {
                    if !self.round.is_new_game_pending(epoch) {
                        return;
                    }
                    let retry_in_ms = self.config.new_game_retry.as_millis() as u64;
                    // newGame is retried whatever the failure kind.
                    if e.is_retryable() {
                        tracing::warn!(%epoch, error = %e, retry_in_ms, "Creating jackpot game failed, retrying");
                    } else {
                        tracing::error!(
                            %epoch,
                            endpoint = %e.endpoint(),
                            error = %e,
                            retry_in_ms,
                            "Creating jackpot game rejected by backend, retrying anyway"
                        );
                    }
                    self.retry_epoch = Some(epoch);
                    self.retry.arm(self.config.new_game_retry);
                }
            },
            JackpotResult::Status(result) => self.recover_from(result),
        }
    }

    fn recover_from(&mut self, status: Result<JackpotStatus, RulesError>) {
        let status = match status {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(error = %e, "Fetching jackpot status failed, nothing recovered");
                return;
            }
        };

        if self.round.phase() != JackpotPhase::Idle {
            tracing::debug!(phase = ?self.round.phase(), "Jackpot already active, skipping recovery");
            return;
        }

        if status.is_running() {
            tracing::info!(game = ?status.id, status = status.status, "Resuming jackpot countdown");
            self.start(JackpotTimerRequest {
                min: status.min,
                sec: status.sec,
                time: status.time,
            });
        } else if status.is_finished() {
            tracing::info!(game = ?status.id, "Jackpot round finished, creating next game");
            match self.round.await_new_game() {
                Ok(epoch) => self.spawn_new_game(epoch),
                Err(e) => tracing::error!(error = %e, "Jackpot recovery rejected"),
            }
        } else {
            tracing::info!(status = status.status, "No jackpot round to recover");
        }
    }

    fn retry_new_game(&mut self) {
        if let Some(epoch) = self.retry_epoch.take() {
            if self.round.is_new_game_pending(epoch) {
                self.spawn_new_game(epoch);
            }
        }
    }

    fn signal_pre_finish(&self) {
        let rules = Arc::clone(&self.rules);
        let epoch = self.round.epoch();
        tokio::spawn(async move {
            if let Err(e) = rules.jackpot_set_status(PRE_FINISH_STATUS).await {
                tracing::warn!(%epoch, endpoint = %e.endpoint(), error = %e, "Jackpot pre-finish status failed");
            }
        });
    }

    fn spawn_slider(&self, epoch: RoundEpoch) {
        let rules = Arc::clone(&self.rules);
        let results = self.results_tx.clone();
        tokio::spawn(async move {
            let result = rules.jackpot_slider().await;
            let _ = results.send(JackpotResult::Slider { epoch, result });
        });
    }

    fn spawn_new_game(&self, epoch: RoundEpoch) {
        let rules = Arc::clone(&self.rules);
        let results = self.results_tx.clone();
        tokio::spawn(async move {
            let result = rules.jackpot_new_game().await;
            let _ = results.send(JackpotResult::NewGame { epoch, result });
        });
    }

    fn broadcast(&self, event: OutboundEvent) {
        self.broadcaster.broadcast(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::rules::MockRulesService;
    use crate::adapters::websocket::ClientHub;
    use crate::domain::relay::OutboundTopic;
    use crate::ports::RulesEndpoint;
    use serde_json::json;
    use tokio::sync::broadcast;
    use tokio::time::sleep;

    fn spawn(
        rules: MockRulesService,
    ) -> (JackpotHandle, broadcast::Receiver<OutboundEvent>, watch::Sender<bool>) {
        let hub = ClientHub::new(256);
        let rx = hub.subscribe();
        let config = JackpotSchedulerConfig {
            settings: JackpotSettings {
                build_up_secs: 3,
                pre_finish_threshold_secs: 3,
            },
            ..JackpotSchedulerConfig::default()
        };
        let (scheduler, handle) = JackpotScheduler::new(config, Arc::new(rules), Arc::new(hub));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(scheduler.run(shutdown_rx));
        (handle, rx, shutdown_tx)
    }

    fn topics(rx: &mut broadcast::Receiver<OutboundEvent>) -> Vec<OutboundTopic> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            out.push(event.topic);
        }
        out
    }

    fn status(code: i64, min: i64, sec: i64, time: i64) -> JackpotStatus {
        JackpotStatus {
            id: Some(41),
            status: code,
            room: None,
            min,
            sec,
            time,
            timer: time,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn short_round_runs_full_cycle() {
        let rules = MockRulesService::new();
        let (handle, mut rx, _shutdown) = spawn(rules.clone());

        handle
            .start(JackpotTimerRequest { min: 0, sec: 2, time: 2 })
            .await
            .unwrap();
        sleep(Duration::from_millis(5500)).await;

        use OutboundTopic::*;
        assert_eq!(
            topics(&mut rx),
            vec![JackpotTimer, JackpotSlider, JackpotNgTimer, JackpotNgTimer, JackpotNgTimer, JackpotNewGame]
        );
        assert_eq!(rules.calls_to(RulesEndpoint::JackpotSetStatus), 1);
        assert_eq!(
            handle.snapshot().await.unwrap().phase,
            JackpotPhase::Idle
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failed_slider_leaves_round_expired() {
        let rules = MockRulesService::new().always_failing(RulesEndpoint::JackpotSlider);
        let (handle, mut rx, _shutdown) = spawn(rules.clone());

        handle
            .start(JackpotTimerRequest { min: 0, sec: 1, time: 1 })
            .await
            .unwrap();
        sleep(Duration::from_secs(10)).await;

        assert!(topics(&mut rx).is_empty());
        assert_eq!(rules.calls_to(RulesEndpoint::JackpotSlider), 1);
        assert_eq!(handle.snapshot().await.unwrap().phase, JackpotPhase::Expired);
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_running_round() {
        let rules = MockRulesService::new().with_status(status(1, 0, 30, 30));
        let (handle, mut rx, _shutdown) = spawn(rules.clone());

        handle.recover().await.unwrap();
        sleep(Duration::from_millis(1500)).await;

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.phase, JackpotPhase::Counting);
        assert_eq!(snapshot.time_remaining, 29);
        assert_eq!(topics(&mut rx), vec![OutboundTopic::JackpotTimer]);
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_finished_round_with_new_game() {
        let rules = MockRulesService::new()
            .with_status(status(3, 0, 0, 0))
            .with_new_game(json!({ "id": 42 }));
        let (handle, mut rx, _shutdown) = spawn(rules.clone());

        handle.recover().await.unwrap();
        sleep(Duration::from_millis(100)).await;

        assert_eq!(topics(&mut rx), vec![OutboundTopic::JackpotNewGame]);
        assert_eq!(rules.calls_to(RulesEndpoint::JackpotNewGame), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_status_recovers_nothing() {
        let rules = MockRulesService::new().always_failing(RulesEndpoint::JackpotStatus);
        let (handle, mut rx, _shutdown) = spawn(rules.clone());

        handle.recover().await.unwrap();
        sleep(Duration::from_secs(5)).await;

        assert!(topics(&mut rx).is_empty());
        assert_eq!(rules.calls_to(RulesEndpoint::JackpotStatus), 1);
        assert_eq!(handle.snapshot().await.unwrap().phase, JackpotPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn new_countdown_cancels_new_game_retries() {
        let rules = MockRulesService::new()
            .with_status(status(3, 0, 0, 0))
            .always_failing(RulesEndpoint::JackpotNewGame);
        let (handle, _rx, _shutdown) = spawn(rules.clone());

        handle.recover().await.unwrap();
        sleep(Duration::from_millis(2500)).await;
        assert_eq!(rules.calls_to(RulesEndpoint::JackpotNewGame), 3);

        handle
            .start(JackpotTimerRequest { min: 1, sec: 0, time: 60 })
            .await
            .unwrap();
        sleep(Duration::from_secs(5)).await;

        assert_eq!(rules.calls_to(RulesEndpoint::JackpotNewGame), 3);
    }
}
